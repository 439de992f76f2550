use crate::{Error, Result, truncate_long};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Direction> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

/// One ordering request.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    /// Column name, direction left to the backend default.
    Column(String),
    /// Column name with an explicit direction.
    Directed(String, Direction),
    /// Comma separated `column [asc|desc]` fragments.
    Raw(String),
}

impl From<&str> for Order {
    fn from(value: &str) -> Self {
        Order::Raw(value.into())
    }
}

impl From<String> for Order {
    fn from(value: String) -> Self {
        Order::Raw(value)
    }
}

impl<S: Into<String>> From<(S, Direction)> for Order {
    fn from((column, direction): (S, Direction)) -> Self {
        Order::Directed(column.into(), direction)
    }
}

impl<S: Into<String>> From<(S, Option<Direction>)> for Order {
    fn from((column, direction): (S, Option<Direction>)) -> Self {
        match direction {
            Some(direction) => Order::Directed(column.into(), direction),
            None => Order::Column(column.into()),
        }
    }
}

/// Normalized `ORDER BY`: columns in first seen order, each with its last requested direction.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct OrderBy(Vec<(String, Option<Direction>)>);

impl OrderBy {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Direction>)> {
        self.0.iter().map(|(c, d)| (c.as_str(), *d))
    }

    fn set(&mut self, column: &str, direction: Option<Direction>) {
        match self.0.iter_mut().find(|(c, _)| c == column) {
            Some(entry) => entry.1 = direction,
            None => self.0.push((column.to_string(), direction)),
        }
    }

    pub fn push(&mut self, order: &Order) -> Result<()> {
        match order {
            Order::Column(column) => self.set(column.trim(), None),
            Order::Directed(column, direction) => self.set(column.trim(), Some(*direction)),
            Order::Raw(raw) => {
                for part in raw.split(',') {
                    let mut words = part.split_whitespace();
                    let Some(column) = words.next() else {
                        continue;
                    };
                    let direction = match words.next() {
                        None => None,
                        Some(word) => Some(Direction::parse(word).ok_or_else(|| {
                            Error::msg(format!(
                                "Unexpected order direction `{}` in `{}`, expected ASC or DESC",
                                word,
                                truncate_long!(raw)
                            ))
                        })?),
                    };
                    if let Some(extra) = words.next() {
                        return Err(Error::msg(format!(
                            "Unexpected `{}` after the order direction in `{}`",
                            extra,
                            truncate_long!(raw)
                        )));
                    }
                    self.set(column, direction);
                }
            }
        }
        Ok(())
    }

    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Result<Self> {
        let mut result = OrderBy::new();
        for order in orders {
            result.push(order)?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_and_explicit_are_equivalent() {
        let raw = OrderBy::from_orders(&[Order::from("name asc, age DESC")]).unwrap();
        let explicit = OrderBy::from_orders(&[
            Order::from(("name", Direction::Asc)),
            Order::from(("age", Direction::Desc)),
        ])
        .unwrap();
        assert_eq!(raw, explicit);
    }

    #[test]
    fn mixed_forms_keep_first_seen_position() {
        let order = OrderBy::from_orders(&[
            Order::Column("name".into()),
            Order::from("age desc,  , city"),
            Order::from(("name", Direction::Desc)),
        ])
        .unwrap();
        let columns: Vec<_> = order.iter().collect();
        assert_eq!(
            columns,
            vec![
                ("name", Some(Direction::Desc)),
                ("age", Some(Direction::Desc)),
                ("city", None),
            ]
        );
    }

    #[test]
    fn wrong_direction() {
        assert!(OrderBy::from_orders(&[Order::from("name sideways")]).is_err());
        assert!(OrderBy::from_orders(&[Order::from("name asc please")]).is_err());
    }
}
