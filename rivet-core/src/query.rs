use crate::{Error, Result, SqlWriter, Value, truncate_long};

/// One result row, values ordered like the columns of the statement.
pub type Row = Box<[Value]>;

/// SQL text together with the values bound to its `?` placeholders.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Appends `other` joined by `separator`, parameters follow the text order.
    pub fn append(&mut self, separator: &str, other: Fragment) {
        if other.is_empty() {
            return;
        }
        if !self.is_empty() {
            self.sql.push_str(separator);
        }
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }

    /// Number of `?` placeholders outside of quoted text.
    pub fn placeholders(&self) -> usize {
        placeholder_positions(&self.sql).len()
    }

    /// Checks that every placeholder has exactly one value.
    pub fn check_arity(&self) -> Result<()> {
        let expected = self.placeholders();
        if expected != self.params.len() {
            return Err(Error::msg(format!(
                "Expression has {} placeholders but {} values were provided: {}",
                expected,
                self.params.len(),
                truncate_long!(self.sql)
            )));
        }
        Ok(())
    }

    /// Query text with the parameters inlined as literals, only meant for logs.
    pub fn printable(&self, writer: &dyn SqlWriter) -> String {
        let mut out = String::with_capacity(self.sql.len() + self.params.len() * 8);
        let mut position = 0;
        let mut params = self.params.iter();
        for i in placeholder_positions(&self.sql) {
            out.push_str(&self.sql[position..i]);
            match params.next() {
                Some(value) => writer.write_value(&mut out, value),
                None => out.push('?'),
            }
            position = i + 1;
        }
        out.push_str(&self.sql[position..]);
        out
    }
}

impl From<&str> for Fragment {
    fn from(value: &str) -> Self {
        Fragment::new(value)
    }
}

impl From<String> for Fragment {
    fn from(value: String) -> Self {
        Fragment::new(value)
    }
}

fn placeholder_positions(sql: &str) -> Vec<usize> {
    let mut result = Vec::new();
    let mut quote: Option<char> = None;
    for (i, c) in sql.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if q == c => quote = None,
            (None, '?') => result.push(i),
            _ => {}
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenericSqlWriter;

    #[test]
    fn placeholders_skip_quoted_text() {
        let fragment = Fragment::with_params(
            "name = ? AND note != 'why?' AND \"odd?\" = ?",
            vec!["Li".into(), 3.into()],
        );
        assert_eq!(fragment.placeholders(), 2);
        assert!(fragment.check_arity().is_ok());
        assert_eq!(
            fragment.printable(&GenericSqlWriter::new()),
            "name = 'Li' AND note != 'why?' AND \"odd?\" = 3"
        );
    }

    #[test]
    fn arity_mismatch() {
        let fragment = Fragment::with_params("age > ? AND age < ?", vec![1.into()]);
        assert!(fragment.check_arity().is_err());
    }

    #[test]
    fn append() {
        let mut fragment = Fragment::default();
        fragment.append(" AND ", Fragment::new(""));
        assert!(fragment.is_empty());
        fragment.append(" AND ", Fragment::with_params("a = ?", vec![1.into()]));
        fragment.append(" AND ", Fragment::with_params("b = ?", vec![2.into()]));
        assert_eq!(fragment.sql, "a = ? AND b = ?");
        assert_eq!(fragment.params, vec![Value::Int64(Some(1)), Value::Int64(Some(2))]);
    }
}
