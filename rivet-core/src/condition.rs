use crate::{
    Attributes, Error, Fragment, ID_COLUMN, Result, SqlWriter, Value, is_column_name, separated_by,
    truncate_long,
};

/// Most identifiers bound by one statement, SQLite accepts up to 32766 parameters.
pub const IDS_PER_STATEMENT: usize = 32_000;

/// Filter accepted by the read operations.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Condition {
    /// No filter, every row matches.
    #[default]
    Empty,
    /// SQL boolean expression used verbatim.
    Expr(String),
    /// SQL boolean expression with `?` placeholders bound to the values.
    Parameterized(String, Vec<Value>),
    /// Every column equal to its value, `AND` joined.
    Equal(Attributes),
    /// Every column different from its value, `AND` joined.
    NotEqual(Attributes),
    /// Identifier among the ones listed, one parameter per identifier.
    Ids(Vec<i64>),
}

impl Condition {
    pub fn expr(expr: impl Into<String>) -> Self {
        Condition::Expr(expr.into())
    }

    pub fn params<V: Into<Value>>(
        expr: impl Into<String>,
        params: impl IntoIterator<Item = V>,
    ) -> Self {
        Condition::Parameterized(expr.into(), params.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Condition::Empty => true,
            Condition::Expr(v) | Condition::Parameterized(v, ..) => v.trim().is_empty(),
            Condition::Equal(v) | Condition::NotEqual(v) => v.is_empty(),
            Condition::Ids(..) => false,
        }
    }

    /// Renders the condition, column names are qualified with `table` when given.
    pub fn to_fragment(&self, writer: &dyn SqlWriter, table: Option<&str>) -> Result<Fragment> {
        if self.is_empty() {
            return Ok(Fragment::default());
        }
        let fragment = match self {
            Condition::Empty => Fragment::default(),
            Condition::Expr(expr) => Fragment::new(expr.as_str()),
            Condition::Parameterized(expr, params) => {
                let fragment = Fragment::with_params(expr.as_str(), params.clone());
                fragment.check_arity()?;
                fragment
            }
            Condition::Equal(attributes) => {
                write_comparison(writer, table, attributes, " = ?", " IS NULL")?
            }
            Condition::NotEqual(attributes) => {
                write_comparison(writer, table, attributes, " != ?", " IS NOT NULL")?
            }
            Condition::Ids(ids) => {
                let mut sql = String::new();
                if ids.is_empty() {
                    sql.push_str("1 = 0");
                } else {
                    writer.write_column_qualified(&mut sql, table, ID_COLUMN);
                    if ids.len() == 1 {
                        sql.push_str(" = ?");
                    } else {
                        sql.push_str(" IN (");
                        writer.write_placeholders(&mut sql, ids.len());
                        sql.push(')');
                    }
                }
                Fragment::with_params(sql, ids.iter().map(|&v| v.into()).collect())
            }
        };
        Ok(fragment)
    }
}

fn write_comparison(
    writer: &dyn SqlWriter,
    table: Option<&str>,
    attributes: &Attributes,
    compare: &str,
    compare_null: &str,
) -> Result<Fragment> {
    if let Some(column) = attributes.keys().find(|c| !is_column_name(c)) {
        return Err(Error::msg(format!(
            "`{}` is not a column name, use a condition expression to compare anything else",
            truncate_long!(column)
        )));
    }
    let mut sql = String::new();
    let mut params = Vec::with_capacity(attributes.len());
    separated_by(
        &mut sql,
        attributes,
        |out, (column, value)| {
            writer.write_column_qualified(out, table, column);
            if value.is_null() {
                out.push_str(compare_null);
            } else {
                out.push_str(compare);
                params.push(value.clone());
            }
        },
        " AND ",
    );
    Ok(Fragment::with_params(sql, params))
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        Condition::Expr(value.into())
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Condition::Expr(value)
    }
}

impl From<Attributes> for Condition {
    fn from(value: Attributes) -> Self {
        Condition::Equal(value)
    }
}

impl From<Fragment> for Condition {
    fn from(value: Fragment) -> Self {
        Condition::Parameterized(value.sql, value.params)
    }
}
