use crate::{Direction, OrderBy, SelectQuery, Value, separated_by};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Plain identifier, possibly qualified by dots: `age`, `entry.name`.
pub fn is_column_name(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Renders the SQL text of every statement the core issues.
///
/// Values never end up inside statement text: every statement uses `?` placeholders
/// and the values travel as bound parameters. [`SqlWriter::write_value`] exists to print
/// queries in logs and error messages.
pub trait SqlWriter {
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    /// Writes a column name, each dot separated part quoted.
    ///
    /// Anything that is not a plain (possibly qualified) identifier, like `COUNT(*)`, is
    /// written as it is.
    fn write_column_name(&self, out: &mut String, value: &str) {
        if !is_column_name(value) {
            out.push_str(value);
            return;
        }
        separated_by(
            out,
            value.split('.'),
            |out, v| self.write_identifier_quoted(out, v),
            ".",
        );
    }

    fn write_column_qualified(&self, out: &mut String, table: Option<&str>, column: &str) {
        if let Some(table) = table
            && !column.contains('.')
        {
            self.write_identifier_quoted(out, table);
            out.push('.');
        }
        self.write_column_name(out, column);
    }

    /// Renders the SQL literal of a value: quoted text, decimal numbers, `NULL` otherwise.
    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null
            | Value::Boolean(None)
            | Value::Int64(None)
            | Value::Float64(None)
            | Value::Varchar(None)
            | Value::Blob(None) => self.write_value_none(out),
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::Float64(Some(v)) => self.write_value_float(out, *v),
            Value::Varchar(Some(v)) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    fn write_value_float(&self, out: &mut String, value: f64) {
        if value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            out.push_str(buffer.format_finite(value));
        } else {
            self.write_value_none(out);
        }
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            out.push_str(&format!("{:02X}", b));
        }
        out.push('\'');
    }

    fn write_placeholders(&self, out: &mut String, count: usize) {
        separated_by(out, 0..count, |out, _| out.push('?'), ", ");
    }

    fn write_random(&self, out: &mut String) {
        out.push_str("RANDOM()");
    }

    fn write_order_by(&self, out: &mut String, table: Option<&str>, order: &OrderBy) {
        if order.is_empty() {
            return;
        }
        out.push_str("\nORDER BY ");
        separated_by(
            out,
            order.iter(),
            |out, (column, direction)| {
                self.write_column_qualified(out, table, column);
                match direction {
                    Some(Direction::Asc) => out.push_str(" ASC"),
                    Some(Direction::Desc) => out.push_str(" DESC"),
                    None => {}
                }
            },
            ", ",
        );
    }

    /// `INNER JOIN other ON other.this_id = this.id`
    fn write_inner_join(&self, out: &mut String, this: &str, other: &str) {
        out.push_str("INNER JOIN ");
        self.write_identifier_quoted(out, other);
        out.push_str(" ON ");
        self.write_identifier_quoted(out, other);
        out.push('.');
        self.write_identifier_quoted(out, &format!("{}_id", this));
        out.push_str(" = ");
        self.write_identifier_quoted(out, this);
        out.push_str(".\"id\"");
    }

    /// Writes the select statement, `condition` is the already rendered `WHERE` expression.
    fn write_select(
        &self,
        out: &mut String,
        table: &str,
        columns: &[String],
        query: &SelectQuery,
        condition: &str,
    ) {
        let qualify = (!query.joins.is_empty()).then_some(table);
        out.push_str("SELECT ");
        if query.distinct {
            out.push_str("DISTINCT ");
        }
        separated_by(
            out,
            columns,
            |out, col| self.write_column_qualified(out, qualify, col),
            ", ",
        );
        out.push_str("\nFROM ");
        self.write_identifier_quoted(out, table);
        for join in &query.joins {
            out.push('\n');
            out.push_str(join);
        }
        if !condition.is_empty() {
            out.push_str("\nWHERE ");
            out.push_str(condition);
        }
        if !query.group.is_empty() {
            out.push_str("\nGROUP BY ");
            separated_by(
                out,
                &query.group,
                |out, col| self.write_column_qualified(out, qualify, col),
                ", ",
            );
        }
        if query.random {
            out.push_str("\nORDER BY ");
            self.write_random(out);
        } else {
            self.write_order_by(out, qualify, &query.order);
        }
        if let Some(limit) = query.limit {
            out.push_str("\nLIMIT ");
            write_integer!(out, limit);
            if query.offset > 0 {
                out.push_str(" OFFSET ");
                write_integer!(out, query.offset);
            }
        }
        out.push(';');
    }

    fn write_count(&self, out: &mut String, table: &str) {
        out.push_str("SELECT COUNT(*) FROM ");
        self.write_identifier_quoted(out, table);
        out.push(';');
    }

    fn write_insert(&self, out: &mut String, table: &str, columns: &[String]) {
        out.push_str("INSERT INTO ");
        self.write_identifier_quoted(out, table);
        if columns.is_empty() {
            out.push_str(" DEFAULT VALUES;");
            return;
        }
        out.push_str(" (");
        separated_by(
            out,
            columns,
            |out, v| self.write_identifier_quoted(out, v),
            ", ",
        );
        out.push_str(")\nVALUES (");
        self.write_placeholders(out, columns.len());
        out.push_str(");");
    }

    fn write_update(&self, out: &mut String, table: &str, columns: &[&str], condition: &str) {
        out.push_str("UPDATE ");
        self.write_identifier_quoted(out, table);
        out.push_str("\nSET ");
        separated_by(
            out,
            columns,
            |out, v| {
                self.write_identifier_quoted(out, v);
                out.push_str(" = ?");
            },
            ", ",
        );
        if !condition.is_empty() {
            out.push_str("\nWHERE ");
            out.push_str(condition);
        }
        out.push(';');
    }

    fn write_delete(&self, out: &mut String, table: &str, condition: &str) {
        out.push_str("DELETE FROM ");
        self.write_identifier_quoted(out, table);
        if !condition.is_empty() {
            out.push_str("\nWHERE ");
            out.push_str(condition);
        }
        out.push(';');
    }

    /// Query returning the identifier assigned by the last insert on this connection.
    fn write_last_insert_id(&self, out: &mut String) {
        out.push_str("SELECT last_insert_rowid();");
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {}
