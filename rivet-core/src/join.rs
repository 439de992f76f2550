use crate::{SqlWriter, to_snake_case};

/// Inner join request, associations follow the `<other>.<this>_id = <this>.id` convention.
#[derive(Debug, Clone, PartialEq)]
pub enum Join {
    /// Join clause written by the caller, used verbatim.
    Raw(String),
    /// Table holding a foreign key to this one.
    Association(String),
    /// Several tables holding a foreign key to this one.
    Associations(Vec<String>),
    /// `(a, b)`: `a` holds a foreign key to this table and `b` holds one to `a`.
    Nested(String, String),
}

impl Join {
    pub fn association(name: impl Into<String>) -> Self {
        Join::Association(name.into())
    }

    pub fn nested(first: impl Into<String>, second: impl Into<String>) -> Self {
        Join::Nested(first.into(), second.into())
    }

    /// Renders the join clauses starting from `table`.
    pub fn write(&self, writer: &dyn SqlWriter, out: &mut String, table: &str) {
        match self {
            Join::Raw(sql) => {
                new_line(out);
                out.push_str(sql.trim());
            }
            Join::Association(other) => write_association(writer, out, table, other),
            Join::Associations(others) => {
                for other in others {
                    write_association(writer, out, table, other);
                }
            }
            Join::Nested(first, second) => {
                write_association(writer, out, table, first);
                write_association(writer, out, &to_snake_case(first), second);
            }
        }
    }
}

fn new_line(out: &mut String) {
    if !out.is_empty() {
        out.push('\n');
    }
}

fn write_association(writer: &dyn SqlWriter, out: &mut String, this: &str, other: &str) {
    new_line(out);
    writer.write_inner_join(out, this, &to_snake_case(other));
}

impl From<&str> for Join {
    fn from(value: &str) -> Self {
        Join::Raw(value.into())
    }
}

impl From<String> for Join {
    fn from(value: String) -> Self {
        Join::Raw(value)
    }
}
