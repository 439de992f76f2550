use std::borrow::Cow;

/// Column descriptor reported by the backend introspection.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: Cow<'static, str>,
    /// Declared SQL type as written in the table definition, e.g. `INTEGER`, `VARCHAR(64)`.
    pub column_type: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<Cow<'static, str>>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Declared type uppercased, affinity checks are case insensitive.
    pub fn declared_type(&self) -> String {
        self.column_type.to_ascii_uppercase()
    }
}
