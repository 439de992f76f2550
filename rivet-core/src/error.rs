use thiserror::Error;

/// Typed failure kinds.
///
/// Operations return [`crate::Error`], the kind can be recovered with
/// `error.downcast_ref::<ModelError>()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Could not resolve the schema of table `{table}`: {reason}")]
    SchemaResolution { table: String, reason: String },
    #[error("Attribute `{column}` of table `{table}` does not satisfy the declared type {declared}")]
    Validation {
        table: String,
        column: String,
        declared: String,
    },
    #[error("The backend rejected the query: {message}\n{query}")]
    QueryExecution { query: String, message: String },
    #[error("No row of table `{table}` has id {id}")]
    NotFound { table: String, id: i64 },
    #[error("A record of table `{table}` must be saved before it can be {action}")]
    MissingIdentifier { table: String, action: &'static str },
}

impl ModelError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound { .. })
    }
}
