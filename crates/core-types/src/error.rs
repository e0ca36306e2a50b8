use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Unknown {kind} value: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

impl CoreError {
    /// Shorthand for a field-level validation failure.
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidInput(field.to_string(), reason.into())
    }
}
