use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    LoadError(#[from] config::ConfigError),

    /// An environment override that could not be parsed.
    #[error("{key} has an invalid value '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid settings: {0}")]
    ValidationError(String),
}
