//! Error types for the SWSOC pipeline manifest

use thiserror::Error;

/// Main error type for manifest resolution and resource declaration
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource declaration errors raised by a provisioner
    #[error("Provisioning error: {resource}: {message}")]
    Provisioning { resource: String, message: String },
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Configuration specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration source is absent
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Source could not be read or parsed into a flat mapping
    #[error("Configuration parse error: {0}")]
    ParseError(String),

    /// One or more required keys are absent
    #[error("Missing required configuration keys: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    /// Missing required field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid value
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
