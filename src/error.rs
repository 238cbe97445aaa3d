//! Error types for trip intake.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Slot schema construction and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Slot schema must contain at least one slot")]
    Empty,

    #[error("Duplicate slot key: {0}")]
    DuplicateKey(String),

    #[error("Slot at index {index} has a blank key")]
    BlankKey { index: usize },

    #[error("Slot key '{0}' is reserved by the intake payload")]
    ReservedKey(String),

    #[error("Slot index {index} out of range for schema of {len} slots")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Intake submission errors.
///
/// The dialogue never surfaces these to the user; they all collapse into
/// a single failure outcome.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Intake returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed intake response: {0}")]
    MalformedBody(String),

    #[error("Intake rejected the submission: {0}")]
    Rejected(String),

    #[error("Intake request timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias for trip intake.
pub type Result<T> = std::result::Result<T, Error>;
