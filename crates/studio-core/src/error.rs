//! Error types for Studio Core.

use thiserror::Error;

/// Message shown when the topic is blank.
pub const INVALID_INPUT_MESSAGE: &str = "Please enter valid text.";

/// Message shown when the generation phase fails.
pub const GENERATION_FAILURE_MESSAGE: &str = "Connection failed. Check token or try again later.";

/// Result type alias for Studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Main error type for the studio pipeline.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Topic was empty after trimming whitespace.
    #[error("Invalid input: topic is blank")]
    InvalidInput,

    /// The generation phase failed.
    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    /// Durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Clipboard write failed.
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl StudioError {
    /// The fixed text a front end shows for this error, if it is user-facing.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            StudioError::InvalidInput => Some(INVALID_INPUT_MESSAGE),
            StudioError::GenerationFailure(_) => Some(GENERATION_FAILURE_MESSAGE),
            _ => None,
        }
    }
}
