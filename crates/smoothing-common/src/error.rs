//! Error types for the smoothing pipeline and its collaborators.

use thiserror::Error;

/// Result type alias using SmoothingError.
pub type SmoothingResult<T> = Result<T, SmoothingError>;

/// Primary error type for smoothing and compositing operations.
///
/// An empty input or a zero-area grid is not an error; the pipeline reports
/// those as a skipped draw.
#[derive(Debug, Error)]
pub enum SmoothingError {
    // === Configuration Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // === Data Errors ===
    #[error("Invalid data: {0}")]
    InvalidData(String),

    // === Rendering Errors ===
    #[error("Style '{style}' failed: {message}")]
    Style { style: String, message: String },

    #[error("Rendering failed: {0}")]
    Render(String),
}

impl SmoothingError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidData error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a Style error for the named delegate.
    pub fn style(style: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Style {
            style: style.into(),
            message: message.into(),
        }
    }

    /// Whether the error was raised before any numerical work or drawing.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SmoothingError::InvalidParameter { .. } | SmoothingError::Config(_)
        )
    }
}

impl From<serde_json::Error> for SmoothingError {
    fn from(err: serde_json::Error) -> Self {
        SmoothingError::Config(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for SmoothingError {
    fn from(err: std::io::Error) -> Self {
        SmoothingError::Render(err.to_string())
    }
}
