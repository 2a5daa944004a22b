//! Error types for sidecar generation and validation.

use thiserror::Error;

/// Result type alias using SidecarError.
pub type SidecarResult<T> = Result<T, SidecarError>;

/// Primary error type for sidecar operations.
#[derive(Debug, Error)]
pub enum SidecarError {
    // === Input Errors ===
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid radar identifier: {0}")]
    InvalidRadarId(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("{0} is not a valid file type. Only dae and obj files are supported.")]
    UnsupportedFileType(String),

    // === Document Errors ===
    #[error("Invalid sidecar document at {location}: {message}")]
    InvalidDocument { location: String, message: String },

    #[error("Failed to parse sidecar JSON: {0}")]
    ParseError(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SidecarError {
    /// Short machine-readable category for this error.
    pub fn category(&self) -> &'static str {
        match self {
            SidecarError::MissingField(_)
            | SidecarError::InvalidParameter { .. }
            | SidecarError::InvalidRadarId(_)
            | SidecarError::InvalidGrid(_)
            | SidecarError::InvalidTime(_)
            | SidecarError::UnsupportedFileType(_) => "input",
            SidecarError::InvalidDocument { .. } => "document",
            SidecarError::ParseError(_) => "parse",
            SidecarError::IoError(_) => "io",
            SidecarError::InternalError(_) => "internal",
        }
    }

    /// Process exit code used by the command line tool for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SidecarError::MissingField(_)
            | SidecarError::InvalidParameter { .. }
            | SidecarError::InvalidRadarId(_)
            | SidecarError::InvalidGrid(_)
            | SidecarError::InvalidTime(_)
            | SidecarError::UnsupportedFileType(_) => 2,

            SidecarError::InvalidDocument { .. } | SidecarError::ParseError(_) => 3,

            SidecarError::IoError(_) => 4,

            SidecarError::InternalError(_) => 1,
        }
    }

    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        SidecarError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn invalid_document(location: impl Into<String>, message: impl Into<String>) -> Self {
        SidecarError::InvalidDocument {
            location: location.into(),
            message: message.into(),
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for SidecarError {
    fn from(err: std::io::Error) -> Self {
        SidecarError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SidecarError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            SidecarError::IoError(err.to_string())
        } else {
            SidecarError::ParseError(err.to_string())
        }
    }
}
