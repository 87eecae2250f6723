//! Error types for the showcase ecosystem.

use thiserror::Error;

/// Errors that can occur in showcase operations.
///
/// `Http`, `Parse` and `Remote` are source failures: the cache swallows them
/// and keeps serving the previous snapshot. `Validation` is reported straight
/// back to the caller, `Config` disables the affected feature at startup.
#[derive(Error, Debug)]
pub enum ShowcaseError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Could not parse source response: {0}")]
    Parse(String),

    #[error("Source returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("The {0} integration is not configured")]
    FeatureDisabled(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ShowcaseError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ShowcaseError::Validation(msg.into())
    }

    /// True for failures that originate in an external source.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            ShowcaseError::Http(_) | ShowcaseError::Parse(_) | ShowcaseError::Remote { .. }
        )
    }
}

impl From<serde_json::Error> for ShowcaseError {
    fn from(e: serde_json::Error) -> Self {
        ShowcaseError::Serialization(e.to_string())
    }
}

/// Result type alias for showcase operations.
pub type ShowcaseResult<T> = Result<T, ShowcaseError>;
