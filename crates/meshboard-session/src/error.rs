use std::path::PathBuf;

use meshboard_assets::AssetError;

/// Reasons a session document is rejected. Raised before any session state
/// is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON structure: {0}")]
    Json(String),

    #[error("invalid timestamp '{0}'")]
    Timestamp(String),

    #[error("asset '{id}' has invalid base64 data: {reason}")]
    Base64 { id: String, reason: String },

    #[error("asset '{id}' declares {declared} bytes but carries {actual}")]
    SizeMismatch {
        id: String,
        declared: u64,
        actual: usize,
    },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json(err.to_string())
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to load session: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("I/O error on '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),
}
