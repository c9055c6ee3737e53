use thiserror::Error;

use crate::sources::SourceId;

#[derive(Error, Debug)]
pub enum MangaplexError {
    /// A source answered with a non-success status. The status is kept so the
    /// caller can relay it unchanged.
    #[error("{provider} request failed: {status}")]
    Upstream { provider: SourceId, status: u16 },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Unknown source namespace: {0}")]
    UnknownSource(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl MangaplexError {
    /// HTTP status an outer handler should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Upstream { status, .. } => *status,
            Self::Validation(_) | Self::UnknownSource(_) => 400,
            Self::Http(_) | Self::Json(_) => 502,
            _ => 500,
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

pub type Result<T> = std::result::Result<T, MangaplexError>;
