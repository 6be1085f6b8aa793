//! Error types for JagaDoku

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, expired or rejected access token (also: guest sessions)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The remote spreadsheet could not be provisioned
    #[error("Spreadsheet creation failed: {0}")]
    RemoteCreation(String),

    #[error("Sync failed: {0}")]
    Sync(String),

    /// AI backend failure or a response that does not match the insight schema
    #[error("Advice request failed: {0}")]
    Advice(String),

    /// Another network operation of the same kind is still pending
    #[error("Operation already in progress: {0}")]
    Busy(String),
}

impl Error {
    /// Whether this error came from an external collaborator (Google, AI backend)
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::RemoteCreation(_) | Error::Sync(_) | Error::Advice(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
