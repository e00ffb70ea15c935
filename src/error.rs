use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is missing from .env or environment")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("could not listen for the login redirect: {0}")]
    Listener(#[source] io::Error),
    #[error("login redirect did not carry an authorization code")]
    MissingCode,
    #[error("login redirect state did not match the request")]
    StateMismatch,
    #[error("Spotify denied the login: {0}")]
    Denied(String),
    #[error("token exchange failed: {0}")]
    Spotify(#[from] rspotify::ClientError),
    #[error("login cancelled")]
    Cancelled,
}

/// A single page request failed; the whole fetch is abandoned.
#[derive(Error, Debug)]
#[error("fetching liked songs failed at offset {offset}: {source}")]
pub struct FetchError {
    pub offset: u32,
    #[source]
    pub source: anyhow::Error,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot CSV could not be read: {0}")]
    Csv(#[from] csv::Error),
    #[error("snapshot schema version {0} is not supported")]
    Schema(u32),
    #[error("snapshot {0} contains no readable entries")]
    Empty(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("export I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("export CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
