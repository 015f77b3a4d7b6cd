//! Error types for the trueshuffle library.
//!
//! Binaries wrap these in `anyhow`; library code keeps the taxonomy so
//! callers can tell a dead credential from a flaky network call.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or rejected credentials. Fatal, never retried.
    #[error("Spotify authentication failed: {0}")]
    Auth(String),

    /// A timestamp string that could not be normalized to UTC.
    ///
    /// Callers must treat this as "recency unknown", not as the record
    /// being old or new.
    #[error("could not parse timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },

    /// Network-level failure talking to the API.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Spotify API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("invalid response payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map an HTTP status + body to the right variant. 401/403 mean the
    /// token is bad, which is fatal for a non-interactive run.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 | 403 => Error::Auth(body.into()),
            _ => Error::Api {
                status,
                body: body.into(),
            },
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}
