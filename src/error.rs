//! Error types for rebazer

use thiserror::Error;

/// Errors that can occur while reconciling pull requests
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Host API answered with a non-success status
    #[error("{host} API error ({status}): {message}")]
    HostApi {
        /// Host family that produced the error
        host: String,
        /// HTTP status code
        status: u16,
        /// Response body or request description
        message: String,
    },

    /// GitHub client failure that is not an API answer (transport, payload)
    #[error("GitHub client error: {0}")]
    GitHubClient(String),

    /// A value the host should always report was not there
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration could not be read or is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Handled-state snapshot could not be read or written
    #[error("tracking error: {0}")]
    Tracking(String),

    /// Git could not be run (conflicts are not reported here)
    #[error("git error: {0}")]
    Git(String),

    /// Host payload did not have the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for rebazer operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<octocrab::Error> for Error {
    fn from(e: octocrab::Error) -> Self {
        match e {
            octocrab::Error::GitHub { source, .. } => Self::HostApi {
                host: "GitHub".to_string(),
                status: source.status_code.as_u16(),
                message: source.message,
            },
            other => Self::GitHubClient(other.to_string()),
        }
    }
}
