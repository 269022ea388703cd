//! Error types for acessos-client

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for client calls
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client error types. Server-side failures carry the server's message.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not allowed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Session error: {0}")]
    Session(String),
}

impl ClientError {
    /// Classify a non-success response
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Authentication(message),
            StatusCode::FORBIDDEN => Self::Authorization(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(message)
            }
            _ => Self::Server(message),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Server(format!("Unexpected response: {}", err))
        } else {
            Self::Connection(err.to_string())
        }
    }
}
