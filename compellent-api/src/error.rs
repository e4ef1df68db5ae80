use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response status {status} (expected {expected}): {body}")]
    UnexpectedStatus {
        status: u16,
        expected: u16,
        body: String,
    },

    #[error("login failed with status {status}: {body}")]
    LoginFailed { status: u16, body: String },

    #[error("login response did not set a session cookie")]
    MissingSessionCookie,

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} '{name}' is ambiguous: {count} matches")]
    Ambiguous {
        kind: &'static str,
        name: String,
        count: usize,
    },

    #[error("filter needs at least one condition")]
    EmptyFilter,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Status code carried by the error, if the array answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status, .. } | ApiError::LoginFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
