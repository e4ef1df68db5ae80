use compellent_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid access rule '{rule}': {reason}")]
    InvalidAccessRule { rule: String, reason: String },

    #[error("no access rules given")]
    EmptyAccessList,

    #[error("invalid volume size {0}: must be at least 1024 bytes")]
    InvalidSize(i64),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("NAS volume '{name}' is ambiguous: {count} matches")]
    AmbiguousVolume { name: String, count: usize },

    #[error("NAS volume '{0}' has no nasVolumeId")]
    MissingVolumeId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// Short label used for metrics and exit reporting.
    pub fn code(&self) -> &'static str {
        match self {
            ProvisionError::Api(ApiError::UnexpectedStatus { .. }) => "api_status",
            ProvisionError::Api(ApiError::NotFound { .. }) => "not_found",
            ProvisionError::Api(_) => "api",
            ProvisionError::InvalidAccessRule { .. } | ProvisionError::EmptyAccessList => {
                "invalid_access"
            }
            ProvisionError::InvalidSize(_) | ProvisionError::InvalidName(_) => "invalid_argument",
            ProvisionError::AmbiguousVolume { .. } => "ambiguous",
            ProvisionError::MissingVolumeId(_) => "invalid_response",
            ProvisionError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
