use std::fmt;
use std::time::Duration;

use crate::error::{ApiError, Result};

/// Default DSM REST port
pub const DEFAULT_PORT: u16 = 3033;
/// API version sent in the `x-dell-api-version` header
pub const DEFAULT_API_VERSION: &str = "4.0";
/// Fixed per-request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for a Storage Center / DSM REST endpoint.
#[derive(Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub api_version: String,
    pub timeout: Duration,
    /// Verify the array's TLS certificate. Arrays usually ship self-signed
    /// certificates, so this is off unless asked for.
    pub verify_tls: bool,
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            verify_tls: false,
        }
    }

    /// Root of the REST API, e.g. `https://array:3033/api/rest`
    pub fn base_url(&self) -> String {
        format!("https://{}:{}/api/rest", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ApiError::Config("host cannot be empty".into()));
        }
        if self.host.contains('/') || self.host.contains(char::is_whitespace) {
            return Err(ApiError::Config(format!(
                "invalid host '{}': expected a hostname or address",
                self.host
            )));
        }
        if self.port == 0 {
            return Err(ApiError::Config("port cannot be 0".into()));
        }
        if self.username.is_empty() {
            return Err(ApiError::Config("username cannot be empty".into()));
        }
        if self.api_version.trim().is_empty() {
            return Err(ApiError::Config("api version cannot be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(ApiError::Config("timeout cannot be zero".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}
