//! HTTP transport for the DSM REST API.
//!
//! A [`Transport`] performs exactly one blocking round trip and reports the
//! status, cookies and body without interpreting them. Status checks live in
//! the client so that tests can drive it with a scripted transport.

use std::fmt;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

/// Header carrying the requested API version
pub const API_VERSION_HEADER: &str = "x-dell-api-version";

/// Credentials attached to a request.
#[derive(Clone, PartialEq, Eq)]
pub enum RequestAuth {
    /// HTTP Basic, used only for the login call
    Basic { username: String, password: String },
    /// Session cookie obtained at login
    Session(String),
}

impl fmt::Debug for RequestAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestAuth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            RequestAuth::Session(_) => f.debug_tuple("Session").field(&"<redacted>").finish(),
        }
    }
}

/// A single request against the REST root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below `/api/rest`, starting with `/`
    pub path: String,
    pub auth: RequestAuth,
    pub body: Option<String>,
}

/// Raw outcome of a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Every `Set-Cookie` header value, in order
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            set_cookies: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.set_cookies.push(cookie.into());
        self
    }
}

pub trait Transport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Build the `Cookie` header value from `Set-Cookie` values.
///
/// Keeps the `name=value` pair of each cookie and drops attributes such as
/// `Path` or `Secure`. Returns `None` when nothing usable was set.
pub fn session_cookie(set_cookies: &[String]) -> Option<String> {
    let pairs: Vec<&str> = set_cookies
        .iter()
        .filter_map(|c| c.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('=') && !pair.starts_with('='))
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// `reqwest`-backed transport talking HTTPS to the array.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_str(&config.api_version).map_err(|e| {
                ApiError::Config(format!(
                    "invalid api version '{}': {}",
                    config.api_version, e
                ))
            })?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .user_agent(format!("compellent-api/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = config.base_url();
        info!(
            base_url = %base_url,
            timeout_secs = config.timeout.as_secs(),
            verify_tls = config.verify_tls,
            "Created DSM REST transport"
        );

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self.client.request(request.method, &url);
        builder = match request.auth {
            RequestAuth::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
            RequestAuth::Session(cookie) => builder.header(COOKIE, cookie),
        };
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = response.text()?;

        debug!(url = %url, status, bytes = body.len(), "Received response");
        Ok(ApiResponse {
            status,
            set_cookies,
            body,
        })
    }
}
