//! Configuration management for the OCHP client.
//!
//! Supports configuration via:
//! - Explicit values
//! - Environment variables
//! - Builder pattern

use crate::errors::{ConfigurationError, OchpResult};
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// HTTP basic auth credentials
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// User name
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credentials({}, [REDACTED])", self.username)
    }
}

/// Configuration for the OCHP client
#[derive(Debug, Clone)]
pub struct OchpConfig {
    /// SOAP endpoint of the clearing house
    pub endpoint: Url,
    /// Request timeout
    pub timeout: Duration,
    /// Keep a copy of the response body on errors.
    ///
    /// Costs one allocation per failed call; off by default.
    pub capture_response_body: bool,
    /// Basic auth credentials
    pub(crate) credentials: Option<Credentials>,
    /// Headers sent with every request
    pub default_headers: HeaderMap,
}

impl Default for OchpConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            capture_response_body: false,
            credentials: None,
            default_headers: HeaderMap::new(),
        }
    }
}

fn default_endpoint() -> Url {
    match Url::parse(crate::DEFAULT_ENDPOINT) {
        Ok(url) => url,
        Err(_) => unreachable!("DEFAULT_ENDPOINT is a valid URL"),
    }
}

impl OchpConfig {
    /// Create a new configuration builder
    pub fn builder() -> OchpConfigBuilder {
        OchpConfigBuilder::new()
    }

    /// Create configuration from environment variables
    pub fn from_env() -> OchpResult<Self> {
        let mut builder = OchpConfigBuilder::new();

        if let Ok(endpoint) = std::env::var("OCHP_ENDPOINT") {
            builder = builder.endpoint(&endpoint)?;
        }

        if let Ok(timeout) = std::env::var("OCHP_TIMEOUT") {
            let secs = timeout
                .parse::<u64>()
                .map_err(|_| ConfigurationError::EnvVar(format!("OCHP_TIMEOUT={timeout}")))?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Ok(capture) = std::env::var("OCHP_CAPTURE_RESPONSE_BODY") {
            builder = builder.capture_response_body(parse_flag(&capture).ok_or_else(|| {
                ConfigurationError::EnvVar(format!("OCHP_CAPTURE_RESPONSE_BODY={capture}"))
            })?);
        }

        if let (Ok(username), Ok(password)) =
            (std::env::var("OCHP_USERNAME"), std::env::var("OCHP_PASSWORD"))
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        builder.build()
    }

    /// Get the credentials if configured
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Validate the configuration
    pub fn validate(&self) -> OchpResult<()> {
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidEndpoint(format!(
                "unsupported scheme '{}'",
                self.endpoint.scheme()
            ))
            .into());
        }

        if self.timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Builder for OchpConfig
#[derive(Default)]
pub struct OchpConfigBuilder {
    config: OchpConfig,
}

impl OchpConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: OchpConfig::default(),
        }
    }

    /// Set the endpoint URL
    pub fn endpoint(mut self, url: &str) -> Result<Self, ConfigurationError> {
        self.config.endpoint =
            Url::parse(url).map_err(|e| ConfigurationError::InvalidEndpoint(e.to_string()))?;
        Ok(self)
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Keep a copy of the response body on errors
    pub fn capture_response_body(mut self, capture: bool) -> Self {
        self.config.capture_response_body = capture;
        self
    }

    /// Set basic auth credentials
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    /// Add a default header
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        if let Ok(header_name) = name.parse::<http::header::HeaderName>() {
            if let Ok(header_value) = value.parse::<http::header::HeaderValue>() {
                self.config.default_headers.insert(header_name, header_value);
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> OchpResult<OchpConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build the configuration without validation (for testing)
    pub fn build_unchecked(self) -> OchpConfig {
        self.config
    }
}
