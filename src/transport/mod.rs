//! HTTP transport layer for the OCHP client.
//!
//! The transport only moves bytes. It reports whether an HTTP exchange
//! completed and hands back the raw response; classifying that response is
//! left to [`crate::classifier`].

use crate::config::{Credentials, OchpConfig};
use crate::errors::{NetworkError, OchpResult};
use crate::types::{HttpResponse, TransportAttempt};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Content type of SOAP 1.1 requests
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// HTTP transport trait for issuing SOAP calls
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request. Never fails; failures are reported in the attempt.
    async fn send(&self, request: SoapRequest) -> TransportAttempt;
}

/// A serialized SOAP call
#[derive(Debug, Clone)]
pub struct SoapRequest {
    /// Endpoint URL
    pub url: Url,
    /// Value of the `SOAPAction` header
    pub action: String,
    /// Serialized envelope
    pub body: Bytes,
    /// Extra request headers
    pub headers: HeaderMap,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl SoapRequest {
    /// Create a new request
    pub fn new(url: Url, action: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            url,
            action: action.into(),
            body: body.into(),
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Add request headers, replacing existing ones with the same name
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Default HTTP transport implementation using reqwest
pub struct ReqwestTransport {
    client: Client,
    default_timeout: Duration,
    credentials: Option<Credentials>,
}

impl ReqwestTransport {
    /// Create a new transport from the client configuration
    pub fn new(config: &OchpConfig) -> OchpResult<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(NetworkError::from)?;

        Ok(Self {
            client,
            default_timeout: config.timeout,
            credentials: config.credentials().cloned(),
        })
    }

    async fn execute(&self, request: SoapRequest) -> TransportAttempt {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let soap_action = match HeaderValue::from_str(&format!("\"{}\"", request.action)) {
            Ok(value) => value,
            Err(e) => return transport_failed(NetworkError::InvalidRequest(e.to_string())),
        };

        let mut builder = self
            .client
            .post(request.url)
            .headers(request.headers)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", soap_action)
            .body(request.body)
            .timeout(timeout);

        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(credentials.username(), Some(credentials.expose_password()));
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return transport_failed(NetworkError::from(e)),
        };
        let meta = HttpResponse {
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
        };

        if !meta.is_success() {
            warn!(status = %meta.status, "Request failed with non-success status");
        }

        // Headers are in, so body read errors belong to the decode stage.
        match response.bytes().await {
            Ok(body) => {
                debug!(status = %meta.status, body_len = body.len(), "Received response");
                TransportAttempt::completed(meta, body)
            }
            Err(e) => {
                debug!(status = %meta.status, error = %e, "Failed to read response body");
                TransportAttempt::body_failed(meta, NetworkError::from(e))
            }
        }
    }
}

fn transport_failed(err: NetworkError) -> TransportAttempt {
    debug!(error = %err, "Transport failed");
    TransportAttempt::failed(err)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(action = %request.action, url = %crate::observability::redact_url(&request.url)))]
    async fn send(&self, request: SoapRequest) -> TransportAttempt {
        self.execute(request).await
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("default_timeout", &self.default_timeout)
            .field("credentials", &self.credentials)
            .finish()
    }
}
