//! Data passed between the transport, the decoder and the classifier.
//!
//! These types describe what a call attempt produced. None of them are
//! retained by the client after classification; the classifier copies the
//! pieces an error needs into the error value.

use crate::errors::BoxError;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version};
use serde::Deserialize;

/// Metadata of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status
    pub status: StatusCode,
    /// HTTP version the server answered with
    pub version: Version,
    /// Response headers
    pub headers: HeaderMap,
}

impl HttpResponse {
    /// Create response metadata with the given status and no headers
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
        }
    }

    /// Add a header, ignoring names or values that are not valid HTTP
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<HeaderName>(),
            value.parse::<HeaderValue>(),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Numeric status code
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Whether the status lies in [200, 300)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// The `Result` element every OCHP response carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultObject {
    /// Protocol status code, empty when absent
    #[serde(default)]
    pub result_code: String,
    /// Free-text status description, empty when absent
    #[serde(default)]
    pub result_description: String,
}

impl ResultObject {
    /// Create a result object
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            result_code: code.into(),
            result_description: description.into(),
        }
    }

    /// Whether neither field carries a value
    pub fn is_empty(&self) -> bool {
        self.result_code.is_empty() && self.result_description.is_empty()
    }
}

/// Outcome of issuing a request
#[derive(Debug)]
pub enum TransportAttempt {
    /// No HTTP exchange completed
    Failed(BoxError),
    /// The server answered
    Completed {
        /// Response metadata
        response: HttpResponse,
        /// Raw response body
        body: Bytes,
    },
    /// The server answered, but the body could not be read
    BodyFailed {
        /// Response metadata
        response: HttpResponse,
        /// Error raised while reading the body
        cause: BoxError,
    },
}

impl TransportAttempt {
    /// Create a failed attempt from any error
    pub fn failed(cause: impl Into<BoxError>) -> Self {
        Self::Failed(cause.into())
    }

    /// Create a completed attempt
    pub fn completed(response: HttpResponse, body: impl Into<Bytes>) -> Self {
        Self::Completed {
            response,
            body: body.into(),
        }
    }

    /// Create an attempt whose body could not be read
    pub fn body_failed(response: HttpResponse, cause: impl Into<BoxError>) -> Self {
        Self::BodyFailed {
            response,
            cause: cause.into(),
        }
    }
}

/// Outcome of deserializing a completed response body
#[derive(Debug)]
pub enum DecodeAttempt {
    /// The body could not be decoded
    Failed(BoxError),
    /// The body decoded, but carried no payload
    Empty,
    /// The body decoded into a result object
    Decoded(ResultObject),
}

/// Decodes a raw response body into a [`ResultObject`].
///
/// The wire codec lives outside this crate; anything that can turn bytes
/// into a [`DecodeAttempt`] can be plugged in, including closures.
pub trait ResultDecoder {
    /// Decode the body of a completed response
    fn decode(&self, body: &[u8]) -> DecodeAttempt;
}

impl<F> ResultDecoder for F
where
    F: Fn(&[u8]) -> DecodeAttempt,
{
    fn decode(&self, body: &[u8]) -> DecodeAttempt {
        self(body)
    }
}
