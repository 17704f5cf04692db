//! Error types for the OCHP client.
//!
//! Every failure a call can run into is reported as an [`OchpError`]. How
//! much an error can tell depends on how far the call got:
//!
//! - [`TransportError`]: no HTTP exchange completed. Only the cause is known.
//! - [`DecodeError`]: the server answered, but the body could not be decoded.
//!   The HTTP response (and, if configured, the body) is known.
//! - [`EmptyResponseError`]: the server answered with an empty body.
//! - [`ResultError`]: the body decoded and its `Result` signalled a failure.
//!   Result code and description are known as well.
//!
//! All of them implement [`Diagnostics`], so callers can inspect any error
//! without first checking which stage it came from.

mod result_code;

pub use result_code::{dispatch, ResultCode};

use crate::types::{HttpResponse, ResultObject};
use bytes::Bytes;
use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error used for wrapped causes
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type for OCHP operations
pub type OchpResult<T> = Result<T, OchpError>;

/// Diagnostic accessors shared by every OCHP error.
///
/// Fields for stages that were never reached are empty or `None`.
pub trait Diagnostics: StdError + Send + Sync {
    /// Human readable description
    fn message(&self) -> String {
        self.to_string()
    }

    /// Underlying library, transport or decode error
    fn wrapped_error(&self) -> Option<&(dyn StdError + 'static)> {
        self.source()
    }

    /// `resultCode` of the OCHP `Result` object, empty if unavailable
    fn result_code(&self) -> &str {
        ""
    }

    /// `resultDescription` of the OCHP `Result` object, empty if unavailable
    fn result_description(&self) -> &str {
        ""
    }

    /// Metadata of the HTTP response, if the exchange completed
    fn http_response(&self) -> Option<&HttpResponse> {
        None
    }

    /// Copy of the response body, if body capture was enabled
    fn http_response_body(&self) -> Option<&[u8]> {
        None
    }
}

/// Concrete kind of an [`OchpError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No HTTP exchange completed
    Transport,
    /// Response could not be decoded
    Decode,
    /// Response body was empty
    EmptyResponse,
    /// `resultCode` was `partly`
    Partly,
    /// `resultCode` was `not-found`
    NotFound,
    /// `resultCode` was `not-authorized`
    NotAuthorized,
    /// `resultCode` was `not-supported`
    NotSupported,
    /// `resultCode` was `invalid-id`
    InvalidId,
    /// `resultCode` was `server`
    Server,
    /// `resultCode` was `format`
    Format,
    /// `resultCode` was `roaming`
    Roaming,
    /// `resultCode` was neither `ok` nor any known failure code
    UnknownResultCode,
    /// HTTP status outside [200, 300)
    Http,
}

impl ErrorKind {
    /// Stable identifier for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Decode => "decode",
            Self::EmptyResponse => "empty-response",
            Self::Partly => "partly",
            Self::NotFound => "not-found",
            Self::NotAuthorized => "not-authorized",
            Self::NotSupported => "not-supported",
            Self::InvalidId => "invalid-id",
            Self::Server => "server",
            Self::Format => "format",
            Self::Roaming => "roaming",
            Self::UnknownResultCode => "unknown-result-code",
            Self::Http => "http",
        }
    }

    /// Whether this kind comes from a decoded `Result` object
    pub fn is_result(&self) -> bool {
        !matches!(self, Self::Transport | Self::Decode | Self::EmptyResponse)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root error type for OCHP calls
#[derive(Error, Debug)]
pub enum OchpError {
    /// The request never completed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The response body was empty
    #[error(transparent)]
    EmptyResponse(#[from] EmptyResponseError),

    /// The decoded `Result` object reported a failure
    #[error(transparent)]
    Result(#[from] ResultError),
}

impl OchpError {
    /// Discriminant callers can match on
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Decode(_) => ErrorKind::Decode,
            Self::EmptyResponse(_) => ErrorKind::EmptyResponse,
            Self::Result(err) => err.kind(),
        }
    }

    /// Attach caller data to a `partly` error; no-op for other errors
    pub fn with_partly_data<T: Any + Send + Sync>(self, data: T) -> Self {
        match self {
            Self::Result(err) => Self::Result(err.with_partly_data(data)),
            other => other,
        }
    }

    /// Caller data previously attached to a `partly` error
    pub fn partly_data<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Result(err) => err.partly_data(),
            _ => None,
        }
    }

    fn as_diagnostics(&self) -> &dyn Diagnostics {
        match self {
            Self::Transport(err) => err,
            Self::Decode(err) => err,
            Self::EmptyResponse(err) => err,
            Self::Result(err) => err,
        }
    }
}

impl Diagnostics for OchpError {
    fn result_code(&self) -> &str {
        self.as_diagnostics().result_code()
    }

    fn result_description(&self) -> &str {
        self.as_diagnostics().result_description()
    }

    fn http_response(&self) -> Option<&HttpResponse> {
        self.as_diagnostics().http_response()
    }

    fn http_response_body(&self) -> Option<&[u8]> {
        self.as_diagnostics().http_response_body()
    }
}

impl From<ConfigurationError> for OchpError {
    fn from(err: ConfigurationError) -> Self {
        Self::Transport(TransportError::new(err))
    }
}

/// What is known about a completed HTTP exchange
#[derive(Debug, Clone, Default)]
pub struct ResponseDiagnostics {
    response: Option<HttpResponse>,
    body: Option<Bytes>,
}

impl ResponseDiagnostics {
    /// Bundle response metadata with an optional body snapshot
    pub fn new(response: Option<HttpResponse>, body: Option<Bytes>) -> Self {
        Self { response, body }
    }

    /// Response metadata
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    /// Body snapshot
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// The HTTP request did not complete
#[derive(Debug)]
pub struct TransportError {
    source: Option<BoxError>,
}

impl TransportError {
    /// Wrap the error that stopped the request
    pub fn new(cause: impl Into<BoxError>) -> Self {
        Self {
            source: Some(cause.into()),
        }
    }

    /// Transport failure without a known cause
    pub fn unknown() -> Self {
        Self { source: None }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{source}"),
            None => f.write_str("unknown error"),
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

impl Diagnostics for TransportError {}

/// The server responded, but the response could not be decoded
#[derive(Debug)]
pub struct DecodeError {
    source: Option<BoxError>,
    diagnostics: ResponseDiagnostics,
}

impl DecodeError {
    /// Create a decode error
    pub fn new(source: Option<BoxError>, diagnostics: ResponseDiagnostics) -> Self {
        Self {
            source,
            diagnostics,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_decode_message(f, &self.diagnostics, self.source.as_deref())
    }
}

impl StdError for DecodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

impl Diagnostics for DecodeError {
    fn http_response(&self) -> Option<&HttpResponse> {
        self.diagnostics.response()
    }

    fn http_response_body(&self) -> Option<&[u8]> {
        self.diagnostics.body()
    }
}

/// The server responded with an empty body.
///
/// OCHP servers do this for some malformed requests instead of returning a
/// `format` result.
#[derive(Error, Debug)]
#[error("Server unexpectedly responded with an empty response. This indicates an internal error. This might be caused by a bad request")]
pub struct EmptyResponseError {
    diagnostics: ResponseDiagnostics,
}

impl EmptyResponseError {
    /// Create an empty response error
    pub fn new(diagnostics: ResponseDiagnostics) -> Self {
        Self { diagnostics }
    }
}

impl Diagnostics for EmptyResponseError {
    fn http_response(&self) -> Option<&HttpResponse> {
        self.diagnostics.response()
    }

    fn http_response_body(&self) -> Option<&[u8]> {
        self.diagnostics.body()
    }
}

/// The decoded OCHP `Result` object (or the HTTP status) reported a failure
#[derive(Debug)]
pub struct ResultError {
    kind: ErrorKind,
    result: ResultObject,
    diagnostics: ResponseDiagnostics,
    partly: Option<Arc<dyn Any + Send + Sync>>,
}

impl ResultError {
    /// Create a result error of the given kind
    pub fn new(kind: ErrorKind, result: ResultObject, diagnostics: ResponseDiagnostics) -> Self {
        debug_assert!(kind.is_result(), "{kind} is not a result kind");
        Self {
            kind,
            result,
            diagnostics,
            partly: None,
        }
    }

    /// Kind selected from the result code and HTTP status
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The decoded result object
    pub fn result(&self) -> &ResultObject {
        &self.result
    }

    /// Attach data describing what the server could not process.
    ///
    /// Only `partly` errors keep the data.
    pub fn with_partly_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        if self.kind == ErrorKind::Partly {
            self.partly = Some(Arc::new(data));
        } else {
            tracing::debug!(kind = %self.kind, "Ignoring partly data on non-partly error");
        }
        self
    }

    /// Data attached with [`ResultError::with_partly_data`]
    pub fn partly_data<T: Any>(&self) -> Option<&T> {
        self.partly.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Display for ResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = match self.diagnostics.response() {
            Some(response) if !self.result.is_empty() => response,
            _ => return write_decode_message(f, &self.diagnostics, None),
        };

        if response.is_success() {
            write!(
                f,
                "server responded with http status {} and resultCode \"{}\": {}",
                response.status_code(),
                self.result.result_code,
                self.result.result_description
            )
        } else {
            write!(
                f,
                "server responded with resultCode \"{}\": {}",
                self.result.result_code, self.result.result_description
            )
        }
    }
}

impl StdError for ResultError {}

impl Diagnostics for ResultError {
    fn result_code(&self) -> &str {
        &self.result.result_code
    }

    fn result_description(&self) -> &str {
        &self.result.result_description
    }

    fn http_response(&self) -> Option<&HttpResponse> {
        self.diagnostics.response()
    }

    fn http_response_body(&self) -> Option<&[u8]> {
        self.diagnostics.body()
    }
}

fn write_decode_message(
    f: &mut fmt::Formatter<'_>,
    diagnostics: &ResponseDiagnostics,
    source: Option<&(dyn StdError + Send + Sync + 'static)>,
) -> fmt::Result {
    f.write_str("server responded")?;
    if let Some(response) = diagnostics.response() {
        write!(f, " with HTTP status{}", response.status_code())?;
    }
    f.write_str(", but response was unable to be decoded successfully")?;
    if let Some(source) = source {
        write!(f, ":\n{source}")?;
    }
    Ok(())
}

/// Network errors raised by the reqwest transport
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] reqwest::Error),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Any other HTTP error
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout(err)
        } else if err.is_connect() {
            NetworkError::ConnectionFailed(err)
        } else {
            NetworkError::Http(err)
        }
    }
}

impl From<NetworkError> for OchpError {
    fn from(err: NetworkError) -> Self {
        Self::Transport(TransportError::new(err))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Endpoint URL could not be parsed or has the wrong scheme
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(String),
}
