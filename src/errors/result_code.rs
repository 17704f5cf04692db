//! Protocol result codes and their mapping onto error kinds.

use super::ErrorKind;
use crate::types::HttpResponse;
use std::fmt;

/// Status code carried in the `resultCode` field of an OCHP `Result`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// The operation succeeded
    Ok,
    /// Only part of the submitted data could be processed
    Partly,
    /// The requested object does not exist
    NotFound,
    /// The caller may not perform the operation
    NotAuthorized,
    /// The operation is not supported by the server
    NotSupported,
    /// An identifier in the request is malformed or unknown
    InvalidId,
    /// The server failed internally
    Server,
    /// The request was malformed
    Format,
    /// A roaming partner could not be reached or refused the operation
    Roaming,
    /// Any other non-empty code
    Unknown(String),
}

impl ResultCode {
    /// Parse a raw code. Never fails; unrecognised codes become `Unknown`.
    pub fn parse(code: &str) -> Self {
        match code {
            "ok" => Self::Ok,
            "partly" => Self::Partly,
            "not-found" => Self::NotFound,
            "not-authorized" => Self::NotAuthorized,
            "not-supported" => Self::NotSupported,
            "invalid-id" => Self::InvalidId,
            "server" => Self::Server,
            "format" => Self::Format,
            "roaming" => Self::Roaming,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The wire form of this code
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "ok",
            Self::Partly => "partly",
            Self::NotFound => "not-found",
            Self::NotAuthorized => "not-authorized",
            Self::NotSupported => "not-supported",
            Self::InvalidId => "invalid-id",
            Self::Server => "server",
            Self::Format => "format",
            Self::Roaming => "roaming",
            Self::Unknown(code) => code,
        }
    }

    /// Whether this code reports success
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Error kind for this code, `None` for `ok`
    pub fn error_kind(&self) -> Option<ErrorKind> {
        let kind = match self {
            Self::Ok => return None,
            Self::Partly => ErrorKind::Partly,
            Self::NotFound => ErrorKind::NotFound,
            Self::NotAuthorized => ErrorKind::NotAuthorized,
            Self::NotSupported => ErrorKind::NotSupported,
            Self::InvalidId => ErrorKind::InvalidId,
            Self::Server => ErrorKind::Server,
            Self::Format => ErrorKind::Format,
            Self::Roaming => ErrorKind::Roaming,
            Self::Unknown(_) => ErrorKind::UnknownResultCode,
        };
        Some(kind)
    }
}

impl From<&str> for ResultCode {
    fn from(code: &str) -> Self {
        Self::parse(code)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the error kind for a decoded result, or `None` if the call succeeded.
///
/// A non-empty code other than `ok` always selects its own kind, whatever
/// the HTTP status. A non-2xx status with an empty or `ok` code yields
/// [`ErrorKind::Http`].
pub fn dispatch(result_code: &str, response: Option<&HttpResponse>) -> Option<ErrorKind> {
    if !result_code.is_empty() {
        if let Some(kind) = ResultCode::parse(result_code).error_kind() {
            return Some(kind);
        }
    }

    match response {
        Some(response) if !response.is_success() => Some(ErrorKind::Http),
        _ => None,
    }
}
