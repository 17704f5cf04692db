//! Turns the outcome of a call into a result or a single [`OchpError`].
//!
//! Classification runs in stages. Each stage only runs if the previous one
//! succeeded, and the error it produces carries exactly what was learned up
//! to that point:
//!
//! 1. transport: did an HTTP exchange complete?
//! 2. empty body: did the server send anything at all?
//! 3. decode: could the body be decoded?
//! 4. result: does the decoded `Result` (or the HTTP status) signal failure?

use crate::config::OchpConfig;
use crate::errors::{
    dispatch, BoxError, DecodeError, EmptyResponseError, OchpError, OchpResult,
    ResponseDiagnostics, ResultError, TransportError,
};
use crate::types::{DecodeAttempt, HttpResponse, ResultDecoder, ResultObject, TransportAttempt};
use bytes::Bytes;
use tracing::{debug, trace};

/// Builds error values for failed calls
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier {
    capture_body: bool,
}

impl ErrorClassifier {
    /// Create a classifier
    pub fn new(capture_body: bool) -> Self {
        Self { capture_body }
    }

    /// Create a classifier honouring the body capture setting of `config`
    pub fn from_config(config: &OchpConfig) -> Self {
        Self::new(config.capture_response_body)
    }

    /// Whether errors keep a copy of the response body
    pub fn captures_body(&self) -> bool {
        self.capture_body
    }

    /// Classify a complete call attempt.
    ///
    /// Returns the decoded result if the call succeeded. The decoder is only
    /// invoked for completed exchanges with a non-empty body.
    pub fn classify<D>(&self, attempt: TransportAttempt, decoder: &D) -> OchpResult<ResultObject>
    where
        D: ResultDecoder + ?Sized,
    {
        let (response, body) = match attempt {
            TransportAttempt::Failed(cause) => return Err(self.transport_failure(cause)),
            TransportAttempt::BodyFailed { response, cause } => {
                return Err(self.unreadable_body(cause, response))
            }
            TransportAttempt::Completed { response, body } => (response, body),
        };

        if body.is_empty() {
            return Err(self.empty_response(response, &body));
        }

        match decoder.decode(&body) {
            DecodeAttempt::Failed(cause) => Err(self.decode_failure(cause, response, &body)),
            DecodeAttempt::Empty => Err(self.empty_response(response, &body)),
            DecodeAttempt::Decoded(result) => self.result_failure(result, response, &body),
        }
    }

    /// The request did not complete
    pub fn transport_failure(&self, cause: impl Into<BoxError>) -> OchpError {
        TransportError::new(cause).into()
    }

    /// The server answered, but the body could not be decoded
    pub fn decode_failure(
        &self,
        cause: impl Into<BoxError>,
        response: HttpResponse,
        body: &Bytes,
    ) -> OchpError {
        DecodeError::new(Some(cause.into()), self.diagnostics(response, body)).into()
    }

    /// The server answered, but reading the body failed.
    ///
    /// No body exists to snapshot, whatever the capture setting.
    pub fn unreadable_body(&self, cause: impl Into<BoxError>, response: HttpResponse) -> OchpError {
        DecodeError::new(Some(cause.into()), ResponseDiagnostics::new(Some(response), None)).into()
    }

    /// The server answered with nothing
    pub fn empty_response(&self, response: HttpResponse, body: &Bytes) -> OchpError {
        EmptyResponseError::new(self.diagnostics(response, body)).into()
    }

    /// Inspect a decoded result.
    ///
    /// Hands the result back if neither its code nor the HTTP status signal
    /// a failure.
    pub fn result_failure(
        &self,
        result: ResultObject,
        response: HttpResponse,
        body: &Bytes,
    ) -> Result<ResultObject, OchpError> {
        match dispatch(&result.result_code, Some(&response)) {
            None => {
                trace!(status = response.status_code(), "Call succeeded");
                Ok(result)
            }
            Some(kind) => {
                debug!(
                    kind = %kind,
                    status = response.status_code(),
                    result_code = %result.result_code,
                    "Result signalled failure"
                );
                Err(ResultError::new(kind, result, self.diagnostics(response, body)).into())
            }
        }
    }

    fn diagnostics(&self, response: HttpResponse, body: &Bytes) -> ResponseDiagnostics {
        let snapshot = self.capture_body.then(|| body.clone());
        ResponseDiagnostics::new(Some(response), snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Diagnostics, ErrorKind};
    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use std::io;

    fn completed(status: u16, body: &'static str) -> TransportAttempt {
        TransportAttempt::completed(
            HttpResponse::new(StatusCode::from_u16(status).unwrap()),
            Bytes::from_static(body.as_bytes()),
        )
    }

    fn decoded(code: &'static str, description: &'static str) -> impl Fn(&[u8]) -> DecodeAttempt {
        move |_: &[u8]| DecodeAttempt::Decoded(ResultObject::new(code, description))
    }

    fn failing(_: &[u8]) -> DecodeAttempt {
        DecodeAttempt::Failed("XML syntax error on line 1: unexpected EOF".into())
    }

    #[test]
    fn test_transport_failure_is_terminal() {
        let classifier = ErrorClassifier::new(true);
        let attempt = TransportAttempt::failed(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));

        let err = classifier.classify(attempt, &failing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.message(), "connection refused");
        assert!(err.http_response().is_none());
        assert!(err.http_response_body().is_none());
        assert_eq!(err.result_code(), "");
    }

    #[test]
    fn test_decode_failure() {
        let classifier = ErrorClassifier::default();
        let err = classifier.classify(completed(200, "<soap"), &failing).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(
            err.message(),
            "server responded with HTTP status200, but response was unable to be decoded successfully:\nXML syntax error on line 1: unexpected EOF"
        );
        assert_eq!(err.http_response().map(|r| r.status_code()), Some(200));
        assert_eq!(err.result_code(), "");
        assert!(err.http_response_body().is_none());
        assert!(err.wrapped_error().is_some());
    }

    #[test]
    fn test_unreadable_body_keeps_response() {
        let classifier = ErrorClassifier::new(true);
        let attempt = TransportAttempt::body_failed(
            HttpResponse::new(StatusCode::OK).with_header("content-length", "100"),
            "error decoding response body",
        );
        let decoder = |_: &[u8]| -> DecodeAttempt { unreachable!("decoder must not run") };

        let err = classifier.classify(attempt, &decoder).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(
            err.message(),
            "server responded with HTTP status200, but response was unable to be decoded successfully:\nerror decoding response body"
        );
        let response = err.http_response().unwrap();
        assert_eq!(response.headers["content-length"], "100");
        assert!(err.http_response_body().is_none());
        assert!(err.wrapped_error().is_some());
        assert_eq!(err.result_code(), "");
    }

    #[test]
    fn test_empty_body_skips_decoder() {
        let classifier = ErrorClassifier::default();
        let decoder = |_: &[u8]| -> DecodeAttempt { unreachable!("decoder must not run") };

        let err = classifier.classify(completed(400, ""), &decoder).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
        assert!(err.message().contains("empty response"));
        assert!(err.wrapped_error().is_none());
        assert_eq!(err.http_response().map(|r| r.status_code()), Some(400));
    }

    #[test]
    fn test_decoder_reporting_empty_payload() {
        let classifier = ErrorClassifier::default();
        let decoder = |_: &[u8]| DecodeAttempt::Empty;

        let first = classifier.classify(completed(200, "<Envelope/>"), &decoder).unwrap_err();
        let second = classifier.classify(completed(500, "<Envelope/>"), &decoder).unwrap_err();
        assert_eq!(first.kind(), ErrorKind::EmptyResponse);
        assert_eq!(first.message(), second.message());
    }

    #[test]
    fn test_not_found_result() {
        let classifier = ErrorClassifier::default();
        let err = classifier
            .classify(completed(200, "<Result/>"), &decoded("not-found", "id unknown"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.message(),
            "server responded with http status 200 and resultCode \"not-found\": id unknown"
        );
        assert_eq!(err.result_code(), "not-found");
        assert_eq!(err.result_description(), "id unknown");
    }

    #[test]
    fn test_server_result_on_failed_status() {
        let classifier = ErrorClassifier::default();
        let err = classifier
            .classify(completed(500, "<Result/>"), &decoded("server", "internal error"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.message(), "server responded with resultCode \"server\": internal error");
        assert!(!err.message().contains("500"));
    }

    #[test]
    fn test_ok_result_is_success() {
        let classifier = ErrorClassifier::default();
        let result = classifier
            .classify(completed(200, "<Result/>"), &decoded("ok", ""))
            .unwrap();
        assert_eq!(result.result_code, "ok");

        let result = classifier.classify(completed(204, "<Result/>"), &decoded("", ""));
        assert!(result.is_ok());
    }

    #[test]
    fn test_failed_status_without_result_code_is_http() {
        let classifier = ErrorClassifier::default();

        let err = classifier
            .classify(completed(503, "<Result/>"), &decoded("", ""))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.result_code(), "");

        let err = classifier
            .classify(completed(502, "<Result/>"), &decoded("ok", "fine"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.message(), "server responded with resultCode \"ok\": fine");
    }

    #[test]
    fn test_unknown_result_code() {
        let classifier = ErrorClassifier::default();
        let err = classifier
            .classify(completed(200, "<Result/>"), &decoded("exploded", "boom"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownResultCode);
        assert_eq!(err.result_code(), "exploded");
    }

    #[test]
    fn test_body_snapshot_follows_configuration() {
        let body = "<Result><resultCode>format</resultCode></Result>";

        let err = ErrorClassifier::new(true)
            .classify(completed(200, body), &decoded("format", ""))
            .unwrap_err();
        assert_eq!(err.http_response_body(), Some(body.as_bytes()));

        let err = ErrorClassifier::new(true)
            .classify(completed(200, body), &failing)
            .unwrap_err();
        assert_eq!(err.http_response_body(), Some(body.as_bytes()));

        let err = ErrorClassifier::new(false)
            .classify(completed(200, body), &decoded("format", ""))
            .unwrap_err();
        assert!(err.http_response_body().is_none());
    }

    #[test]
    fn test_from_config() {
        let config = OchpConfig::builder().capture_response_body(true).build_unchecked();
        assert!(ErrorClassifier::from_config(&config).captures_body());
        assert!(!ErrorClassifier::from_config(&OchpConfig::default()).captures_body());
    }
}
