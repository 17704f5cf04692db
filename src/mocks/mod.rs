//! Mock implementations for testing.
//!
//! Provides a scripted transport so calls can be classified without a
//! server.

use crate::transport::{HttpTransport, SoapRequest};
use crate::types::{HttpResponse, TransportAttempt};
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Mock response configuration
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Response body
    pub body: Bytes,
    /// HTTP status code
    pub status: u16,
    /// Transport failure to report instead of a response
    pub error: Option<String>,
}

impl MockResponse {
    /// Create a 200 response with the given body
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::with_status(200, body)
    }

    /// Create a response with an arbitrary status
    pub fn with_status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            status,
            error: None,
        }
    }

    /// Create a transport failure
    pub fn transport_error(message: impl Into<String>) -> Self {
        Self {
            body: Bytes::new(),
            status: 0,
            error: Some(message.into()),
        }
    }

    fn into_attempt(self) -> TransportAttempt {
        if let Some(error) = self.error {
            return TransportAttempt::failed(error);
        }

        match StatusCode::from_u16(self.status) {
            Ok(status) => TransportAttempt::completed(HttpResponse::new(status), self.body),
            Err(err) => TransportAttempt::failed(err),
        }
    }
}

/// Recorded request for verification
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL
    pub url: String,
    /// SOAP action
    pub action: String,
    /// Request body
    pub body: Bytes,
    /// Request headers
    pub headers: Vec<(String, String)>,
}

/// Mock HTTP transport for testing
pub struct MockHttpTransport {
    /// Queue of responses to return
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Recorded requests
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Default response if queue is empty
    default_response: Option<MockResponse>,
}

impl MockHttpTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            default_response: None,
        }
    }

    /// Add a response to the queue
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Add multiple responses
    pub fn add_responses(self, responses: impl IntoIterator<Item = MockResponse>) -> Self {
        self.responses.lock().extend(responses);
        self
    }

    /// Set default response when queue is empty
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Get the last recorded request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Get remaining response count
    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().len()
    }

    fn record_request(&self, request: &SoapRequest) {
        let headers = request
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        self.requests.lock().push(RecordedRequest {
            url: request.url.to_string(),
            action: request.action.clone(),
            body: request.body.clone(),
            headers,
        });
    }

    fn next_response(&self) -> Option<MockResponse> {
        let mut queue = self.responses.lock();
        queue.pop_front().or_else(|| self.default_response.clone())
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: SoapRequest) -> TransportAttempt {
        self.record_request(&request);

        let Some(response) = self.next_response() else {
            return TransportAttempt::failed("No mock response configured");
        };

        response.into_attempt()
    }
}

impl std::fmt::Debug for MockHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpTransport")
            .field("pending_responses", &self.responses.lock().len())
            .field("recorded_requests", &self.requests.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request() -> SoapRequest {
        SoapRequest::new(
            Url::parse("https://ochp.example.com/service").unwrap(),
            "GetStatus",
            "<Envelope/>",
        )
    }

    #[tokio::test]
    async fn test_mock_transport_returns_queued_responses() {
        let transport = MockHttpTransport::new()
            .add_responses([MockResponse::ok(r#"{"resultCode":"ok"}"#), MockResponse::with_status(503, "")]);

        match transport.send(request()).await {
            TransportAttempt::Completed { response, body } => {
                assert_eq!(response.status_code(), 200);
                assert!(!body.is_empty());
            }
            other => panic!("unexpected attempt: {other:?}"),
        }

        match transport.send(request()).await {
            TransportAttempt::Completed { response, body } => {
                assert_eq!(response.status_code(), 503);
                assert!(body.is_empty());
            }
            other => panic!("unexpected attempt: {other:?}"),
        }

        assert_eq!(transport.remaining_responses(), 0);
    }

    #[tokio::test]
    async fn test_mock_transport_records_requests() {
        let transport = MockHttpTransport::new().with_default_response(MockResponse::ok("x"));

        transport.send(request()).await;
        transport.send(request()).await;

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "https://ochp.example.com/service");
        assert_eq!(transport.last_request().map(|r| r.action), Some("GetStatus".to_string()));
    }

    #[tokio::test]
    async fn test_mock_transport_failures() {
        let transport = MockHttpTransport::new().add_response(MockResponse::transport_error("connection refused"));

        match transport.send(request()).await {
            TransportAttempt::Failed(cause) => assert_eq!(cause.to_string(), "connection refused"),
            other => panic!("unexpected attempt: {other:?}"),
        }

        match transport.send(request()).await {
            TransportAttempt::Failed(cause) => {
                assert_eq!(cause.to_string(), "No mock response configured")
            }
            other => panic!("unexpected attempt: {other:?}"),
        }
    }
}
