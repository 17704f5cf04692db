//! OCHP client implementation.
//!
//! Sends serialized calls through an [`HttpTransport`] and classifies the
//! outcome. Retrying is left to callers, who can branch on
//! [`OchpError::kind`](crate::errors::OchpError::kind).

use crate::classifier::ErrorClassifier;
use crate::config::OchpConfig;
use crate::errors::OchpResult;
use crate::observability::{create_call_span, record_error, record_success};
use crate::transport::{HttpTransport, ReqwestTransport, SoapRequest};
use crate::types::{ResultDecoder, ResultObject};
use bytes::Bytes;
use std::sync::Arc;
use tracing::Instrument;

/// Trait defining the OCHP client interface
#[async_trait::async_trait]
pub trait OchpClient: Send + Sync {
    /// Get the configuration
    fn config(&self) -> &OchpConfig;

    /// Send a serialized envelope for `action` and classify the outcome.
    ///
    /// Returns the decoded `Result` object of a successful call.
    async fn call(
        &self,
        action: &str,
        envelope: Bytes,
        decoder: &(dyn ResultDecoder + Sync),
    ) -> OchpResult<ResultObject>;
}

/// Main OCHP client implementation
pub struct OchpClientImpl {
    config: Arc<OchpConfig>,
    transport: Arc<dyn HttpTransport>,
    classifier: ErrorClassifier,
}

impl OchpClientImpl {
    /// Create a new client with the given configuration
    pub fn new(config: OchpConfig) -> OchpResult<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client using a custom transport
    pub fn with_transport(config: OchpConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let classifier = ErrorClassifier::from_config(&config);
        Self {
            config: Arc::new(config),
            transport,
            classifier,
        }
    }

    fn build_request(&self, action: &str, envelope: Bytes) -> SoapRequest {
        SoapRequest::new(self.config.endpoint.clone(), action, envelope)
            .with_headers(&self.config.default_headers)
            .with_timeout(self.config.timeout)
    }
}

#[async_trait::async_trait]
impl OchpClient for OchpClientImpl {
    fn config(&self) -> &OchpConfig {
        &self.config
    }

    async fn call(
        &self,
        action: &str,
        envelope: Bytes,
        decoder: &(dyn ResultDecoder + Sync),
    ) -> OchpResult<ResultObject> {
        let call_id = uuid::Uuid::new_v4().to_string();
        let span = create_call_span(action, &call_id);
        let request = self.build_request(action, envelope);

        let attempt = self
            .transport
            .send(request)
            .instrument(span.clone())
            .await;

        let outcome = self.classifier.classify(attempt, decoder);
        match &outcome {
            Ok(_) => record_success(&span),
            Err(err) => record_error(&span, err),
        }
        outcome
    }
}

impl std::fmt::Debug for OchpClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OchpClientImpl")
            .field("config", &self.config)
            .field("classifier", &self.classifier)
            .finish()
    }
}
