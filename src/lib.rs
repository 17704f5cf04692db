//! OCHP Client
//!
//! Error classification for OCHP SOAP calls:
//! - One error type, [`OchpError`], for every way a call can fail
//! - Diagnostics that grow with how far the call got ([`Diagnostics`])
//! - A discriminant per protocol result code ([`ErrorKind`])
//! - Opt-in capture of the raw response body
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ochp_client::{Diagnostics, ErrorKind, OchpClient, OchpConfig};
//! use ochp_client::types::{DecodeAttempt, ResultObject};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ochp_client::create_client(
//!         OchpConfig::builder()
//!             .endpoint("https://ochp.example.com/service/ochp/v1.4")?
//!             .capture_response_body(true)
//!             .build()?,
//!     )?;
//!
//!     let decoder = |_body: &[u8]| DecodeAttempt::Decoded(ResultObject::new("ok", ""));
//!     match client.call("GetStatus", "<Envelope/>".into(), &decoder).await {
//!         Ok(result) => println!("ok: {}", result.result_description),
//!         Err(err) if err.kind() == ErrorKind::NotFound => println!("nothing there"),
//!         Err(err) => eprintln!("{} (body: {:?})", err, err.http_response_body()),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Core modules
pub mod classifier;
pub mod client;
pub mod config;
pub mod errors;
pub mod transport;
pub mod types;

// Observability
pub mod observability;

// Testing utilities
pub mod mocks;

// Tests
#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use classifier::ErrorClassifier;
pub use client::{OchpClient, OchpClientImpl};
pub use config::{OchpConfig, OchpConfigBuilder};
pub use errors::{Diagnostics, ErrorKind, OchpError, OchpResult};

/// Placeholder endpoint used until one is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/ochp";

/// Default timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Create an OCHP client with the given configuration
pub fn create_client(config: OchpConfig) -> OchpResult<OchpClientImpl> {
    OchpClientImpl::new(config)
}

/// Create an OCHP client from environment variables
///
/// Reads:
/// - `OCHP_ENDPOINT` - SOAP endpoint URL
/// - `OCHP_TIMEOUT` - Request timeout in seconds
/// - `OCHP_CAPTURE_RESPONSE_BODY` - Keep response bodies on errors (`true`/`false`)
/// - `OCHP_USERNAME` / `OCHP_PASSWORD` - Basic auth credentials
pub fn create_client_from_env() -> OchpResult<OchpClientImpl> {
    let config = OchpConfig::from_env()?;
    create_client(config)
}
