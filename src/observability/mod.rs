//! Observability helpers for the OCHP client.
//!
//! Provides tracing spans and log-safe rendering of diagnostics.

pub mod logging;
pub mod tracing_utils;

pub use logging::*;
pub use tracing_utils::*;
