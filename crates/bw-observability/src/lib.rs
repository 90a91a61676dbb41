//! # bw-observability
//!
//! Logging infrastructure for Breachward.
//!
//! This crate provides structured logging with tracing for the API server
//! and CLI.

pub mod logging;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
