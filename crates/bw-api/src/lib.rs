//! # bw-api
//!
//! REST API server for Breachward.
//!
//! This crate provides the HTTP API over breach incidents and their
//! notifications and remediations, backed by the services in `bw-core`.

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use server::{ApiServer, ApiServerConfig};
pub use state::AppState;
