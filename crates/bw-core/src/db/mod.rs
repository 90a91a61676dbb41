//! Database layer for Breachward.
//!
//! This module provides PostgreSQL persistence for incidents, notifications,
//! remediations, and the staff directory, plus in-memory mocks for tests.

mod error;
pub mod mocks;
mod pool;
mod schema;

pub mod directory_repo;
pub mod incident_repo;
pub mod notification_repo;
pub mod remediation_repo;

pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use schema::run_migrations;

// Re-export repository traits and types
pub use directory_repo::DirectoryRepository;
pub use incident_repo::{IncidentFilter, IncidentRepository, Pagination};
pub use notification_repo::NotificationRepository;
pub use remediation_repo::RemediationRepository;

// Re-export factory functions
pub use directory_repo::create_directory_repository;
pub use incident_repo::create_incident_repository;
pub use notification_repo::create_notification_repository;
pub use remediation_repo::create_remediation_repository;
