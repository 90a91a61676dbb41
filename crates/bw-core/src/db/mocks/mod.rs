//! Mock implementations of repository traits for testing.
//!
//! These mocks use in-memory storage and do not require a database
//! connection. They are useful for unit testing route handlers, services,
//! and other components that depend on repositories.

mod directory_repo;
mod incident_repo;
mod notification_repo;
mod remediation_repo;

pub use directory_repo::MockDirectoryRepository;
pub use incident_repo::MockIncidentRepository;
pub use notification_repo::MockNotificationRepository;
pub use remediation_repo::MockRemediationRepository;
