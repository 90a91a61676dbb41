//! # bw-core
//!
//! Core domain logic for Breachward.
//!
//! This crate provides the breach incident data models, the Postgres
//! repositories and their in-memory mocks, the notification templates, and
//! the services that drive the incident, notification, and remediation
//! workflows.

pub mod db;
pub mod directory;
pub mod error;
pub mod incident;
pub mod notification;
pub mod remediation;
pub mod service;
pub mod templates;

pub use directory::{DpoContact, StaffRole};
pub use error::CoreError;
pub use incident::{Incident, IncidentStatus, IncidentWithReporter, NewIncident};
pub use notification::{
    default_recipient_type, NewNotification, Notification, NotificationStatus, NotificationType,
    NotificationWithSender,
};
pub use remediation::{NewRemediation, Remediation, RemediationUpdate, RemediationWithActor};
pub use templates::{severity_color, Recipient, RenderedEmail};

// Service exports
pub use service::{
    AlertConfig, CreateIncidentInput, CreateNotificationInput, IncidentPage, IncidentService,
    NotificationService, RecipientResolver, RemediationInput, RemediationService,
};
