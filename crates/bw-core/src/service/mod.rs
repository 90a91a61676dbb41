//! Service layer for the breach workflow.
//!
//! Services tie repositories, templates, and the mail transport together
//! behind the operations the API and CLI expose.

mod incidents;
mod notifications;
mod recipients;
mod remediations;

pub use incidents::{AlertConfig, CreateIncidentInput, IncidentPage, IncidentService};
pub use notifications::{CreateNotificationInput, NotificationService};
pub use recipients::RecipientResolver;
pub use remediations::{RemediationInput, RemediationService};
