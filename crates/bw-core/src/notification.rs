//! Notification data models.
//!
//! A notification is one outbound regulatory or patient-facing email tied to
//! an incident. Rows are created in `pending` state and moved to `sent` or
//! `failed` by an explicit send step; a failed row can be retried by sending
//! it again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An outbound breach notification and its delivery state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Store-assigned identifier.
    pub id: i64,
    /// Incident this notification belongs to.
    pub incident_id: i64,
    /// Which templated notification this is. Stored as free text and parsed
    /// at send time; unknown values fail the send, not the create.
    pub notification_type: String,
    /// Audience label, e.g. "supervisory_authority" or "individual".
    pub recipient_type: String,
    /// Destination address.
    pub recipient_email: String,
    /// Destination display name, when known.
    pub recipient_name: Option<String>,
    /// Staff user who performed the most recent send attempt.
    pub sent_by: Option<i64>,
    /// Delivery state of the most recent attempt.
    pub status: NotificationStatus,
    /// When the notification was successfully sent. Null until a send
    /// succeeds, and cleared again if a later attempt fails.
    pub sent_at: Option<DateTime<Utc>>,
    /// Template identifier recorded by the send step.
    pub template_used: Option<String>,
    /// Failure detail from the most recent attempt, if it failed.
    pub error_message: Option<String>,
    /// Timestamp when the notification row was created.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new notification row.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub incident_id: i64,
    pub notification_type: String,
    pub recipient_type: String,
    pub recipient_email: String,
    pub recipient_name: Option<String>,
}

/// Notification enriched with the sending user's directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationWithSender {
    #[serde(flatten)]
    pub notification: Notification,
    pub sender_email: Option<String>,
    pub sender_name: Option<String>,
}

/// Delivery states for a notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Created but not yet sent.
    Pending,
    /// Last send attempt succeeded.
    Sent,
    /// Last send attempt failed.
    Failed,
}

impl NotificationStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(NotificationStatus::Pending),
            "sent" => Some(NotificationStatus::Sent),
            "failed" => Some(NotificationStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// The notification templates the renderer knows how to produce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// GDPR Article 33 report to the supervisory authority.
    GdprSupervisory,
    /// HIPAA Breach Notification Rule report to HHS.
    HipaaHhs,
    /// Plain-language notice to an affected individual.
    IndividualPatient,
}

impl NotificationType {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            NotificationType::GdprSupervisory => "gdpr_supervisory",
            NotificationType::HipaaHhs => "hipaa_hhs",
            NotificationType::IndividualPatient => "individual_patient",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "gdpr_supervisory" => Some(NotificationType::GdprSupervisory),
            "hipaa_hhs" => Some(NotificationType::HipaaHhs),
            "individual_patient" => Some(NotificationType::IndividualPatient),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// Default audience label for a notification type.
///
/// Unknown types fall through to "individual", matching the create path's
/// tolerance for types it cannot yet render.
pub fn default_recipient_type(notification_type: &str) -> &'static str {
    match NotificationType::from_db_str(notification_type) {
        Some(NotificationType::GdprSupervisory) => "supervisory_authority",
        Some(NotificationType::HipaaHhs) => "hhs",
        Some(NotificationType::IndividualPatient) | None => "individual",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_status_round_trip() {
        for status in [
            NotificationStatus::Pending,
            NotificationStatus::Sent,
            NotificationStatus::Failed,
        ] {
            assert_eq!(
                NotificationStatus::from_db_str(status.as_db_str()),
                Some(status)
            );
        }
        assert_eq!(NotificationStatus::from_db_str("queued"), None);
    }

    #[test]
    fn test_notification_type_round_trip() {
        for kind in [
            NotificationType::GdprSupervisory,
            NotificationType::HipaaHhs,
            NotificationType::IndividualPatient,
        ] {
            assert_eq!(NotificationType::from_db_str(kind.as_db_str()), Some(kind));
        }
        assert_eq!(NotificationType::from_db_str("ccpa_ag"), None);
    }

    #[test]
    fn test_default_recipient_type_per_kind() {
        assert_eq!(default_recipient_type("gdpr_supervisory"), "supervisory_authority");
        assert_eq!(default_recipient_type("hipaa_hhs"), "hhs");
        assert_eq!(default_recipient_type("individual_patient"), "individual");
    }

    #[test]
    fn test_default_recipient_type_unknown_falls_back_to_individual() {
        assert_eq!(default_recipient_type("state_ag"), "individual");
        assert_eq!(default_recipient_type(""), "individual");
    }
}
