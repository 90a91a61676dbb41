//! Notification creation and dispatch.

use std::sync::Arc;

use bw_mailer::{MailTransport, OutboundEmail};
use tracing::{error, info, instrument, warn};

use crate::db::{DirectoryRepository, IncidentRepository, NotificationRepository};
use crate::error::CoreError;
use crate::notification::{
    default_recipient_type, NewNotification, Notification, NotificationType,
    NotificationWithSender,
};
use crate::templates::{self, Recipient};

/// Caller-supplied fields for creating a notification.
#[derive(Debug, Clone, Default)]
pub struct CreateNotificationInput {
    pub notification_type: String,
    pub recipient_type: Option<String>,
    pub recipient_email: String,
    pub recipient_name: Option<String>,
}

/// Creates notification rows and drives the explicit send step.
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    incidents: Arc<dyn IncidentRepository>,
    directory: Arc<dyn DirectoryRepository>,
    mailer: Arc<dyn MailTransport>,
}

impl NotificationService {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        incidents: Arc<dyn IncidentRepository>,
        directory: Arc<dyn DirectoryRepository>,
        mailer: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            notifications,
            incidents,
            directory,
            mailer,
        }
    }

    /// Creates a pending notification for an incident.
    ///
    /// An omitted or blank `recipient_type` defaults from the notification
    /// type. The type itself is stored as given; it is only parsed when the
    /// notification is sent.
    pub async fn create_notification(
        &self,
        incident_id: i64,
        input: CreateNotificationInput,
    ) -> Result<Notification, CoreError> {
        if input.notification_type.trim().is_empty() {
            return Err(CoreError::Validation(
                "notification_type is required".to_string(),
            ));
        }
        if input.recipient_email.trim().is_empty() {
            return Err(CoreError::Validation(
                "recipient_email is required".to_string(),
            ));
        }

        self.incidents
            .get(incident_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Incident", incident_id))?;

        let recipient_type = input
            .recipient_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_recipient_type(&input.notification_type).to_string());

        let notification = self
            .notifications
            .create(&NewNotification {
                incident_id,
                notification_type: input.notification_type,
                recipient_type,
                recipient_email: input.recipient_email,
                recipient_name: input.recipient_name,
            })
            .await?;

        info!(
            notification_id = notification.id,
            incident_id,
            notification_type = %notification.notification_type,
            "breach notification created"
        );
        Ok(notification)
    }

    /// Renders and sends a notification, recording the outcome on the row.
    ///
    /// A transport failure is a normal outcome: the row moves to `failed`
    /// and is returned as `Ok`. Sending again later retries from scratch;
    /// the row always reflects the latest attempt.
    #[instrument(skip(self), fields(notification_id = id))]
    pub async fn send_notification(
        &self,
        id: i64,
        sent_by: Option<i64>,
    ) -> Result<Notification, CoreError> {
        let notification = self
            .notifications
            .get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Notification", id))?;

        let incident = self
            .incidents
            .get(notification.incident_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Incident", notification.incident_id))?;

        let kind = NotificationType::from_db_str(&notification.notification_type).ok_or_else(
            || CoreError::UnknownNotificationType(notification.notification_type.clone()),
        )?;

        let recipient = Recipient {
            email: notification.recipient_email.clone(),
            name: notification.recipient_name.clone(),
        };

        let email = match kind {
            NotificationType::GdprSupervisory => {
                let dpo = match self.directory.latest_dpo_contact().await {
                    Ok(contact) => contact,
                    Err(e) => {
                        warn!(error = %e, "DPO lookup failed, rendering without DPO block");
                        None
                    }
                };
                templates::render_gdpr_supervisory(&incident, &recipient, dpo.as_ref())?
            }
            NotificationType::HipaaHhs => templates::render_hipaa_hhs(&incident, &recipient)?,
            NotificationType::IndividualPatient => {
                templates::render_individual_patient(&incident, &recipient)?
            }
        };

        let template_used = kind.as_db_str();
        let outbound = OutboundEmail {
            to: notification.recipient_email.clone(),
            subject: email.subject,
            body: email.html,
            is_html: true,
        };

        let updated = match self.mailer.send(&outbound).await {
            Ok(receipt) if receipt.accepted => {
                info!(
                    incident_id = incident.id,
                    recipient = %notification.recipient_email,
                    "breach notification sent"
                );
                self.notifications.mark_sent(id, sent_by, template_used).await?
            }
            Ok(receipt) => {
                let message = receipt
                    .message
                    .unwrap_or_else(|| "transport reported failure".to_string());
                warn!(
                    incident_id = incident.id,
                    recipient = %notification.recipient_email,
                    message = %message,
                    "breach notification rejected by mail gateway"
                );
                self.notifications
                    .mark_failed(id, sent_by, template_used, &message)
                    .await?
            }
            Err(e) => {
                error!(
                    incident_id = incident.id,
                    recipient = %notification.recipient_email,
                    error = %e,
                    "breach notification send failed"
                );
                self.notifications
                    .mark_failed(id, sent_by, template_used, &e.to_string())
                    .await?
            }
        };

        Ok(updated)
    }

    /// All notifications recorded against an incident, newest first.
    pub async fn get_notifications(
        &self,
        incident_id: i64,
    ) -> Result<Vec<NotificationWithSender>, CoreError> {
        Ok(self.notifications.list_for_incident(incident_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mocks::{
        MockDirectoryRepository, MockIncidentRepository, MockNotificationRepository,
    };
    use crate::directory::DpoContact;
    use crate::incident::{Incident, IncidentStatus};
    use crate::notification::NotificationStatus;
    use bw_mailer::MockMailTransport;
    use chrono::Utc;

    fn seeded_incident() -> Incident {
        let now = Utc::now();
        Incident {
            id: 1,
            incident_type: "unauthorized_access".to_string(),
            severity: "high".to_string(),
            description: "records system accessed out of hours.".to_string(),
            affected_users: vec!["p1".to_string(), "p2".to_string(), "p3".to_string()],
            affected_data_types: vec!["SSN".to_string(), "diagnosis".to_string()],
            detected_at: now,
            reported_by: None,
            status: IncidentStatus::Confirmed,
            anomaly_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    struct Fixture {
        svc: NotificationService,
        notifications: Arc<MockNotificationRepository>,
        directory: Arc<MockDirectoryRepository>,
        mailer: Arc<MockMailTransport>,
    }

    fn fixture() -> Fixture {
        fixture_with_directory(MockDirectoryRepository::new())
    }

    fn fixture_with_directory(directory: MockDirectoryRepository) -> Fixture {
        let notifications = Arc::new(MockNotificationRepository::new());
        let incidents = Arc::new(MockIncidentRepository::with_incidents(vec![
            seeded_incident(),
        ]));
        let directory = Arc::new(directory);
        let mailer = Arc::new(MockMailTransport::new());
        let svc = NotificationService::new(
            notifications.clone(),
            incidents,
            directory.clone(),
            mailer.clone(),
        );
        Fixture {
            svc,
            notifications,
            directory,
            mailer,
        }
    }

    fn gdpr_input() -> CreateNotificationInput {
        CreateNotificationInput {
            notification_type: "gdpr_supervisory".to_string(),
            recipient_type: None,
            recipient_email: "dpa@example.eu".to_string(),
            recipient_name: Some("Supervisory Authority".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_recipient_type_from_kind() {
        let f = fixture();

        let gdpr = f.svc.create_notification(1, gdpr_input()).await.unwrap();
        assert_eq!(gdpr.recipient_type, "supervisory_authority");
        assert_eq!(gdpr.status, NotificationStatus::Pending);

        let hipaa = f
            .svc
            .create_notification(
                1,
                CreateNotificationInput {
                    notification_type: "hipaa_hhs".to_string(),
                    ..gdpr_input()
                },
            )
            .await
            .unwrap();
        assert_eq!(hipaa.recipient_type, "hhs");

        let unknown = f
            .svc
            .create_notification(
                1,
                CreateNotificationInput {
                    notification_type: "state_ag".to_string(),
                    ..gdpr_input()
                },
            )
            .await
            .unwrap();
        assert_eq!(unknown.recipient_type, "individual");
    }

    #[tokio::test]
    async fn test_create_keeps_explicit_recipient_type() {
        let f = fixture();
        let created = f
            .svc
            .create_notification(
                1,
                CreateNotificationInput {
                    recipient_type: Some("lead_authority".to_string()),
                    ..gdpr_input()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.recipient_type, "lead_authority");
    }

    #[tokio::test]
    async fn test_create_requires_existing_incident() {
        let f = fixture();
        let err = f.svc.create_notification(99, gdpr_input()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let f = fixture();

        let err = f
            .svc
            .create_notification(
                1,
                CreateNotificationInput {
                    notification_type: " ".to_string(),
                    ..gdpr_input()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = f
            .svc
            .create_notification(
                1,
                CreateNotificationInput {
                    recipient_email: String::new(),
                    ..gdpr_input()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_send_success_marks_sent() {
        let f = fixture();
        let created = f.svc.create_notification(1, gdpr_input()).await.unwrap();

        let sent = f.svc.send_notification(created.id, Some(5)).await.unwrap();
        assert_eq!(sent.status, NotificationStatus::Sent);
        assert!(sent.sent_at.is_some());
        assert_eq!(sent.sent_by, Some(5));
        assert_eq!(sent.template_used.as_deref(), Some("gdpr_supervisory"));
        assert!(sent.error_message.is_none());

        let outbox = f.mailer.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].to, "dpa@example.eu");
        assert_eq!(
            outbox[0].subject,
            "GDPR Data Breach Notification - Incident #1"
        );
        assert!(outbox[0].is_html);
    }

    #[tokio::test]
    async fn test_send_includes_dpo_details_when_available() {
        let directory = MockDirectoryRepository::new().with_dpo(DpoContact {
            id: 1,
            name: Some("Erika Muster".to_string()),
            email: "dpo@hospital.example".to_string(),
            phone: None,
            updated_at: Utc::now(),
        });
        let f = fixture_with_directory(directory);
        let created = f.svc.create_notification(1, gdpr_input()).await.unwrap();

        f.svc.send_notification(created.id, None).await.unwrap();
        assert!(f.mailer.outbox()[0].body.contains("Erika Muster"));
    }

    #[tokio::test]
    async fn test_send_survives_dpo_lookup_failure() {
        let f = fixture();
        let created = f.svc.create_notification(1, gdpr_input()).await.unwrap();

        // Directory goes down between create and send.
        f.directory.set_fail(true);
        let sent = f.svc.send_notification(created.id, None).await.unwrap();
        assert_eq!(sent.status, NotificationStatus::Sent);
        assert!(!f.mailer.outbox()[0].body.contains("Data Protection Officer"));
    }

    #[tokio::test]
    async fn test_send_transport_failure_returns_failed_row() {
        let f = fixture();
        f.mailer.fail_with("connection refused");
        let created = f.svc.create_notification(1, gdpr_input()).await.unwrap();

        let failed = f.svc.send_notification(created.id, Some(5)).await.unwrap();
        assert_eq!(failed.status, NotificationStatus::Failed);
        assert!(failed.sent_at.is_none());
        assert!(failed
            .error_message
            .as_deref()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn test_send_gateway_rejection_returns_failed_row() {
        let f = fixture();
        f.mailer.reject_with("mailbox does not exist");
        let created = f.svc.create_notification(1, gdpr_input()).await.unwrap();

        let failed = f.svc.send_notification(created.id, None).await.unwrap();
        assert_eq!(failed.status, NotificationStatus::Failed);
        assert_eq!(
            failed.error_message.as_deref(),
            Some("mailbox does not exist")
        );
    }

    #[tokio::test]
    async fn test_resend_after_failure_clears_error() {
        let f = fixture();
        let created = f.svc.create_notification(1, gdpr_input()).await.unwrap();

        f.mailer.fail_with("smtp down");
        let failed = f.svc.send_notification(created.id, None).await.unwrap();
        assert_eq!(failed.status, NotificationStatus::Failed);

        f.mailer.deliver_all();
        let sent = f.svc.send_notification(created.id, Some(2)).await.unwrap();
        assert_eq!(sent.status, NotificationStatus::Sent);
        assert!(sent.sent_at.is_some());
        assert!(sent.error_message.is_none());
        assert_eq!(sent.sent_by, Some(2));
    }

    #[tokio::test]
    async fn test_send_unknown_type_leaves_row_untouched() {
        let f = fixture();
        let created = f
            .svc
            .create_notification(
                1,
                CreateNotificationInput {
                    notification_type: "state_ag".to_string(),
                    ..gdpr_input()
                },
            )
            .await
            .unwrap();

        let err = f.svc.send_notification(created.id, None).await.unwrap_err();
        assert!(matches!(err, CoreError::UnknownNotificationType(_)));
        assert_eq!(f.mailer.send_count(), 0);

        let stored = f.notifications.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Pending);
        assert!(stored.template_used.is_none());
    }

    #[tokio::test]
    async fn test_send_missing_notification() {
        let f = fixture();
        let err = f.svc.send_notification(42, None).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_individual_notice_uses_generic_subject() {
        let f = fixture();
        let created = f
            .svc
            .create_notification(
                1,
                CreateNotificationInput {
                    notification_type: "individual_patient".to_string(),
                    recipient_type: None,
                    recipient_email: "patient@example.com".to_string(),
                    recipient_name: None,
                },
            )
            .await
            .unwrap();

        f.svc.send_notification(created.id, None).await.unwrap();
        let outbox = f.mailer.outbox();
        assert_eq!(
            outbox[0].subject,
            "Important Notice Regarding Your Personal Information"
        );
        assert!(!outbox[0].body.contains("#1"));
        assert!(outbox[0].body.contains("Valued Patient"));
    }

    #[tokio::test]
    async fn test_list_scopes_to_incident_and_sorts() {
        let f = fixture();
        f.svc.create_notification(1, gdpr_input()).await.unwrap();
        f.svc
            .create_notification(
                1,
                CreateNotificationInput {
                    notification_type: "hipaa_hhs".to_string(),
                    ..gdpr_input()
                },
            )
            .await
            .unwrap();

        let listed = f.svc.get_notifications(1).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].notification.id > listed[1].notification.id);

        assert!(f.svc.get_notifications(99).await.unwrap().is_empty());
    }
}
