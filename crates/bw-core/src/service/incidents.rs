//! Incident lifecycle service.

use std::sync::Arc;

use bw_mailer::{MailTransport, OutboundEmail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::db::{IncidentFilter, IncidentRepository, Pagination};
use crate::error::CoreError;
use crate::incident::{Incident, IncidentStatus, IncidentWithReporter, NewIncident};
use crate::service::recipients::RecipientResolver;
use crate::templates::render_internal_alert;

/// Toggle for the internal alert broadcast on incident creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertConfig {
    pub enabled: bool,
}

/// Caller-supplied fields for creating an incident.
#[derive(Debug, Clone, Default)]
pub struct CreateIncidentInput {
    pub incident_type: String,
    pub severity: String,
    pub description: String,
    pub affected_users: Option<Vec<String>>,
    pub affected_data_types: Option<Vec<String>>,
    pub detected_at: Option<DateTime<Utc>>,
    pub anomaly_id: Option<i64>,
}

/// One page of an incident listing plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentPage {
    pub incidents: Vec<IncidentWithReporter>,
    pub total: u64,
    pub limit: i64,
    pub offset: i64,
}

/// Create, list, and status operations over breach incidents.
pub struct IncidentService {
    incidents: Arc<dyn IncidentRepository>,
    resolver: RecipientResolver,
    mailer: Arc<dyn MailTransport>,
    alerts: AlertConfig,
}

impl IncidentService {
    pub fn new(
        incidents: Arc<dyn IncidentRepository>,
        resolver: RecipientResolver,
        mailer: Arc<dyn MailTransport>,
        alerts: AlertConfig,
    ) -> Self {
        Self {
            incidents,
            resolver,
            mailer,
            alerts,
        }
    }

    /// Records a new incident in `draft` status.
    ///
    /// Omitted lists default to empty, an omitted `detected_at` defaults to
    /// now. Returns the stored incident; the internal alert broadcast that
    /// follows the insert is best-effort and cannot fail the call.
    pub async fn create_incident(
        &self,
        input: CreateIncidentInput,
        reported_by: Option<i64>,
    ) -> Result<Incident, CoreError> {
        if input.incident_type.trim().is_empty() {
            return Err(CoreError::Validation(
                "incident_type is required".to_string(),
            ));
        }
        if input.severity.trim().is_empty() {
            return Err(CoreError::Validation("severity is required".to_string()));
        }
        if input.description.trim().is_empty() {
            return Err(CoreError::Validation("description is required".to_string()));
        }

        let new_incident = NewIncident {
            incident_type: input.incident_type,
            severity: input.severity,
            description: input.description,
            affected_users: input.affected_users.unwrap_or_default(),
            affected_data_types: input.affected_data_types.unwrap_or_default(),
            detected_at: input.detected_at.unwrap_or_else(Utc::now),
            reported_by,
            status: IncidentStatus::Draft,
            anomaly_id: input.anomaly_id,
        };

        let incident = self.incidents.create(&new_incident).await?;
        info!(
            incident_id = incident.id,
            severity = %incident.severity,
            "breach incident recorded"
        );

        // The row above is already committed; alerting cannot undo it.
        self.broadcast_alert(&incident).await;

        Ok(incident)
    }

    async fn broadcast_alert(&self, incident: &Incident) {
        if !self.alerts.enabled {
            info!(
                incident_id = incident.id,
                "breach alerts disabled, skipping broadcast"
            );
            return;
        }

        let recipients = self.resolver.resolve_breach_recipients().await;
        if recipients.is_empty() {
            warn!(incident_id = incident.id, "no breach alert recipients resolved");
            return;
        }

        let email = render_internal_alert(incident);
        let mut sent = 0usize;
        for recipient in &recipients {
            let outbound = OutboundEmail {
                to: recipient.clone(),
                subject: email.subject.clone(),
                body: email.html.clone(),
                is_html: true,
            };
            match self.mailer.send(&outbound).await {
                Ok(receipt) if receipt.accepted => sent += 1,
                Ok(receipt) => {
                    warn!(
                        incident_id = incident.id,
                        recipient = %recipient,
                        message = receipt.message.as_deref().unwrap_or(""),
                        "breach alert rejected by mail gateway"
                    );
                }
                Err(e) => {
                    error!(
                        incident_id = incident.id,
                        recipient = %recipient,
                        error = %e,
                        "breach alert send failed"
                    );
                }
            }
        }

        info!(
            incident_id = incident.id,
            sent,
            total = recipients.len(),
            "breach alert broadcast complete"
        );
    }

    /// Lists incidents newest-detected first with reporter enrichment.
    pub async fn list_incidents(
        &self,
        filter: IncidentFilter,
        page: Pagination,
    ) -> Result<IncidentPage, CoreError> {
        let page = page.clamped();
        let incidents = self.incidents.list(&filter, &page).await?;
        let total = self.incidents.count(&filter).await?;

        Ok(IncidentPage {
            incidents,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    pub async fn get_incident(&self, id: i64) -> Result<Incident, CoreError> {
        self.incidents
            .get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Incident", id))
    }

    /// Moves an incident to any of the five known statuses.
    pub async fn update_incident_status(
        &self,
        id: i64,
        status: &str,
    ) -> Result<Incident, CoreError> {
        let parsed = IncidentStatus::from_db_str(status).ok_or_else(|| {
            CoreError::Validation(format!(
                "invalid status '{}', expected one of: draft, confirmed, under_investigation, contained, resolved",
                status
            ))
        })?;

        let incident = self.incidents.update_status(id, parsed).await?;
        info!(incident_id = id, status = %parsed, "incident status updated");
        Ok(incident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mocks::{MockDirectoryRepository, MockIncidentRepository};
    use bw_mailer::MockMailTransport;
    use chrono::Duration;

    fn minimal_input() -> CreateIncidentInput {
        CreateIncidentInput {
            incident_type: "unauthorized_access".to_string(),
            severity: "high".to_string(),
            description: "suspicious login burst".to_string(),
            ..Default::default()
        }
    }

    fn service(
        repo: Arc<MockIncidentRepository>,
        directory: MockDirectoryRepository,
        mailer: Arc<MockMailTransport>,
        alerts_enabled: bool,
    ) -> IncidentService {
        IncidentService::new(
            repo,
            RecipientResolver::new(Arc::new(directory)),
            mailer,
            AlertConfig {
                enabled: alerts_enabled,
            },
        )
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let svc = service(repo.clone(), MockDirectoryRepository::new(), mailer, false);

        let before = Utc::now();
        let incident = svc.create_incident(minimal_input(), Some(3)).await.unwrap();

        assert_eq!(incident.status, IncidentStatus::Draft);
        assert!(incident.affected_users.is_empty());
        assert!(incident.affected_data_types.is_empty());
        assert!(incident.detected_at >= before - Duration::seconds(1));
        assert!(incident.detected_at <= Utc::now());
        assert_eq!(incident.reported_by, Some(3));
        assert_eq!(repo.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_required_fields() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let svc = service(repo.clone(), MockDirectoryRepository::new(), mailer, false);

        for input in [
            CreateIncidentInput {
                incident_type: "  ".to_string(),
                ..minimal_input()
            },
            CreateIncidentInput {
                severity: String::new(),
                ..minimal_input()
            },
            CreateIncidentInput {
                description: String::new(),
                ..minimal_input()
            },
        ] {
            let err = svc.create_incident(input, None).await.unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
        assert!(repo.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_preserves_explicit_fields() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let svc = service(repo.clone(), MockDirectoryRepository::new(), mailer, false);

        let detected = Utc::now() - Duration::hours(6);
        let input = CreateIncidentInput {
            affected_users: Some(vec!["p1".to_string()]),
            affected_data_types: Some(vec!["SSN".to_string()]),
            detected_at: Some(detected),
            anomaly_id: Some(12),
            ..minimal_input()
        };

        let incident = svc.create_incident(input, None).await.unwrap();
        assert_eq!(incident.affected_users, vec!["p1"]);
        assert_eq!(incident.detected_at, detected);
        assert_eq!(incident.anomaly_id, Some(12));
    }

    #[tokio::test]
    async fn test_broadcast_disabled_sends_nothing() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let directory = MockDirectoryRepository::new()
            .with_superadmins(vec!["admin@hospital.example".to_string()]);
        let svc = service(repo, directory, mailer.clone(), false);

        svc.create_incident(minimal_input(), None).await.unwrap();
        assert_eq!(mailer.send_count(), 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_each_recipient() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let directory = MockDirectoryRepository::new()
            .with_superadmins(vec!["admin@hospital.example".to_string()])
            .with_security_team(vec!["sec@hospital.example".to_string()]);
        let svc = service(repo, directory, mailer.clone(), true);

        svc.create_incident(minimal_input(), None).await.unwrap();

        let outbox = mailer.outbox();
        assert_eq!(outbox.len(), 2);
        assert!(outbox[0].subject.contains("[HIGH]"));
        assert!(outbox.iter().any(|m| m.to == "admin@hospital.example"));
        assert!(outbox.iter().any(|m| m.to == "sec@hospital.example"));
    }

    #[tokio::test]
    async fn test_broadcast_failure_does_not_fail_create() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        mailer.fail_with("smtp down");
        let directory = MockDirectoryRepository::new()
            .with_superadmins(vec!["admin@hospital.example".to_string()]);
        let svc = service(repo.clone(), directory, mailer, true);

        let incident = svc.create_incident(minimal_input(), None).await.unwrap();
        assert_eq!(incident.status, IncidentStatus::Draft);
        assert_eq!(repo.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_with_unreachable_directory_still_creates() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let directory = MockDirectoryRepository::new();
        directory.set_fail(true);
        let svc = service(repo.clone(), directory, mailer.clone(), true);

        svc.create_incident(minimal_input(), None).await.unwrap();
        assert_eq!(mailer.send_count(), 0);
        assert_eq!(repo.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_reports_pagination_metadata() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let svc = service(repo, MockDirectoryRepository::new(), mailer, false);

        for _ in 0..3 {
            svc.create_incident(minimal_input(), None).await.unwrap();
        }

        let page = svc
            .list_incidents(IncidentFilter::default(), Pagination::new(2, 0))
            .await
            .unwrap();
        assert_eq!(page.incidents.len(), 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.limit, 2);
        assert_eq!(page.offset, 0);
    }

    #[tokio::test]
    async fn test_list_clamps_out_of_range_pagination() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let svc = service(repo, MockDirectoryRepository::new(), mailer, false);

        let page = svc
            .list_incidents(IncidentFilter::default(), Pagination::new(-3, -10))
            .await
            .unwrap();
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 0);
    }

    #[tokio::test]
    async fn test_update_status_accepts_any_known_status() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let svc = service(repo, MockDirectoryRepository::new(), mailer, false);

        let incident = svc.create_incident(minimal_input(), None).await.unwrap();

        let resolved = svc
            .update_incident_status(incident.id, "resolved")
            .await
            .unwrap();
        assert_eq!(resolved.status, IncidentStatus::Resolved);

        // Moving backwards is allowed.
        let draft = svc
            .update_incident_status(incident.id, "draft")
            .await
            .unwrap();
        assert_eq!(draft.status, IncidentStatus::Draft);
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_value() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let svc = service(repo, MockDirectoryRepository::new(), mailer, false);

        let incident = svc.create_incident(minimal_input(), None).await.unwrap();
        let err = svc
            .update_incident_status(incident.id, "archived")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_status_missing_incident() {
        let repo = Arc::new(MockIncidentRepository::new());
        let mailer = Arc::new(MockMailTransport::new());
        let svc = service(repo, MockDirectoryRepository::new(), mailer, false);

        let err = svc.update_incident_status(99, "confirmed").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
