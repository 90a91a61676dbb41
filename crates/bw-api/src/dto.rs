//! Request and response shapes for the HTTP API.
//!
//! Responses serialize the core read models directly; this module carries
//! the request bodies, query parameters, and the health payload.
//!
//! Required string fields default to empty rather than failing
//! deserialization, so a missing field surfaces as the service's own
//! validation message instead of a generic body-parse error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bw_core::db::{IncidentFilter, Pagination};
use bw_core::{CreateIncidentInput, CreateNotificationInput, RemediationInput};

/// Body of `POST /api/incidents`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIncidentRequest {
    #[serde(default)]
    pub incident_type: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub description: String,
    pub affected_users: Option<Vec<String>>,
    pub affected_data_types: Option<Vec<String>>,
    pub detected_at: Option<DateTime<Utc>>,
    pub anomaly_id: Option<i64>,
}

impl From<CreateIncidentRequest> for CreateIncidentInput {
    fn from(req: CreateIncidentRequest) -> Self {
        CreateIncidentInput {
            incident_type: req.incident_type,
            severity: req.severity,
            description: req.description,
            affected_users: req.affected_users,
            affected_data_types: req.affected_data_types,
            detected_at: req.detected_at,
            anomaly_id: req.anomaly_id,
        }
    }
}

/// Query parameters of `GET /api/incidents`.
///
/// Date bounds accept both snake_case and camelCase names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListIncidentsQuery {
    pub status: Option<String>,
    pub severity: Option<String>,
    #[serde(alias = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(alias = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListIncidentsQuery {
    pub fn filter(&self) -> IncidentFilter {
        IncidentFilter {
            status: self.status.clone(),
            severity: self.severity.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    pub fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination::new(
            self.limit.unwrap_or(defaults.limit),
            self.offset.unwrap_or(defaults.offset),
        )
    }
}

/// Body of `PATCH /api/incidents/:id/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Body of `POST /api/incidents/:id/notifications`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationRequest {
    #[serde(default)]
    pub notification_type: String,
    pub recipient_type: Option<String>,
    #[serde(default)]
    pub recipient_email: String,
    pub recipient_name: Option<String>,
}

impl From<CreateNotificationRequest> for CreateNotificationInput {
    fn from(req: CreateNotificationRequest) -> Self {
        CreateNotificationInput {
            notification_type: req.notification_type,
            recipient_type: req.recipient_type,
            recipient_email: req.recipient_email,
            recipient_name: req.recipient_name,
        }
    }
}

/// Body of `POST /api/incidents/:id/remediations` and
/// `PATCH /api/remediations/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemediationRequest {
    #[serde(default)]
    pub action_taken: String,
    pub effectiveness: Option<String>,
    pub notes: Option<String>,
}

impl From<RemediationRequest> for RemediationInput {
    fn from(req: RemediationRequest) -> Self {
        RemediationInput {
            action_taken: req.action_taken,
            effectiveness: req.effectiveness,
            notes: req.notes,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_incident_request_minimal_body() {
        let req: CreateIncidentRequest =
            serde_json::from_str(r#"{"incident_type":"phishing","severity":"low","description":"d"}"#)
                .unwrap();
        assert!(req.affected_users.is_none());
        assert!(req.detected_at.is_none());

        let input = CreateIncidentInput::from(req);
        assert_eq!(input.incident_type, "phishing");
    }

    #[test]
    fn test_create_incident_request_tolerates_missing_strings() {
        let req: CreateIncidentRequest = serde_json::from_str("{}").unwrap();
        assert!(req.incident_type.is_empty());
        assert!(req.severity.is_empty());
    }

    #[test]
    fn test_list_query_accepts_camel_case_dates() {
        let query: ListIncidentsQuery = serde_json::from_str(
            r#"{"startDate":"2025-03-01T00:00:00Z","endDate":"2025-03-31T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(query.start_date.is_some());
        assert!(query.end_date.is_some());
    }

    #[test]
    fn test_list_query_defaults_pagination() {
        let query = ListIncidentsQuery::default();
        let page = query.pagination();
        assert_eq!(page.limit, 50);
        assert_eq!(page.offset, 0);

        let filter = query.filter();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_remediation_request_converts() {
        let req: RemediationRequest = serde_json::from_str(
            r#"{"action_taken":"patched","effectiveness":"effective"}"#,
        )
        .unwrap();
        let input = RemediationInput::from(req);
        assert_eq!(input.action_taken, "patched");
        assert_eq!(input.effectiveness.as_deref(), Some("effective"));
        assert!(input.notes.is_none());
    }
}
