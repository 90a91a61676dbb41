//! Incident data models for Breachward.
//!
//! This module defines the structures used to represent a security/privacy
//! breach incident as it moves through the notification workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded breach or security event subject to investigation and
/// notification obligations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Store-assigned identifier.
    pub id: i64,
    /// Free-form classification, e.g. "unauthorized_access".
    pub incident_type: String,
    /// Severity label. By convention one of low/medium/high/critical, but
    /// consumers interpret it; the service boundary does not validate it.
    pub severity: String,
    /// Narrative description of what happened.
    pub description: String,
    /// Identifiers of affected users. Empty when unknown, never null.
    pub affected_users: Vec<String>,
    /// Categories of exposed data, e.g. "SSN". Empty when unknown.
    pub affected_data_types: Vec<String>,
    /// When the breach was detected.
    pub detected_at: DateTime<Utc>,
    /// Staff user who reported the incident, when known.
    pub reported_by: Option<i64>,
    /// Current lifecycle status.
    pub status: IncidentStatus,
    /// Automated-detection source that raised this incident, if any.
    pub anomaly_id: Option<i64>,
    /// Timestamp when the incident was recorded.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status change.
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new incident, with creation defaults already
/// resolved by the service layer.
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub incident_type: String,
    pub severity: String,
    pub description: String,
    pub affected_users: Vec<String>,
    pub affected_data_types: Vec<String>,
    pub detected_at: DateTime<Utc>,
    pub reported_by: Option<i64>,
    pub status: IncidentStatus,
    pub anomaly_id: Option<i64>,
}

/// Incident enriched with the reporting user's directory entry.
///
/// The reporter fields are absent when `reported_by` is null or does not
/// resolve to a staff user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentWithReporter {
    #[serde(flatten)]
    pub incident: Incident,
    pub reporter_email: Option<String>,
    pub reporter_name: Option<String>,
}

/// Lifecycle states for a breach incident.
///
/// Transitions are deliberately permissive: any status may follow any other,
/// including moves back to `Draft`. Stricter lifecycle rules belong to the
/// callers that need them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// Recorded but not yet confirmed as an actual breach.
    Draft,
    /// Confirmed as a real incident.
    Confirmed,
    /// Actively being investigated.
    UnderInvestigation,
    /// Spread has been stopped; cleanup ongoing.
    Contained,
    /// Closed out.
    Resolved,
}

impl IncidentStatus {
    /// Database string for this status.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            IncidentStatus::Draft => "draft",
            IncidentStatus::Confirmed => "confirmed",
            IncidentStatus::UnderInvestigation => "under_investigation",
            IncidentStatus::Contained => "contained",
            IncidentStatus::Resolved => "resolved",
        }
    }

    /// Parses a database string, returning `None` for anything outside the
    /// five known statuses.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(IncidentStatus::Draft),
            "confirmed" => Some(IncidentStatus::Confirmed),
            "under_investigation" => Some(IncidentStatus::UnderInvestigation),
            "contained" => Some(IncidentStatus::Contained),
            "resolved" => Some(IncidentStatus::Resolved),
            _ => None,
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}
