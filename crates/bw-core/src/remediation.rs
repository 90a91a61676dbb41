//! Remediation data models.
//!
//! Remediations are an audit trail of corrective actions taken against an
//! incident. Rows are mutable; an update overwrites the row and stamps a
//! fresh `taken_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A corrective action recorded against an incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remediation {
    /// Store-assigned identifier.
    pub id: i64,
    /// Incident this action applies to.
    pub incident_id: i64,
    /// What was done.
    pub action_taken: String,
    /// Staff user who took the action, when known.
    pub taken_by: Option<i64>,
    /// When the action was recorded or last revised.
    pub taken_at: DateTime<Utc>,
    /// Assessment of how well the action worked, e.g. "effective".
    pub effectiveness: Option<String>,
    /// Additional context.
    pub notes: Option<String>,
}

/// Insert payload for a new remediation row.
#[derive(Debug, Clone)]
pub struct NewRemediation {
    pub incident_id: i64,
    pub action_taken: String,
    pub taken_by: Option<i64>,
    pub effectiveness: Option<String>,
    pub notes: Option<String>,
}

/// Replacement content for an existing remediation row.
///
/// All three fields overwrite what is stored; `None` clears the optional
/// columns rather than leaving them untouched.
#[derive(Debug, Clone)]
pub struct RemediationUpdate {
    pub action_taken: String,
    pub effectiveness: Option<String>,
    pub notes: Option<String>,
}

/// Remediation enriched with the acting user's directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationWithActor {
    #[serde(flatten)]
    pub remediation: Remediation,
    pub actor_email: Option<String>,
    pub actor_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remediation_serializes_flat_with_actor() {
        let row = RemediationWithActor {
            remediation: Remediation {
                id: 4,
                incident_id: 9,
                action_taken: "rotated credentials".to_string(),
                taken_by: Some(2),
                taken_at: Utc::now(),
                effectiveness: Some("effective".to_string()),
                notes: None,
            },
            actor_email: Some("ops@hospital.example".to_string()),
            actor_name: Some("On-call".to_string()),
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["incident_id"], 9);
        assert_eq!(value["action_taken"], "rotated credentials");
        assert_eq!(value["actor_email"], "ops@hospital.example");
        assert!(value["notes"].is_null());
    }
}
