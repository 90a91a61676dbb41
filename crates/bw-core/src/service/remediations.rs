//! Remediation tracking service.

use std::sync::Arc;

use tracing::info;

use crate::db::{IncidentRepository, RemediationRepository};
use crate::error::CoreError;
use crate::remediation::{
    NewRemediation, Remediation, RemediationUpdate, RemediationWithActor,
};

/// Caller-supplied fields for recording or revising a remediation.
#[derive(Debug, Clone, Default)]
pub struct RemediationInput {
    pub action_taken: String,
    pub effectiveness: Option<String>,
    pub notes: Option<String>,
}

/// Records and revises corrective actions against incidents.
pub struct RemediationService {
    remediations: Arc<dyn RemediationRepository>,
    incidents: Arc<dyn IncidentRepository>,
}

impl RemediationService {
    pub fn new(
        remediations: Arc<dyn RemediationRepository>,
        incidents: Arc<dyn IncidentRepository>,
    ) -> Self {
        Self {
            remediations,
            incidents,
        }
    }

    /// Records a corrective action against an existing incident.
    pub async fn add_remediation(
        &self,
        incident_id: i64,
        input: RemediationInput,
        taken_by: Option<i64>,
    ) -> Result<Remediation, CoreError> {
        if input.action_taken.trim().is_empty() {
            return Err(CoreError::Validation(
                "action_taken is required".to_string(),
            ));
        }

        self.incidents
            .get(incident_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Incident", incident_id))?;

        let remediation = self
            .remediations
            .create(&NewRemediation {
                incident_id,
                action_taken: input.action_taken,
                taken_by,
                effectiveness: input.effectiveness,
                notes: input.notes,
            })
            .await?;

        info!(
            remediation_id = remediation.id,
            incident_id, "remediation recorded"
        );
        Ok(remediation)
    }

    /// All remediation actions recorded against an incident, newest first.
    pub async fn get_remediations(
        &self,
        incident_id: i64,
    ) -> Result<Vec<RemediationWithActor>, CoreError> {
        Ok(self.remediations.list_for_incident(incident_id).await?)
    }

    /// Replaces a remediation's content. The row keeps its original actor
    /// but gets a fresh `taken_at`.
    pub async fn update_remediation(
        &self,
        id: i64,
        input: RemediationInput,
    ) -> Result<Remediation, CoreError> {
        if input.action_taken.trim().is_empty() {
            return Err(CoreError::Validation(
                "action_taken is required".to_string(),
            ));
        }

        let remediation = self
            .remediations
            .update(
                id,
                &RemediationUpdate {
                    action_taken: input.action_taken,
                    effectiveness: input.effectiveness,
                    notes: input.notes,
                },
            )
            .await?;

        info!(remediation_id = id, "remediation revised");
        Ok(remediation)
    }
}
