//! Mock implementation of RemediationRepository for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::{DbError, RemediationRepository};
use crate::remediation::{NewRemediation, Remediation, RemediationUpdate, RemediationWithActor};

/// Mock implementation of RemediationRepository using in-memory storage.
pub struct MockRemediationRepository {
    remediations: Arc<RwLock<HashMap<i64, Remediation>>>,
    staff: Arc<RwLock<HashMap<i64, (String, Option<String>)>>>,
    next_id: AtomicI64,
}

impl Default for MockRemediationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemediationRepository {
    /// Creates a new mock repository.
    pub fn new() -> Self {
        Self {
            remediations: Arc::new(RwLock::new(HashMap::new())),
            staff: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    /// Creates a mock repository pre-populated with remediations.
    pub fn with_remediations(remediations: Vec<Remediation>) -> Self {
        let next = remediations.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let map: HashMap<i64, Remediation> =
            remediations.into_iter().map(|r| (r.id, r)).collect();
        Self {
            remediations: Arc::new(RwLock::new(map)),
            staff: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(next),
        }
    }

    /// Seeds staff users as `(id, email, name)` for actor enrichment.
    pub fn with_staff(self, entries: Vec<(i64, String, Option<String>)>) -> Self {
        let map: HashMap<i64, (String, Option<String>)> = entries
            .into_iter()
            .map(|(id, email, name)| (id, (email, name)))
            .collect();
        Self {
            staff: Arc::new(RwLock::new(map)),
            ..self
        }
    }

    /// Gets a snapshot of all remediations in the mock.
    pub async fn snapshot(&self) -> Vec<Remediation> {
        self.remediations.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl RemediationRepository for MockRemediationRepository {
    async fn create(&self, remediation: &NewRemediation) -> Result<Remediation, DbError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Remediation {
            id,
            incident_id: remediation.incident_id,
            action_taken: remediation.action_taken.clone(),
            taken_by: remediation.taken_by,
            taken_at: Utc::now(),
            effectiveness: remediation.effectiveness.clone(),
            notes: remediation.notes.clone(),
        };

        self.remediations.write().await.insert(id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Remediation>, DbError> {
        let remediations = self.remediations.read().await;
        Ok(remediations.get(&id).cloned())
    }

    async fn list_for_incident(
        &self,
        incident_id: i64,
    ) -> Result<Vec<RemediationWithActor>, DbError> {
        let remediations = self.remediations.read().await;
        let staff = self.staff.read().await;

        let mut result: Vec<Remediation> = remediations
            .values()
            .filter(|r| r.incident_id == incident_id)
            .cloned()
            .collect();

        result.sort_by(|a, b| b.taken_at.cmp(&a.taken_at).then_with(|| b.id.cmp(&a.id)));

        Ok(result
            .into_iter()
            .map(|remediation| {
                let actor = remediation.taken_by.and_then(|id| staff.get(&id).cloned());
                let (actor_email, actor_name) = match actor {
                    Some((email, name)) => (Some(email), name),
                    None => (None, None),
                };
                RemediationWithActor {
                    remediation,
                    actor_email,
                    actor_name,
                }
            })
            .collect())
    }

    async fn update(&self, id: i64, update: &RemediationUpdate) -> Result<Remediation, DbError> {
        let mut remediations = self.remediations.write().await;

        let remediation = remediations
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("Remediation", id))?;

        remediation.action_taken = update.action_taken.clone();
        remediation.effectiveness = update.effectiveness.clone();
        remediation.notes = update.notes.clone();
        remediation.taken_at = Utc::now();
        Ok(remediation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_remediation(incident_id: i64) -> NewRemediation {
        NewRemediation {
            incident_id,
            action_taken: "revoked credentials".to_string(),
            taken_by: Some(2),
            effectiveness: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_update_overwrites_and_restamps() {
        let repo = MockRemediationRepository::new();
        let created = repo.create(&new_remediation(1)).await.unwrap();
        let original_taken_at = created.taken_at;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let update = RemediationUpdate {
            action_taken: "revoked credentials and reset MFA".to_string(),
            effectiveness: Some("effective".to_string()),
            notes: None,
        };
        let updated = repo.update(created.id, &update).await.unwrap();

        assert_eq!(updated.action_taken, "revoked credentials and reset MFA");
        assert_eq!(updated.effectiveness.as_deref(), Some("effective"));
        assert!(updated.taken_at > original_taken_at);
        assert_eq!(updated.taken_by, Some(2));
    }

    #[tokio::test]
    async fn test_update_clears_omitted_fields() {
        let repo = MockRemediationRepository::new();
        let created = repo
            .create(&NewRemediation {
                notes: Some("initial notes".to_string()),
                effectiveness: Some("partial".to_string()),
                ..new_remediation(1)
            })
            .await
            .unwrap();

        let update = RemediationUpdate {
            action_taken: "patched the server".to_string(),
            effectiveness: None,
            notes: None,
        };
        let updated = repo.update(created.id, &update).await.unwrap();

        assert!(updated.effectiveness.is_none());
        assert!(updated.notes.is_none());
    }

    #[tokio::test]
    async fn test_list_scopes_to_incident() {
        let repo = MockRemediationRepository::new();
        repo.create(&new_remediation(1)).await.unwrap();
        repo.create(&new_remediation(2)).await.unwrap();

        let listed = repo.list_for_incident(1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].remediation.incident_id, 1);
    }

    #[tokio::test]
    async fn test_update_missing_remediation() {
        let repo = MockRemediationRepository::new();
        let update = RemediationUpdate {
            action_taken: "anything".to_string(),
            effectiveness: None,
            notes: None,
        };
        let err = repo.update(9, &update).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
