//! Mock implementation of IncidentRepository for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::{DbError, IncidentFilter, IncidentRepository, Pagination};
use crate::incident::{Incident, IncidentStatus, IncidentWithReporter, NewIncident};

/// Mock implementation of IncidentRepository using in-memory storage.
///
/// Reporter enrichment is served from a small staff map seeded through
/// `with_staff`; ids missing from it enrich as `None`.
pub struct MockIncidentRepository {
    incidents: Arc<RwLock<HashMap<i64, Incident>>>,
    staff: Arc<RwLock<HashMap<i64, (String, Option<String>)>>>,
    next_id: AtomicI64,
}

impl Default for MockIncidentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIncidentRepository {
    /// Creates a new mock repository.
    pub fn new() -> Self {
        Self {
            incidents: Arc::new(RwLock::new(HashMap::new())),
            staff: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    /// Creates a mock repository pre-populated with incidents.
    pub fn with_incidents(incidents: Vec<Incident>) -> Self {
        let next = incidents.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        let map: HashMap<i64, Incident> = incidents.into_iter().map(|i| (i.id, i)).collect();
        Self {
            incidents: Arc::new(RwLock::new(map)),
            staff: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(next),
        }
    }

    /// Seeds staff users as `(id, email, name)` for reporter enrichment.
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

    /// Gets a snapshot of all incidents in the mock.
    pub async fn snapshot(&self) -> Vec<Incident> {
        self.incidents.read().await.values().cloned().collect()
    }

    /// Clears all incidents from the mock.
    pub async fn clear(&self) {
        self.incidents.write().await.clear();
    }

    fn matches(incident: &Incident, filter: &IncidentFilter) -> bool {
        if let Some(status) = &filter.status {
            if incident.status.as_db_str() != status {
                return false;
            }
        }
        if let Some(severity) = &filter.severity {
            if &incident.severity != severity {
                return false;
            }
        }
        if let Some(start) = &filter.start_date {
            if incident.detected_at < *start {
                return false;
            }
        }
        if let Some(end) = &filter.end_date {
            if incident.detected_at > *end {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl IncidentRepository for MockIncidentRepository {
    async fn create(&self, incident: &NewIncident) -> Result<Incident, DbError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let created = Incident {
            id,
            incident_type: incident.incident_type.clone(),
            severity: incident.severity.clone(),
            description: incident.description.clone(),
            affected_users: incident.affected_users.clone(),
            affected_data_types: incident.affected_data_types.clone(),
            detected_at: incident.detected_at,
            reported_by: incident.reported_by,
            status: incident.status,
            anomaly_id: incident.anomaly_id,
            created_at: now,
            updated_at: now,
        };

        self.incidents.write().await.insert(id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Incident>, DbError> {
        let incidents = self.incidents.read().await;
        Ok(incidents.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &IncidentFilter,
        page: &Pagination,
    ) -> Result<Vec<IncidentWithReporter>, DbError> {
        let incidents = self.incidents.read().await;
        let staff = self.staff.read().await;

        let mut result: Vec<Incident> = incidents
            .values()
            .filter(|i| Self::matches(i, filter))
            .cloned()
            .collect();

        // Sort by detected_at descending, id descending as tie-break
        result.sort_by(|a, b| {
            b.detected_at
                .cmp(&a.detected_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let offset = page.offset.max(0) as usize;
        let limit = page.limit.max(0) as usize;

        Ok(result
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|incident| {
                let reporter = incident.reported_by.and_then(|id| staff.get(&id).cloned());
                let (reporter_email, reporter_name) = match reporter {
                    Some((email, name)) => (Some(email), name),
                    None => (None, None),
                };
                IncidentWithReporter {
                    incident,
                    reporter_email,
                    reporter_name,
                }
            })
            .collect())
    }

    async fn count(&self, filter: &IncidentFilter) -> Result<u64, DbError> {
        let incidents = self.incidents.read().await;
        let count = incidents.values().filter(|i| Self::matches(i, filter)).count();
        Ok(count as u64)
    }

    async fn update_status(&self, id: i64, status: IncidentStatus) -> Result<Incident, DbError> {
        let mut incidents = self.incidents.write().await;

        let incident = incidents
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("Incident", id))?;

        incident.status = status;
        incident.updated_at = Utc::now();
        Ok(incident.clone())
    }
}
