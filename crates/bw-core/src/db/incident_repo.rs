//! Incident repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::error::DbError;
use super::pool::DbPool;
use crate::incident::{Incident, IncidentStatus, IncidentWithReporter, NewIncident};

/// Optional conditions applied to incident listings. All present conditions
/// are ANDed together.
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    /// Matches the stored status text exactly. Values outside the known
    /// statuses simply match nothing.
    pub status: Option<String>,
    pub severity: Option<String>,
    /// Inclusive lower bound on `detected_at`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `detected_at`.
    pub end_date: Option<DateTime<Utc>>,
}

impl IncidentFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.severity.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Page window for listings.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Bounds the window to something the database should be asked for.
    pub fn clamped(&self) -> Self {
        Self {
            limit: self.limit.clamp(1, 500),
            offset: self.offset.max(0),
        }
    }
}

/// Storage operations for breach incidents.
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    async fn create(&self, incident: &NewIncident) -> Result<Incident, DbError>;

    async fn get(&self, id: i64) -> Result<Option<Incident>, DbError>;

    /// Lists incidents newest-detected first, joined with the reporting
    /// staff user when one exists.
    async fn list(
        &self,
        filter: &IncidentFilter,
        page: &Pagination,
    ) -> Result<Vec<IncidentWithReporter>, DbError>;

    /// Total row count under the same filter, for pagination metadata.
    async fn count(&self, filter: &IncidentFilter) -> Result<u64, DbError>;

    async fn update_status(&self, id: i64, status: IncidentStatus) -> Result<Incident, DbError>;
}

#[derive(Debug, FromRow)]
struct PgIncidentRow {
    id: i64,
    incident_type: String,
    severity: String,
    description: String,
    affected_users: Vec<String>,
    affected_data_types: Vec<String>,
    detected_at: DateTime<Utc>,
    reported_by: Option<i64>,
    status: String,
    anomaly_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PgIncidentRow> for Incident {
    type Error = DbError;

    fn try_from(row: PgIncidentRow) -> Result<Self, Self::Error> {
        let status = IncidentStatus::from_db_str(&row.status).ok_or_else(|| {
            DbError::Serialization(format!(
                "incident {} has unknown status: {}",
                row.id, row.status
            ))
        })?;

        Ok(Incident {
            id: row.id,
            incident_type: row.incident_type,
            severity: row.severity,
            description: row.description,
            affected_users: row.affected_users,
            affected_data_types: row.affected_data_types,
            detected_at: row.detected_at,
            reported_by: row.reported_by,
            status,
            anomaly_id: row.anomaly_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PgIncidentWithReporterRow {
    #[sqlx(flatten)]
    incident: PgIncidentRow,
    reporter_email: Option<String>,
    reporter_name: Option<String>,
}

impl TryFrom<PgIncidentWithReporterRow> for IncidentWithReporter {
    type Error = DbError;

    fn try_from(row: PgIncidentWithReporterRow) -> Result<Self, Self::Error> {
        Ok(IncidentWithReporter {
            incident: row.incident.try_into()?,
            reporter_email: row.reporter_email,
            reporter_name: row.reporter_name,
        })
    }
}

/// Builds numbered SQL conditions for a filter, starting at `$start`.
/// Returns the conditions and the next free parameter index.
fn filter_conditions(filter: &IncidentFilter, start: usize) -> (Vec<String>, usize) {
    let mut conditions = Vec::new();
    let mut param_idx = start;

    if filter.status.is_some() {
        conditions.push(format!("i.status = ${}", param_idx));
        param_idx += 1;
    }
    if filter.severity.is_some() {
        conditions.push(format!("i.severity = ${}", param_idx));
        param_idx += 1;
    }
    if filter.start_date.is_some() {
        conditions.push(format!("i.detected_at >= ${}", param_idx));
        param_idx += 1;
    }
    if filter.end_date.is_some() {
        conditions.push(format!("i.detected_at <= ${}", param_idx));
        param_idx += 1;
    }

    (conditions, param_idx)
}

/// Postgres-backed incident repository.
pub struct PgIncidentRepository {
    pool: DbPool,
}

impl PgIncidentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncidentRepository for PgIncidentRepository {
    async fn create(&self, incident: &NewIncident) -> Result<Incident, DbError> {
        let now = Utc::now();
        let row: PgIncidentRow = sqlx::query_as(
            r#"
            INSERT INTO breach_incidents
                (incident_type, severity, description, affected_users, affected_data_types,
                 detected_at, reported_by, status, anomaly_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING id, incident_type, severity, description, affected_users,
                      affected_data_types, detected_at, reported_by, status, anomaly_id,
                      created_at, updated_at
            "#,
        )
        .bind(&incident.incident_type)
        .bind(&incident.severity)
        .bind(&incident.description)
        .bind(&incident.affected_users)
        .bind(&incident.affected_data_types)
        .bind(incident.detected_at)
        .bind(incident.reported_by)
        .bind(incident.status.as_db_str())
        .bind(incident.anomaly_id)
        .bind(now)
        .fetch_one(self.pool.pg())
        .await?;

        row.try_into()
    }

    async fn get(&self, id: i64) -> Result<Option<Incident>, DbError> {
        let row: Option<PgIncidentRow> = sqlx::query_as(
            "SELECT id, incident_type, severity, description, affected_users, affected_data_types, detected_at, reported_by, status, anomaly_id, created_at, updated_at FROM breach_incidents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.pg())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(
        &self,
        filter: &IncidentFilter,
        page: &Pagination,
    ) -> Result<Vec<IncidentWithReporter>, DbError> {
        let (conditions, param_idx) = filter_conditions(filter, 1);

        let mut query = String::from(
            "SELECT i.id, i.incident_type, i.severity, i.description, i.affected_users, i.affected_data_types, i.detected_at, i.reported_by, i.status, i.anomaly_id, i.created_at, i.updated_at, u.email AS reporter_email, u.name AS reporter_name FROM breach_incidents i LEFT JOIN staff_users u ON u.id = i.reported_by",
        );
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(&format!(
            " ORDER BY i.detected_at DESC, i.id DESC LIMIT ${} OFFSET ${}",
            param_idx,
            param_idx + 1
        ));

        let mut sqlx_query = sqlx::query_as::<_, PgIncidentWithReporterRow>(&query);

        if let Some(status) = &filter.status {
            sqlx_query = sqlx_query.bind(status);
        }
        if let Some(severity) = &filter.severity {
            sqlx_query = sqlx_query.bind(severity);
        }
        if let Some(start) = filter.start_date {
            sqlx_query = sqlx_query.bind(start);
        }
        if let Some(end) = filter.end_date {
            sqlx_query = sqlx_query.bind(end);
        }
        sqlx_query = sqlx_query.bind(page.limit).bind(page.offset);

        let rows = sqlx_query.fetch_all(self.pool.pg()).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self, filter: &IncidentFilter) -> Result<u64, DbError> {
        let (conditions, _) = filter_conditions(filter, 1);

        let mut query = String::from("SELECT COUNT(*) FROM breach_incidents i");
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        let mut sqlx_query = sqlx::query_scalar::<_, i64>(&query);

        if let Some(status) = &filter.status {
            sqlx_query = sqlx_query.bind(status);
        }
        if let Some(severity) = &filter.severity {
            sqlx_query = sqlx_query.bind(severity);
        }
        if let Some(start) = filter.start_date {
            sqlx_query = sqlx_query.bind(start);
        }
        if let Some(end) = filter.end_date {
            sqlx_query = sqlx_query.bind(end);
        }

        let count = sqlx_query.fetch_one(self.pool.pg()).await?;
        Ok(count as u64)
    }

    async fn update_status(&self, id: i64, status: IncidentStatus) -> Result<Incident, DbError> {
        let row: Option<PgIncidentRow> = sqlx::query_as(
            r#"
            UPDATE breach_incidents SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, incident_type, severity, description, affected_users,
                      affected_data_types, detected_at, reported_by, status, anomaly_id,
                      created_at, updated_at
            "#,
        )
        .bind(status.as_db_str())
        .bind(id)
        .fetch_optional(self.pool.pg())
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(DbError::not_found("Incident", id)),
        }
    }
}

/// Creates the Postgres incident repository.
pub fn create_incident_repository(pool: &DbPool) -> Arc<dyn IncidentRepository> {
    Arc::new(PgIncidentRepository::new(pool.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let page = Pagination::default();
        assert_eq!(page.limit, 50);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn test_pagination_clamps_extremes() {
        let page = Pagination::new(0, -5).clamped();
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 0);

        let page = Pagination::new(10_000, 30).clamped();
        assert_eq!(page.limit, 500);
        assert_eq!(page.offset, 30);
    }

    #[test]
    fn test_filter_conditions_numbering() {
        let filter = IncidentFilter {
            status: Some("draft".to_string()),
            severity: None,
            start_date: Some(Utc::now()),
            end_date: None,
        };
        let (conditions, next) = filter_conditions(&filter, 1);
        assert_eq!(conditions, vec!["i.status = $1", "i.detected_at >= $2"]);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_empty_filter_has_no_conditions() {
        let filter = IncidentFilter::default();
        assert!(filter.is_empty());
        let (conditions, next) = filter_conditions(&filter, 1);
        assert!(conditions.is_empty());
        assert_eq!(next, 1);
    }
}
