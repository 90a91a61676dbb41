//! Remediation repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::error::DbError;
use super::pool::DbPool;
use crate::remediation::{NewRemediation, Remediation, RemediationUpdate, RemediationWithActor};

/// Storage operations for remediation actions.
#[async_trait]
pub trait RemediationRepository: Send + Sync {
    async fn create(&self, remediation: &NewRemediation) -> Result<Remediation, DbError>;

    async fn get(&self, id: i64) -> Result<Option<Remediation>, DbError>;

    /// Lists an incident's remediations newest first, joined with the acting
    /// staff user when one is recorded.
    async fn list_for_incident(
        &self,
        incident_id: i64,
    ) -> Result<Vec<RemediationWithActor>, DbError>;

    /// Overwrites a remediation's content and stamps a fresh `taken_at`.
    async fn update(&self, id: i64, update: &RemediationUpdate) -> Result<Remediation, DbError>;
}

#[derive(Debug, FromRow)]
struct PgRemediationRow {
    id: i64,
    incident_id: i64,
    action_taken: String,
    taken_by: Option<i64>,
    taken_at: DateTime<Utc>,
    effectiveness: Option<String>,
    notes: Option<String>,
}

impl From<PgRemediationRow> for Remediation {
    fn from(row: PgRemediationRow) -> Self {
        Remediation {
            id: row.id,
            incident_id: row.incident_id,
            action_taken: row.action_taken,
            taken_by: row.taken_by,
            taken_at: row.taken_at,
            effectiveness: row.effectiveness,
            notes: row.notes,
        }
    }
}

#[derive(Debug, FromRow)]
struct PgRemediationWithActorRow {
    #[sqlx(flatten)]
    remediation: PgRemediationRow,
    actor_email: Option<String>,
    actor_name: Option<String>,
}

impl From<PgRemediationWithActorRow> for RemediationWithActor {
    fn from(row: PgRemediationWithActorRow) -> Self {
        RemediationWithActor {
            remediation: row.remediation.into(),
            actor_email: row.actor_email,
            actor_name: row.actor_name,
        }
    }
}

/// Postgres-backed remediation repository.
pub struct PgRemediationRepository {
    pool: DbPool,
}

impl PgRemediationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RemediationRepository for PgRemediationRepository {
    async fn create(&self, remediation: &NewRemediation) -> Result<Remediation, DbError> {
        let row: PgRemediationRow = sqlx::query_as(
            r#"
            INSERT INTO breach_remediations
                (incident_id, action_taken, taken_by, taken_at, effectiveness, notes)
            VALUES ($1, $2, $3, NOW(), $4, $5)
            RETURNING id, incident_id, action_taken, taken_by, taken_at, effectiveness, notes
            "#,
        )
        .bind(remediation.incident_id)
        .bind(&remediation.action_taken)
        .bind(remediation.taken_by)
        .bind(&remediation.effectiveness)
        .bind(&remediation.notes)
        .fetch_one(self.pool.pg())
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: i64) -> Result<Option<Remediation>, DbError> {
        let row: Option<PgRemediationRow> = sqlx::query_as(
            "SELECT id, incident_id, action_taken, taken_by, taken_at, effectiveness, notes FROM breach_remediations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.pg())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_for_incident(
        &self,
        incident_id: i64,
    ) -> Result<Vec<RemediationWithActor>, DbError> {
        let rows: Vec<PgRemediationWithActorRow> = sqlx::query_as(
            r#"
            SELECT r.id, r.incident_id, r.action_taken, r.taken_by, r.taken_at,
                   r.effectiveness, r.notes,
                   u.email AS actor_email, u.name AS actor_name
            FROM breach_remediations r
            LEFT JOIN staff_users u ON u.id = r.taken_by
            WHERE r.incident_id = $1
            ORDER BY r.taken_at DESC, r.id DESC
            "#,
        )
        .bind(incident_id)
        .fetch_all(self.pool.pg())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, update: &RemediationUpdate) -> Result<Remediation, DbError> {
        let row: Option<PgRemediationRow> = sqlx::query_as(
            r#"
            UPDATE breach_remediations
            SET action_taken = $1, effectiveness = $2, notes = $3, taken_at = NOW()
            WHERE id = $4
            RETURNING id, incident_id, action_taken, taken_by, taken_at, effectiveness, notes
            "#,
        )
        .bind(&update.action_taken)
        .bind(&update.effectiveness)
        .bind(&update.notes)
        .bind(id)
        .fetch_optional(self.pool.pg())
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(DbError::not_found("Remediation", id)),
        }
    }
}

/// Creates the Postgres remediation repository.
pub fn create_remediation_repository(pool: &DbPool) -> Arc<dyn RemediationRepository> {
    Arc::new(PgRemediationRepository::new(pool.clone()))
}
