//! Staff directory repository.
//!
//! Backs recipient resolution for internal alert broadcasts and supplies the
//! DPO contact for GDPR notifications.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::error::DbError;
use super::pool::DbPool;
use crate::directory::{DpoContact, StaffRole};

/// Read operations over the staff directory tables.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Emails of enabled superadmin staff users. Rows without an email are
    /// skipped.
    async fn superadmin_emails(&self) -> Result<Vec<String>, DbError>;

    /// Emails of enabled security team members.
    async fn security_team_emails(&self) -> Result<Vec<String>, DbError>;

    /// The most recently updated DPO contact, if any exists.
    async fn latest_dpo_contact(&self) -> Result<Option<DpoContact>, DbError>;
}

#[derive(Debug, FromRow)]
struct PgDpoContactRow {
    id: i64,
    name: Option<String>,
    email: String,
    phone: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<PgDpoContactRow> for DpoContact {
    fn from(row: PgDpoContactRow) -> Self {
        DpoContact {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed directory repository.
pub struct PgDirectoryRepository {
    pool: DbPool,
}

impl PgDirectoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryRepository for PgDirectoryRepository {
    async fn superadmin_emails(&self) -> Result<Vec<String>, DbError> {
        let emails = sqlx::query_scalar::<_, String>(
            "SELECT email FROM staff_users WHERE role = $1 AND enabled AND email IS NOT NULL",
        )
        .bind(StaffRole::Superadmin.as_str())
        .fetch_all(self.pool.pg())
        .await?;

        Ok(emails)
    }

    async fn security_team_emails(&self) -> Result<Vec<String>, DbError> {
        let emails = sqlx::query_scalar::<_, String>(
            "SELECT email FROM security_team_members WHERE enabled",
        )
        .fetch_all(self.pool.pg())
        .await?;

        Ok(emails)
    }

    async fn latest_dpo_contact(&self) -> Result<Option<DpoContact>, DbError> {
        let row: Option<PgDpoContactRow> = sqlx::query_as(
            "SELECT id, name, email, phone, updated_at FROM dpo_contacts ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(self.pool.pg())
        .await?;

        Ok(row.map(Into::into))
    }
}

/// Creates the Postgres directory repository.
pub fn create_directory_repository(pool: &DbPool) -> Arc<dyn DirectoryRepository> {
    Arc::new(PgDirectoryRepository::new(pool.clone()))
}
