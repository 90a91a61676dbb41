//! Notification repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::error::DbError;
use super::pool::DbPool;
use crate::notification::{
    NewNotification, Notification, NotificationStatus, NotificationWithSender,
};

/// Storage operations for breach notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Inserts a new notification in `pending` state.
    async fn create(&self, notification: &NewNotification) -> Result<Notification, DbError>;

    async fn get(&self, id: i64) -> Result<Option<Notification>, DbError>;

    /// Lists an incident's notifications newest first, joined with the
    /// sending staff user when one is recorded.
    async fn list_for_incident(
        &self,
        incident_id: i64,
    ) -> Result<Vec<NotificationWithSender>, DbError>;

    /// Records a successful send attempt. Clears any previous failure.
    async fn mark_sent(
        &self,
        id: i64,
        sent_by: Option<i64>,
        template_used: &str,
    ) -> Result<Notification, DbError>;

    /// Records a failed send attempt. Clears any previous `sent_at` so the
    /// row reflects the latest attempt only.
    async fn mark_failed(
        &self,
        id: i64,
        sent_by: Option<i64>,
        template_used: &str,
        error_message: &str,
    ) -> Result<Notification, DbError>;
}

#[derive(Debug, FromRow)]
struct PgNotificationRow {
    id: i64,
    incident_id: i64,
    notification_type: String,
    recipient_type: String,
    recipient_email: String,
    recipient_name: Option<String>,
    sent_by: Option<i64>,
    status: String,
    sent_at: Option<DateTime<Utc>>,
    template_used: Option<String>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PgNotificationRow> for Notification {
    type Error = DbError;

    fn try_from(row: PgNotificationRow) -> Result<Self, Self::Error> {
        let status = NotificationStatus::from_db_str(&row.status).ok_or_else(|| {
            DbError::Serialization(format!(
                "notification {} has unknown status: {}",
                row.id, row.status
            ))
        })?;

        Ok(Notification {
            id: row.id,
            incident_id: row.incident_id,
            notification_type: row.notification_type,
            recipient_type: row.recipient_type,
            recipient_email: row.recipient_email,
            recipient_name: row.recipient_name,
            sent_by: row.sent_by,
            status,
            sent_at: row.sent_at,
            template_used: row.template_used,
            error_message: row.error_message,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PgNotificationWithSenderRow {
    #[sqlx(flatten)]
    notification: PgNotificationRow,
    sender_email: Option<String>,
    sender_name: Option<String>,
}

impl TryFrom<PgNotificationWithSenderRow> for NotificationWithSender {
    type Error = DbError;

    fn try_from(row: PgNotificationWithSenderRow) -> Result<Self, Self::Error> {
        Ok(NotificationWithSender {
            notification: row.notification.try_into()?,
            sender_email: row.sender_email,
            sender_name: row.sender_name,
        })
    }
}

/// Postgres-backed notification repository.
pub struct PgNotificationRepository {
    pool: DbPool,
}

impl PgNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, DbError> {
        let row: PgNotificationRow = sqlx::query_as(
            r#"
            INSERT INTO breach_notifications
                (incident_id, notification_type, recipient_type, recipient_email,
                 recipient_name, status, created_at)
            VALUES ($1, $2, $3, $4, $5, 'pending', NOW())
            RETURNING id, incident_id, notification_type, recipient_type, recipient_email,
                      recipient_name, sent_by, status, sent_at, template_used, error_message,
                      created_at
            "#,
        )
        .bind(notification.incident_id)
        .bind(&notification.notification_type)
        .bind(&notification.recipient_type)
        .bind(&notification.recipient_email)
        .bind(&notification.recipient_name)
        .fetch_one(self.pool.pg())
        .await?;

        row.try_into()
    }

    async fn get(&self, id: i64) -> Result<Option<Notification>, DbError> {
        let row: Option<PgNotificationRow> = sqlx::query_as(
            "SELECT id, incident_id, notification_type, recipient_type, recipient_email, recipient_name, sent_by, status, sent_at, template_used, error_message, created_at FROM breach_notifications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.pg())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_for_incident(
        &self,
        incident_id: i64,
    ) -> Result<Vec<NotificationWithSender>, DbError> {
        let rows: Vec<PgNotificationWithSenderRow> = sqlx::query_as(
            r#"
            SELECT n.id, n.incident_id, n.notification_type, n.recipient_type,
                   n.recipient_email, n.recipient_name, n.sent_by, n.status, n.sent_at,
                   n.template_used, n.error_message, n.created_at,
                   u.email AS sender_email, u.name AS sender_name
            FROM breach_notifications n
            LEFT JOIN staff_users u ON u.id = n.sent_by
            WHERE n.incident_id = $1
            ORDER BY n.created_at DESC, n.id DESC
            "#,
        )
        .bind(incident_id)
        .fetch_all(self.pool.pg())
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn mark_sent(
        &self,
        id: i64,
        sent_by: Option<i64>,
        template_used: &str,
    ) -> Result<Notification, DbError> {
        let row: Option<PgNotificationRow> = sqlx::query_as(
            r#"
            UPDATE breach_notifications
            SET status = 'sent', sent_at = NOW(), sent_by = $1, template_used = $2,
                error_message = NULL
            WHERE id = $3
            RETURNING id, incident_id, notification_type, recipient_type, recipient_email,
                      recipient_name, sent_by, status, sent_at, template_used, error_message,
                      created_at
            "#,
        )
        .bind(sent_by)
        .bind(template_used)
        .bind(id)
        .fetch_optional(self.pool.pg())
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(DbError::not_found("Notification", id)),
        }
    }

    async fn mark_failed(
        &self,
        id: i64,
        sent_by: Option<i64>,
        template_used: &str,
        error_message: &str,
    ) -> Result<Notification, DbError> {
        let row: Option<PgNotificationRow> = sqlx::query_as(
            r#"
            UPDATE breach_notifications
            SET status = 'failed', sent_at = NULL, sent_by = $1, template_used = $2,
                error_message = $3
            WHERE id = $4
            RETURNING id, incident_id, notification_type, recipient_type, recipient_email,
                      recipient_name, sent_by, status, sent_at, template_used, error_message,
                      created_at
            "#,
        )
        .bind(sent_by)
        .bind(template_used)
        .bind(error_message)
        .bind(id)
        .fetch_optional(self.pool.pg())
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(DbError::not_found("Notification", id)),
        }
    }
}

/// Creates the Postgres notification repository.
pub fn create_notification_repository(pool: &DbPool) -> Arc<dyn NotificationRepository> {
    Arc::new(PgNotificationRepository::new(pool.clone()))
}
