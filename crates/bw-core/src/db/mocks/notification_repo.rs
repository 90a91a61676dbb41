//! Mock implementation of NotificationRepository for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::{DbError, NotificationRepository};
use crate::notification::{
    NewNotification, Notification, NotificationStatus, NotificationWithSender,
};

/// Mock implementation of NotificationRepository using in-memory storage.
pub struct MockNotificationRepository {
    notifications: Arc<RwLock<HashMap<i64, Notification>>>,
    staff: Arc<RwLock<HashMap<i64, (String, Option<String>)>>>,
    next_id: AtomicI64,
}

impl Default for MockNotificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotificationRepository {
    /// Creates a new mock repository.
    pub fn new() -> Self {
        Self {
            notifications: Arc::new(RwLock::new(HashMap::new())),
            staff: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    /// Creates a mock repository pre-populated with notifications.
    pub fn with_notifications(notifications: Vec<Notification>) -> Self {
        let next = notifications.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let map: HashMap<i64, Notification> =
            notifications.into_iter().map(|n| (n.id, n)).collect();
        Self {
            notifications: Arc::new(RwLock::new(map)),
            staff: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(next),
        }
    }

    /// Seeds staff users as `(id, email, name)` for sender enrichment.
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

    /// Gets a snapshot of all notifications in the mock.
    pub async fn snapshot(&self) -> Vec<Notification> {
        self.notifications.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl NotificationRepository for MockNotificationRepository {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, DbError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Notification {
            id,
            incident_id: notification.incident_id,
            notification_type: notification.notification_type.clone(),
            recipient_type: notification.recipient_type.clone(),
            recipient_email: notification.recipient_email.clone(),
            recipient_name: notification.recipient_name.clone(),
            sent_by: None,
            status: NotificationStatus::Pending,
            sent_at: None,
            template_used: None,
            error_message: None,
            created_at: Utc::now(),
        };

        self.notifications.write().await.insert(id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Notification>, DbError> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&id).cloned())
    }

    async fn list_for_incident(
        &self,
        incident_id: i64,
    ) -> Result<Vec<NotificationWithSender>, DbError> {
        let notifications = self.notifications.read().await;
        let staff = self.staff.read().await;

        let mut result: Vec<Notification> = notifications
            .values()
            .filter(|n| n.incident_id == incident_id)
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(result
            .into_iter()
            .map(|notification| {
                let sender = notification.sent_by.and_then(|id| staff.get(&id).cloned());
                let (sender_email, sender_name) = match sender {
                    Some((email, name)) => (Some(email), name),
                    None => (None, None),
                };
                NotificationWithSender {
                    notification,
                    sender_email,
                    sender_name,
                }
            })
            .collect())
    }

    async fn mark_sent(
        &self,
        id: i64,
        sent_by: Option<i64>,
        template_used: &str,
    ) -> Result<Notification, DbError> {
        let mut notifications = self.notifications.write().await;

        let notification = notifications
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("Notification", id))?;

        notification.status = NotificationStatus::Sent;
        notification.sent_at = Some(Utc::now());
        notification.sent_by = sent_by;
        notification.template_used = Some(template_used.to_string());
        notification.error_message = None;
        Ok(notification.clone())
    }

    async fn mark_failed(
        &self,
        id: i64,
        sent_by: Option<i64>,
        template_used: &str,
        error_message: &str,
    ) -> Result<Notification, DbError> {
        let mut notifications = self.notifications.write().await;

        let notification = notifications
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("Notification", id))?;

        notification.status = NotificationStatus::Failed;
        notification.sent_at = None;
        notification.sent_by = sent_by;
        notification.template_used = Some(template_used.to_string());
        notification.error_message = Some(error_message.to_string());
        Ok(notification.clone())
    }
}
