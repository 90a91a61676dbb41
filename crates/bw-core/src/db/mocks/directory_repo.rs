//! Mock implementation of DirectoryRepository for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::{DbError, DirectoryRepository};
use crate::directory::DpoContact;

/// Mock implementation of DirectoryRepository using in-memory storage.
///
/// `set_fail(true)` makes every method return an error, for exercising the
/// degraded paths of recipient resolution.
pub struct MockDirectoryRepository {
    superadmins: Arc<RwLock<Vec<String>>>,
    security_team: Arc<RwLock<Vec<String>>>,
    dpo: Arc<RwLock<Option<DpoContact>>>,
    fail: Arc<AtomicBool>,
}

impl Default for MockDirectoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDirectoryRepository {
    /// Creates a new empty mock directory.
    pub fn new() -> Self {
        Self {
            superadmins: Arc::new(RwLock::new(Vec::new())),
            security_team: Arc::new(RwLock::new(Vec::new())),
            dpo: Arc::new(RwLock::new(None)),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Seeds superadmin emails.
    pub fn with_superadmins(self, emails: Vec<String>) -> Self {
        Self {
            superadmins: Arc::new(RwLock::new(emails)),
            ..self
        }
    }

    /// Seeds security team emails.
    pub fn with_security_team(self, emails: Vec<String>) -> Self {
        Self {
            security_team: Arc::new(RwLock::new(emails)),
            ..self
        }
    }

    /// Seeds the DPO contact.
    pub fn with_dpo(self, contact: DpoContact) -> Self {
        Self {
            dpo: Arc::new(RwLock::new(Some(contact))),
            ..self
        }
    }

    /// Makes every directory lookup fail until turned off again.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DbError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DbError::Query("directory unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryRepository for MockDirectoryRepository {
    async fn superadmin_emails(&self) -> Result<Vec<String>, DbError> {
        self.check()?;
        Ok(self.superadmins.read().await.clone())
    }

    async fn security_team_emails(&self) -> Result<Vec<String>, DbError> {
        self.check()?;
        Ok(self.security_team.read().await.clone())
    }

    async fn latest_dpo_contact(&self) -> Result<Option<DpoContact>, DbError> {
        self.check()?;
        Ok(self.dpo.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_seeded_lists_are_returned() {
        let repo = MockDirectoryRepository::new()
            .with_superadmins(vec!["admin@hospital.example".to_string()])
            .with_security_team(vec!["sec@hospital.example".to_string()]);

        assert_eq!(
            repo.superadmin_emails().await.unwrap(),
            vec!["admin@hospital.example"]
        );
        assert_eq!(
            repo.security_team_emails().await.unwrap(),
            vec!["sec@hospital.example"]
        );
        assert!(repo.latest_dpo_contact().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fail_flag_breaks_all_lookups() {
        let repo = MockDirectoryRepository::new()
            .with_superadmins(vec!["admin@hospital.example".to_string()]);
        repo.set_fail(true);

        assert!(repo.superadmin_emails().await.is_err());
        assert!(repo.security_team_emails().await.is_err());
        assert!(repo.latest_dpo_contact().await.is_err());

        repo.set_fail(false);
        assert!(repo.superadmin_emails().await.is_ok());
    }

    #[tokio::test]
    async fn test_dpo_contact_round_trips() {
        let contact = DpoContact {
            id: 1,
            name: Some("Erika Muster".to_string()),
            email: "dpo@hospital.example".to_string(),
            phone: Some("+49 30 1234".to_string()),
            updated_at: Utc::now(),
        };
        let repo = MockDirectoryRepository::new().with_dpo(contact);

        let loaded = repo.latest_dpo_contact().await.unwrap().unwrap();
        assert_eq!(loaded.email, "dpo@hospital.example");
    }
}
