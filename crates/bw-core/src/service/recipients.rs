//! Recipient resolution for internal breach alerts.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use crate::db::{DbError, DirectoryRepository};

/// Resolves the internal distribution list for breach alerts.
///
/// The list is the union of superadmin staff, the security team, and the
/// DPO contact, deduplicated and sorted by address. Resolution never fails:
/// when the directory is unreachable the resolver logs a warning and
/// returns an empty list.
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn DirectoryRepository>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn DirectoryRepository>) -> Self {
        Self { directory }
    }

    /// The alert distribution list for a new breach incident.
    pub async fn resolve_breach_recipients(&self) -> Vec<String> {
        match self.gather().await {
            Ok(recipients) => recipients.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "breach recipient resolution failed, continuing with empty list");
                Vec::new()
            }
        }
    }

    async fn gather(&self) -> Result<BTreeSet<String>, DbError> {
        let mut recipients = BTreeSet::new();
        recipients.extend(self.directory.superadmin_emails().await?);
        recipients.extend(self.directory.security_team_emails().await?);
        if let Some(dpo) = self.directory.latest_dpo_contact().await? {
            recipients.insert(dpo.email);
        }
        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mocks::MockDirectoryRepository;
    use crate::directory::DpoContact;
    use chrono::Utc;

    fn resolver(directory: MockDirectoryRepository) -> RecipientResolver {
        RecipientResolver::new(Arc::new(directory))
    }

    #[tokio::test]
    async fn test_union_is_deduplicated() {
        let directory = MockDirectoryRepository::new()
            .with_superadmins(vec![
                "admin@hospital.example".to_string(),
                "shared@hospital.example".to_string(),
            ])
            .with_security_team(vec![
                "shared@hospital.example".to_string(),
                "sec@hospital.example".to_string(),
            ]);

        let recipients = resolver(directory).resolve_breach_recipients().await;
        assert_eq!(recipients.len(), 3);
        assert_eq!(
            recipients
                .iter()
                .filter(|r| *r == "shared@hospital.example")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_order_is_deterministic() {
        let directory = MockDirectoryRepository::new()
            .with_superadmins(vec!["zeta@hospital.example".to_string()])
            .with_security_team(vec!["alpha@hospital.example".to_string()]);

        let recipients = resolver(directory).resolve_breach_recipients().await;
        assert_eq!(
            recipients,
            vec!["alpha@hospital.example", "zeta@hospital.example"]
        );
    }

    #[tokio::test]
    async fn test_dpo_contact_is_included() {
        let directory = MockDirectoryRepository::new().with_dpo(DpoContact {
            id: 1,
            name: None,
            email: "dpo@hospital.example".to_string(),
            phone: None,
            updated_at: Utc::now(),
        });

        let recipients = resolver(directory).resolve_breach_recipients().await;
        assert_eq!(recipients, vec!["dpo@hospital.example"]);
    }

    #[tokio::test]
    async fn test_directory_failure_yields_empty_list() {
        let directory = MockDirectoryRepository::new()
            .with_superadmins(vec!["admin@hospital.example".to_string()]);
        directory.set_fail(true);

        let recipients = resolver(directory).resolve_breach_recipients().await;
        assert!(recipients.is_empty());
    }
}
