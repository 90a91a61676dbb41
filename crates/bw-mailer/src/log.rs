//! Log-only mail transport.

use async_trait::async_trait;
use tracing::info;

use crate::{DeliveryReceipt, MailTransport, MailerError, OutboundEmail};

/// A transport that records email to the log instead of delivering it.
///
/// Used in development and as the default when no gateway is configured.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailerError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            bytes = email.body.len(),
            "mail delivery disabled, logging only"
        );
        Ok(DeliveryReceipt::delivered())
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_delivers() {
        let mailer = LogMailer::new();
        let receipt = mailer
            .send(&OutboundEmail {
                to: "anyone@example.com".to_string(),
                subject: "subject".to_string(),
                body: "body".to_string(),
                is_html: false,
            })
            .await
            .unwrap();

        assert!(receipt.accepted);
        assert_eq!(mailer.name(), "log");
    }
}
