//! Mock mail transport for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{DeliveryReceipt, MailTransport, MailerError, OutboundEmail};

#[derive(Debug, Clone)]
enum Outcome {
    Deliver,
    Reject(String),
    Fail(String),
}

/// In-memory transport recording everything handed to it.
///
/// The outcome of future sends can be switched at any point, so a test can
/// fail a first attempt and deliver the retry.
pub struct MockMailTransport {
    sent: Mutex<Vec<OutboundEmail>>,
    calls: AtomicUsize,
    outcome: Mutex<Outcome>,
}

impl Default for MockMailTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMailTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            outcome: Mutex::new(Outcome::Deliver),
        }
    }

    /// Makes every following send succeed.
    pub fn deliver_all(&self) {
        *self.outcome.lock().unwrap() = Outcome::Deliver;
    }

    /// Makes every following send come back as a gateway rejection.
    pub fn reject_with(&self, message: &str) {
        *self.outcome.lock().unwrap() = Outcome::Reject(message.to_string());
    }

    /// Makes every following send fail with a transport error.
    pub fn fail_with(&self, message: &str) {
        *self.outcome.lock().unwrap() = Outcome::Fail(message.to_string());
    }

    /// Number of send attempts, including rejected and failed ones.
    pub fn send_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Emails the mock accepted, in send order.
    pub fn outbox(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for MockMailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.lock().unwrap().clone();

        match outcome {
            Outcome::Deliver => {
                self.sent.lock().unwrap().push(email.clone());
                Ok(DeliveryReceipt::delivered())
            }
            Outcome::Reject(message) => Ok(DeliveryReceipt::rejected(message)),
            Outcome::Fail(message) => Err(MailerError::SendFailed(message)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutboundEmail {
        OutboundEmail {
            to: to.to_string(),
            subject: "subject".to_string(),
            body: "body".to_string(),
            is_html: true,
        }
    }

    #[tokio::test]
    async fn test_records_delivered_mail_in_order() {
        let mock = MockMailTransport::new();
        mock.send(&email("first@example.com")).await.unwrap();
        mock.send(&email("second@example.com")).await.unwrap();

        let outbox = mock.outbox();
        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox[0].to, "first@example.com");
        assert_eq!(outbox[1].to, "second@example.com");
        assert_eq!(mock.send_count(), 2);
    }

    #[tokio::test]
    async fn test_reject_mode_returns_receipt() {
        let mock = MockMailTransport::new();
        mock.reject_with("unknown recipient");

        let receipt = mock.send(&email("a@example.com")).await.unwrap();
        assert!(!receipt.accepted);
        assert_eq!(receipt.message.as_deref(), Some("unknown recipient"));
        assert!(mock.outbox().is_empty());
        assert_eq!(mock.send_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_mode_then_recovery() {
        let mock = MockMailTransport::new();
        mock.fail_with("gateway unreachable");
        assert!(mock.send(&email("a@example.com")).await.is_err());

        mock.deliver_all();
        assert!(mock.send(&email("a@example.com")).await.is_ok());
        assert_eq!(mock.outbox().len(), 1);
        assert_eq!(mock.send_count(), 2);
    }
}
