//! # bw-mailer
//!
//! Mail transport abstraction for Breachward.
//!
//! This crate defines the `MailTransport` trait used by the breach workflow
//! to deliver notification email, along with an HTTP gateway transport, a
//! log-only transport for development, and an in-memory mock for tests.

mod http;
mod log;
mod mock;

pub use http::{HttpMailer, HttpMailerConfig};
pub use log::LogMailer;
pub use mock::MockMailTransport;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when handing mail to a transport.
#[derive(Error, Debug)]
pub enum MailerError {
    /// The transport could not reach the mail gateway.
    #[error("failed to send email: {0}")]
    SendFailed(String),

    /// The transport configuration is invalid.
    #[error("invalid mailer configuration: {0}")]
    InvalidConfig(String),

    /// The gateway refused the request due to rate limiting.
    #[error("rate limited: {0}")]
    RateLimited(String),
}

/// An email ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

/// Outcome of a send attempt that reached the gateway.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// Whether the gateway accepted the message.
    pub accepted: bool,
    /// Gateway-supplied detail, usually present when rejected.
    pub message: Option<String>,
}

impl DeliveryReceipt {
    pub fn delivered() -> Self {
        Self {
            accepted: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            message: Some(message.into()),
        }
    }
}

/// A channel capable of delivering breach notification email.
///
/// `Ok` with `accepted == false` means the gateway took the request but
/// refused the message. Transports reserve `Err` for failures reaching the
/// gateway at all.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailerError>;

    /// A short name identifying the transport, for logs.
    fn name(&self) -> &str;
}
