//! HTTP API mail transport.
//!
//! Posts email as JSON to a transactional mail gateway, authenticating with
//! an optional bearer token.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::{DeliveryReceipt, MailTransport, MailerError, OutboundEmail};

/// Configuration for the HTTP mail transport.
#[derive(Debug, Clone)]
pub struct HttpMailerConfig {
    /// Gateway endpoint receiving the JSON payload.
    pub endpoint: String,
    /// Bearer token, when the gateway requires one.
    pub api_key: Option<String>,
    /// Address used as the envelope sender.
    pub from_address: String,
    /// Request timeout.
    pub timeout: Duration,
}

/// A transport that posts email to an HTTP mail gateway.
pub struct HttpMailer {
    config: HttpMailerConfig,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(config: HttpMailerConfig) -> Result<Self, MailerError> {
        if config.endpoint.is_empty() {
            return Err(MailerError::InvalidConfig(
                "mail gateway endpoint cannot be empty".to_string(),
            ));
        }
        if config.from_address.is_empty() {
            return Err(MailerError::InvalidConfig(
                "mail from address cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                MailerError::InvalidConfig(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn payload<'a>(&'a self, email: &'a OutboundEmail) -> SendPayload<'a> {
        SendPayload {
            from: &self.config.from_address,
            to: &email.to,
            subject: &email.subject,
            html: email.is_html.then_some(email.body.as_str()),
            text: (!email.is_html).then_some(email.body.as_str()),
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailer {
    #[instrument(skip(self, email), fields(to = %email.to))]
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailerError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&self.payload(email));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailerError::SendFailed(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %email.to, "mail gateway accepted message");
            Ok(DeliveryReceipt::delivered())
        } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Err(MailerError::RateLimited(
                "mail gateway rate limit exceeded".to_string(),
            ))
        } else if status.is_client_error() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            error!(to = %email.to, status = %status, "mail gateway rejected message");
            Ok(DeliveryReceipt::rejected(format!(
                "gateway returned {}: {}",
                status, body
            )))
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            Err(MailerError::SendFailed(format!(
                "gateway returned {}: {}",
                status, body
            )))
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Gateway send payload.
#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}
