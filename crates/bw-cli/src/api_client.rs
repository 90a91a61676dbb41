//! HTTP client for communicating with the Breachward API.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the acting staff user id.
const ACTOR_ID_HEADER: &str = "x-actor-id";

/// API client for the Breachward server.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a new API client.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Checks if the API server is healthy.
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/health").await
    }

    /// Lists incidents with optional filtering.
    pub async fn list_incidents(&self, params: &ListIncidentsParams) -> Result<IncidentList> {
        let mut url = format!("{}/api/incidents", self.base_url);
        let mut query_parts = Vec::new();

        if let Some(status) = &params.status {
            query_parts.push(format!("status={}", status));
        }
        if let Some(severity) = &params.severity {
            query_parts.push(format!("severity={}", severity));
        }
        if let Some(limit) = params.limit {
            query_parts.push(format!("limit={}", limit));
        }
        if let Some(offset) = params.offset {
            query_parts.push(format!("offset={}", offset));
        }

        if !query_parts.is_empty() {
            url.push('?');
            url.push_str(&query_parts.join("&"));
        }

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request")?;

        self.handle_response(response).await
    }

    /// Gets a single incident by ID.
    pub async fn get_incident(&self, id: i64) -> Result<IncidentSummary> {
        self.get(&format!("/api/incidents/{}", id)).await
    }

    /// Updates an incident's workflow status.
    pub async fn update_incident_status(&self, id: i64, status: &str) -> Result<IncidentSummary> {
        let url = format!("{}/api/incidents/{}/status", self.base_url, id);
        let body = UpdateStatusBody {
            status: status.to_string(),
        };

        let response = self
            .client
            .patch(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send request")?;

        self.handle_response(response).await
    }

    /// Lists the notifications staged for an incident.
    pub async fn list_notifications(&self, incident_id: i64) -> Result<Vec<NotificationSummary>> {
        self.get(&format!("/api/incidents/{}/notifications", incident_id))
            .await
    }

    /// Sends a staged notification, recording the actor when given.
    pub async fn send_notification(
        &self,
        id: i64,
        actor: Option<i64>,
    ) -> Result<NotificationSummary> {
        let url = format!("{}/api/notifications/{}/send", self.base_url, id);

        let mut request = self.client.post(&url);
        if let Some(actor) = actor {
            request = request.header(ACTOR_ID_HEADER, actor);
        }

        let response = request.send().await.context("Failed to send request")?;
        self.handle_response(response).await
    }

    // Helper methods

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request")?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .context("Failed to parse response body")
        } else {
            let error: ApiErrorResponse =
                response.json().await.unwrap_or_else(|_| ApiErrorResponse {
                    code: "UNKNOWN".to_string(),
                    message: "Unknown error".to_string(),
                });

            anyhow::bail!("API error ({}): {} - {}", status, error.code, error.message)
        }
    }
}

// Request/Response types (matching server DTOs)

#[derive(Debug, Default)]
pub struct ListIncidentsParams {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
struct UpdateStatusBody {
    status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IncidentList {
    pub incidents: Vec<IncidentSummary>,
    pub total: u64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IncidentSummary {
    pub id: i64,
    pub incident_type: String,
    pub severity: String,
    pub status: String,
    pub description: String,
    #[serde(default)]
    pub affected_users: Vec<String>,
    #[serde(default)]
    pub affected_data_types: Vec<String>,
    pub detected_at: DateTime<Utc>,
    #[serde(default)]
    pub reporter_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationSummary {
    pub id: i64,
    pub incident_id: i64,
    pub notification_type: String,
    pub recipient_type: String,
    pub recipient_email: String,
    pub status: String,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}
