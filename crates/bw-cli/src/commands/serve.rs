//! Serve command - starts the API server.

use anyhow::{Context, Result};
use colored::Colorize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bw_api::{ApiServer, ApiServerConfig, AppState};
use bw_core::db::{
    create_directory_repository, create_incident_repository, create_notification_repository,
    create_pool_with_options, create_remediation_repository, run_migrations, PoolOptions,
};
use bw_core::{
    AlertConfig, IncidentService, NotificationService, RecipientResolver, RemediationService,
};
use bw_mailer::{HttpMailer, HttpMailerConfig, LogMailer, MailTransport};

use crate::config::{redact_url_password, AppConfig, MailerConfig};

/// Server configuration from CLI arguments merged over the config file.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Port to listen on.
    pub port: u16,
    /// Hostname to bind to.
    pub host: String,
    /// Database URL.
    pub database_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Whether to run schema migrations before serving.
    pub run_migrations: bool,
    /// Whether incident creation broadcasts internal alerts.
    pub alerts_enabled: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            database_url: "postgres://localhost:5432/breachward".to_string(),
            timeout_secs: 30,
            run_migrations: true,
            alerts_enabled: true,
        }
    }
}

/// Runs the API server.
pub async fn run_server(config: ServeConfig, app_config: AppConfig) -> Result<()> {
    println!("{} Starting Breachward API server...", "[server]".cyan());

    println!(
        "  {} Database: {}",
        "→".green(),
        redact_url_password(&config.database_url)
    );
    let db = create_pool_with_options(&config.database_url, PoolOptions::default())
        .await
        .context("Failed to create database connection pool")?;

    if config.run_migrations {
        println!("  {} Running migrations...", "→".green());
        run_migrations(&db)
            .await
            .context("Failed to run database migrations")?;
        println!("  {} Migrations complete", "✓".green());
    }

    let mailer = build_mailer(&app_config.mailer)?;
    println!("  {} Mail transport: {}", "→".green(), mailer.name());

    let incidents = create_incident_repository(&db);
    let notifications = create_notification_repository(&db);
    let remediations = create_remediation_repository(&db);
    let directory = create_directory_repository(&db);

    let incident_service = IncidentService::new(
        incidents.clone(),
        RecipientResolver::new(directory.clone()),
        mailer.clone(),
        AlertConfig {
            enabled: config.alerts_enabled,
        },
    );
    let notification_service =
        NotificationService::new(notifications, incidents.clone(), directory, mailer);
    let remediation_service = RemediationService::new(remediations, incidents);

    let state = AppState::new(incident_service, notification_service, remediation_service)
        .with_db(db);

    let bind_address: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid bind address")?;

    let server_config = ApiServerConfig {
        bind_address,
        request_timeout: Duration::from_secs(config.timeout_secs),
    };

    println!();
    println!("{}", "Breachward API Server".bold());
    println!("{}", "═".repeat(40));
    println!("  {} http://{}", "Address:".cyan(), bind_address);
    println!(
        "  {} {}",
        "Alerts:".cyan(),
        if config.alerts_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    println!();
    println!("{}", "Endpoints:".bold());
    println!("  GET   /health                          - Health check");
    println!("  POST  /api/incidents                   - Create incident");
    println!("  GET   /api/incidents                   - List incidents");
    println!("  GET   /api/incidents/:id               - Get incident");
    println!("  PATCH /api/incidents/:id/status        - Update status");
    println!("  POST  /api/incidents/:id/notifications - Stage notification");
    println!("  GET   /api/incidents/:id/notifications - List notifications");
    println!("  POST  /api/notifications/:id/send      - Send notification");
    println!("  POST  /api/incidents/:id/remediations  - Record remediation");
    println!("  GET   /api/incidents/:id/remediations  - List remediations");
    println!("  PATCH /api/remediations/:id            - Update remediation");
    println!();
    println!("Press {} to stop", "Ctrl+C".yellow());
    println!();

    let server = ApiServer::new(state, server_config);
    server.run().await.context("Server error")?;

    println!();
    println!("{} Server stopped", "[server]".cyan());

    Ok(())
}

/// Builds the mail transport named by the configuration.
fn build_mailer(config: &MailerConfig) -> Result<Arc<dyn MailTransport>> {
    match config.transport.as_str() {
        "http" => {
            let mailer = HttpMailer::new(HttpMailerConfig {
                endpoint: config.endpoint.clone(),
                api_key: (!config.api_key.is_empty()).then(|| config.api_key.clone()),
                from_address: config.from_address.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
            })?;
            Ok(Arc::new(mailer))
        }
        "log" => Ok(Arc::new(LogMailer)),
        other => anyhow::bail!(
            "Unknown mailer transport '{}': expected 'http' or 'log'",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let config = ServeConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.run_migrations);
        assert!(config.alerts_enabled);
    }

    #[test]
    fn test_build_mailer_log_transport() {
        let mailer = build_mailer(&MailerConfig::default()).unwrap();
        assert_eq!(mailer.name(), "log");
    }

    #[test]
    fn test_build_mailer_http_requires_endpoint() {
        let config = MailerConfig {
            transport: "http".to_string(),
            ..Default::default()
        };
        assert!(build_mailer(&config).is_err());
    }

    #[test]
    fn test_build_mailer_rejects_unknown_transport() {
        let config = MailerConfig {
            transport: "smtp".to_string(),
            ..Default::default()
        };
        assert!(build_mailer(&config).is_err());
    }
}
