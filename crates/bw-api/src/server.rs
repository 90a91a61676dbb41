//! API server implementation.

use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes;
use crate::state::AppState;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind to.
    pub bind_address: SocketAddr,
    /// Request timeout.
    pub request_timeout: Duration,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// API server.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Creates a new API server.
    pub fn new(state: AppState, config: ApiServerConfig) -> Self {
        Self { config, state }
    }

    /// Creates a new API server with default configuration.
    pub fn with_state(state: AppState) -> Self {
        Self::new(state, ApiServerConfig::default())
    }

    /// Builds the router with the middleware stack applied.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.config.request_timeout))
            .layer(cors_layer())
            .layer(CatchPanicLayer::new())
    }

    /// Runs the server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let app = self.router();
        let addr = self.config.bind_address;

        info!("Starting API server on {}", addr);

        let listener = TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server shut down gracefully");
        Ok(())
    }

    /// Runs the server with a custom shutdown signal.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let addr = self.config.bind_address;

        info!("Starting API server on {}", addr);

        let listener = TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("API server shut down gracefully");
        Ok(())
    }
}

fn cors_layer() -> tower_http::cors::CorsLayer {
    use axum::http::{header, HeaderName};

    tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(crate::extract::ACTOR_ID_HEADER),
        ])
        .max_age(Duration::from_secs(3600))
}

/// Default shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bw_core::db::mocks::{
        MockDirectoryRepository, MockIncidentRepository, MockNotificationRepository,
        MockRemediationRepository,
    };
    use bw_core::db::{
        DirectoryRepository, IncidentRepository, NotificationRepository, RemediationRepository,
    };
    use bw_core::{
        AlertConfig, IncidentService, NotificationService, RecipientResolver, RemediationService,
    };
    use bw_mailer::{MailTransport, MockMailTransport};

    #[tokio::test]
    async fn test_router_creation() {
        let incidents: Arc<dyn IncidentRepository> = Arc::new(MockIncidentRepository::new());
        let notifications: Arc<dyn NotificationRepository> =
            Arc::new(MockNotificationRepository::new());
        let remediations: Arc<dyn RemediationRepository> =
            Arc::new(MockRemediationRepository::new());
        let directory: Arc<dyn DirectoryRepository> = Arc::new(MockDirectoryRepository::new());
        let mailer: Arc<dyn MailTransport> = Arc::new(MockMailTransport::new());

        let state = AppState::new(
            IncidentService::new(
                incidents.clone(),
                RecipientResolver::new(directory.clone()),
                mailer.clone(),
                AlertConfig::default(),
            ),
            NotificationService::new(notifications, incidents.clone(), directory, mailer),
            RemediationService::new(remediations, incidents),
        );

        let server = ApiServer::with_state(state);
        let _router = server.router();
    }

    #[test]
    fn test_default_config() {
        let config = ApiServerConfig::default();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
