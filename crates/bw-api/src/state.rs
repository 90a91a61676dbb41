//! Shared state handed to every request handler.

use std::sync::Arc;

use bw_core::db::DbPool;
use bw_core::{IncidentService, NotificationService, RemediationService};

/// Services and optional database handle shared across the router.
///
/// The pool is carried separately from the services so the health
/// endpoint can probe connectivity without going through a repository.
#[derive(Clone)]
pub struct AppState {
    pub incidents: Arc<IncidentService>,
    pub notifications: Arc<NotificationService>,
    pub remediations: Arc<RemediationService>,
    pub db: Option<Arc<DbPool>>,
}

impl AppState {
    pub fn new(
        incidents: IncidentService,
        notifications: NotificationService,
        remediations: RemediationService,
    ) -> Self {
        Self {
            incidents: Arc::new(incidents),
            notifications: Arc::new(notifications),
            remediations: Arc::new(remediations),
            db: None,
        }
    }

    pub fn with_db(mut self, db: DbPool) -> Self {
        self.db = Some(Arc::new(db));
        self
    }
}
