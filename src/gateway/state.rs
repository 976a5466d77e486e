use std::sync::Arc;

use crate::db::Database;
use crate::transfer::TransferService;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Transfer orchestration
    pub service: Arc<TransferService>,
    /// PostgreSQL, used by the health check. `None` in tests.
    pub db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(service: Arc<TransferService>, db: Option<Arc<Database>>) -> Self {
        Self { service, db }
    }
}
