use std::sync::Arc;

use crate::db::MatchStore;
use crate::services::{auth::AuthService, dashboard::DashboardService};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardService>,
    pub auth: Arc<AuthService>,
    pub default_page_size: i64,
}

impl AppState {
    pub fn new(store: Arc<dyn MatchStore>, auth: AuthService, default_page_size: i64) -> Self {
        Self {
            dashboard: Arc::new(DashboardService::new(store)),
            auth: Arc::new(auth),
            default_page_size,
        }
    }
}
