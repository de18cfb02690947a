pub mod config;
pub mod diff;
pub mod repo;
pub mod rest;
pub mod review;
pub mod watcher;

use std::sync::Arc;

use config::WatchConfig;

/// Shared application state passed to REST handlers and background tasks.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<WatchConfig>,
    pub started_at: std::time::Instant,
}
