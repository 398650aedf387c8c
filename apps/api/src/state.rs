use std::sync::Arc;

use crate::config::Config;
use crate::store::ApplicationStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; every request shares it.
    pub store: Arc<dyn ApplicationStore>,
    pub config: Config,
}
