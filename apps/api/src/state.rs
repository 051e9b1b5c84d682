use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Generator;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Model backend. `GeminiClient` in production, a stub in tests.
    pub generator: Arc<dyn Generator>,
    pub sessions: SessionStore,
}
