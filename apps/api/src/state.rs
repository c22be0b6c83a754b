use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::export::CompileClient;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Text generator behind the tailoring pipeline. `LlmClient` in production.
    pub generator: Arc<dyn TextGenerator>,
    pub compiler: CompileClient,
    pub config: Config,
}
