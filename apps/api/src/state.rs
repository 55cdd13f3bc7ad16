use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::generation::generator::ContentGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Two-provider caption generator (OpenAI primary, Gemini fallback in production).
    pub generator: Arc<ContentGenerator>,
    pub config: Config,
}
