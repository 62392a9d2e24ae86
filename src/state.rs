//! Shared application state handed to every handler.

use axum::extract::FromRef;

use crate::{db::DbPool, middleware::auth::SessionVerifier, services::llm::LlmClient};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,

    /// Client for page fetches; carries the configured timeout
    pub http: reqwest::Client,

    pub llm: LlmClient,

    pub sessions: SessionVerifier,
}

// Handlers that only touch the database extract `State<DbPool>` directly.
impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
