//! API key gateway middleware for the public API.
//!
//! Every request is metered, whether or not its body turns out to be
//! valid: the check runs before the handler sees the request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use uuid::Uuid;

use super::auth::bearer_token;
use crate::{db::DbPool, error::AppError, services::rate_limit};

/// Owner of the API key that admitted the request.
#[derive(Debug, Clone)]
pub struct ApiKeyContext {
    pub user_id: Uuid,
}

/// API key gateway middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <key>` header from request
/// 2. Run the gateway check (key lookup, expiry, hourly window)
/// 3. If admitted: inject `ApiKeyContext`, call next handler
/// 4. Otherwise: 401 for missing, invalid or expired keys, 429 when rate limited
pub async fn api_key_middleware(
    State(pool): State<DbPool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = bearer_token(request.headers()).ok_or(AppError::MissingApiKey)?;

    let user_id = rate_limit::check(&pool, api_key, Utc::now()).await?;

    request.extensions_mut().insert(ApiKeyContext { user_id });

    Ok(next.run(request).await)
}
