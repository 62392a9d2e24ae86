//! User synchronization.
//!
//! - POST /api/user/sync - Mirror the session user into the database

use axum::{Extension, Json, extract::State};

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::SessionUser,
    models::user::SyncUserResponse,
    services::user_service,
};

/// Create or refresh the user row from the session token and make sure
/// default settings exist.
///
/// Typically called by the UI right after sign-in.
///
/// # Response
///
/// - **Success (200 OK)**: `{ "success": true, "user": { ... } }`
/// - **Error (400)**: The token carries no email
pub async fn sync_user(
    State(pool): State<DbPool>,
    Extension(session): Extension<SessionUser>,
) -> Result<Json<SyncUserResponse>, AppError> {
    let user = user_service::sync_user(&pool, &session).await?;

    Ok(Json(SyncUserResponse {
        success: true,
        user,
    }))
}
