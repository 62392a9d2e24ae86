//! Saved FAQ set endpoints.
//!
//! - GET /api/faqs - List the user's saved sets
//! - POST /api/faqs - Save a set
//! - DELETE /api/faqs/{id} - Delete a set
//! - GET /api/faqs/{id}/export - Download a set as JSON or HTML

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    extract::JsonBody,
    middleware::auth::SessionUser,
    models::faq::{CreateFaqSetRequest, ExportFormat, ExportQuery, FaqSetResponse},
    services::{faq_service, user_service},
};

/// List all saved sets of the signed-in user, newest first.
pub async fn list_faq_sets(
    State(pool): State<DbPool>,
    Extension(session): Extension<SessionUser>,
) -> Result<Json<Vec<FaqSetResponse>>, AppError> {
    let sets = faq_service::list_sets(&pool, session.user_id).await?;

    Ok(Json(sets))
}

/// Save a FAQ set.
///
/// Saving the same title and source URL again within five seconds returns
/// the first set instead of creating a second one.
///
/// # Response
///
/// - **Success (200 OK)**: The saved set with its items
/// - **Error (400)**: Missing title
pub async fn create_faq_set(
    State(pool): State<DbPool>,
    Extension(session): Extension<SessionUser>,
    JsonBody(request): JsonBody<CreateFaqSetRequest>,
) -> Result<Json<FaqSetResponse>, AppError> {
    user_service::ensure_user(&pool, &session).await?;

    let set = faq_service::create_set(&pool, session.user_id, request).await?;

    Ok(Json(set))
}

/// Delete one of the signed-in user's sets.
///
/// # Response
///
/// - **Success (200 OK)**: `{ "success": true }`
/// - **Error (404)**: Unknown set or owned by someone else
pub async fn delete_faq_set(
    State(pool): State<DbPool>,
    Extension(session): Extension<SessionUser>,
    Path(set_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    faq_service::delete_set(&pool, session.user_id, set_id).await?;

    Ok(Json(json!({ "success": true })))
}

/// Download a set as an attachment.
///
/// `?format=json` (default) returns a `[{question, answer}]` array,
/// `?format=html` a styled snippet.
pub async fn export_faq_set(
    State(pool): State<DbPool>,
    Extension(session): Extension<SessionUser>,
    Path(set_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let items = faq_service::export_items(&pool, session.user_id, set_id).await?;

    let response = match query.format {
        ExportFormat::Json => (
            [(header::CONTENT_DISPOSITION, "attachment; filename=\"faq.json\"")],
            Json(items),
        )
            .into_response(),
        ExportFormat::Html => (
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"faq.html\""),
            ],
            faq_service::render_html(&items),
        )
            .into_response(),
    };

    Ok(response)
}
