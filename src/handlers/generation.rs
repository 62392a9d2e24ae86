//! Generation endpoints used by the web UI.
//!
//! - POST /api/extract - Fetch a page and return its text
//! - POST /api/generate - Generate FAQs from text
//! - POST /api/seo-score - Score a FAQ list for SEO

use axum::{Extension, Json, extract::State};

use crate::{
    error::AppError,
    extract::JsonBody,
    middleware::auth::SessionUser,
    models::{
        generation::{
            ExtractRequest, ExtractResponse, FaqList, GenerateRequest, SeoAnalysis,
            SeoScoreRequest,
        },
        settings::MAX_FAQ_COUNT,
    },
    services::{
        extraction,
        faq_generation::{self, DEFAULT_SEO_MODEL, GenerationParams},
        settings_service, user_service,
    },
    state::AppState,
};

/// Extract the visible text of a web page.
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{ "content": "..." }`
/// - **Error (400)**: Missing or non-HTTP URL
/// - **Error (500)**: The page could not be loaded
pub async fn extract(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    let url = request
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("No URL detected".to_string()))?;

    let content = extraction::fetch_page_text(&state.http, &url).await?;

    Ok(Json(ExtractResponse { content }))
}

/// Generate FAQs from extracted text.
///
/// Parameters missing from the body come from the user's settings.
///
/// # Response
///
/// - **Success (200 OK)**: `{ "faqs": [{ "question": "...", "answer": "..." }] }`
/// - **Error (400)**: No content, or `faqCount` out of range
/// - **Error (500)**: The LLM call failed
pub async fn generate(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    JsonBody(request): JsonBody<GenerateRequest>,
) -> Result<Json<FaqList>, AppError> {
    let content = request
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("No content is provided".to_string()))?;

    user_service::ensure_user(&state.pool, &session).await?;
    let settings = settings_service::get_or_create(&state.pool, session.user_id).await?;

    let count = request.faq_count.unwrap_or(settings.faq_count);
    if !(1..=MAX_FAQ_COUNT).contains(&count) {
        return Err(AppError::InvalidRequest(format!(
            "faqCount must be between 1 and {}",
            MAX_FAQ_COUNT
        )));
    }

    let params = GenerationParams {
        language: request.language.unwrap_or(settings.language),
        count,
        tone: request.tone.unwrap_or(settings.tone),
        model: request.model.unwrap_or(settings.model),
        topics: Vec::new(),
    };

    let faqs = faq_generation::generate_faqs(&state.llm, &content, &params).await?;

    Ok(Json(FaqList { faqs }))
}

/// Score a FAQ list for its SEO value.
///
/// # Request Body
///
/// ```json
/// { "faq": [{ "question": "...", "answer": "..." }] }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: The SEO analysis object
/// - **Error (400)**: Empty FAQ list
/// - **Error (500)**: The LLM call failed
pub async fn seo_score(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SeoScoreRequest>,
) -> Result<Json<SeoAnalysis>, AppError> {
    if request.faq.is_empty() {
        return Err(AppError::InvalidRequest("No FAQ data provided".to_string()));
    }

    let analysis = faq_generation::score_seo(&state.llm, DEFAULT_SEO_MODEL, &request.faq).await?;

    Ok(Json(analysis))
}
