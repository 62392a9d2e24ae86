//! Public, API-key gated FAQ generation.
//!
//! - POST /api/public/generate - Generate FAQs from a URL or raw content

use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{
    error::AppError,
    extract::JsonBody,
    middleware::api_key::ApiKeyContext,
    models::{
        generation::{GenerationMeta, PublicGenerateRequest, PublicGenerateResponse},
        settings::MAX_FAQ_COUNT,
    },
    services::{extraction, faq_generation::{self, GenerationParams}},
    state::AppState,
};

/// Generate FAQs for an API client.
///
/// # Authentication
///
/// `Authorization: Bearer <apiKey>`; the call has already been metered
/// by the gateway middleware when this handler runs.
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "count": 6,
///   "includeSeo": true
/// }
/// ```
///
/// # Response (200)
///
/// ```json
/// {
///   "success": true,
///   "faqs": [{ "question": "...", "answer": "..." }],
///   "seo": { "score": 78, "summary": "...", "estimatedImpact": "medium" },
///   "meta": { "language": "de", "count": 6, "model": "gpt-5-mini", "tone": "neutral", "topics": [], "generatedAt": "..." }
/// }
/// ```
///
/// With `"structured": false` the FAQs come back as one `faqText` string.
///
/// # Errors
///
/// - **400**: Neither `url` nor `content`, or an out-of-range `count`
/// - **401 / 429**: Rejected by the gateway
/// - **500**: Page fetch or FAQ generation failed
///
/// A failing SEO call does not fail the request; `seo` is `null` then.
pub async fn generate(
    State(state): State<AppState>,
    Extension(caller): Extension<ApiKeyContext>,
    JsonBody(request): JsonBody<PublicGenerateRequest>,
) -> Result<Json<PublicGenerateResponse>, AppError> {
    if !(1..=MAX_FAQ_COUNT).contains(&request.count) {
        return Err(AppError::InvalidRequest(format!(
            "'count' must be between 1 and {}",
            MAX_FAQ_COUNT
        )));
    }

    let content = match (request.content, request.url) {
        (Some(content), _) if !content.trim().is_empty() => content,
        (_, Some(url)) if !url.trim().is_empty() => {
            extraction::fetch_page_text(&state.http, &url).await?
        }
        _ => {
            return Err(AppError::InvalidRequest(
                "You must provide either 'url' or 'content'".to_string(),
            ));
        }
    };

    let params = GenerationParams {
        language: request.language,
        count: request.count,
        tone: request.tone,
        model: request.model,
        topics: request.topics,
    };

    tracing::info!(user_id = %caller.user_id, model = %params.model, "public generation");

    let faqs = faq_generation::generate_faqs(&state.llm, &content, &params).await?;

    let seo = if request.include_seo {
        match faq_generation::score_seo(&state.llm, &params.model, &faqs).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "SEO scoring failed, returning FAQs without it");
                None
            }
        }
    } else {
        None
    };

    if !request.structured {
        return Ok(Json(PublicGenerateResponse::Text {
            success: true,
            faq_text: faq_generation::faq_text(&faqs),
            seo,
        }));
    }

    Ok(Json(PublicGenerateResponse::Structured {
        success: true,
        faqs,
        seo,
        meta: GenerationMeta {
            language: params.language,
            count: params.count,
            model: params.model,
            tone: params.tone,
            topics: params.topics,
            generated_at: Utc::now(),
        },
    }))
}
