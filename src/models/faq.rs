//! FAQ data models and API request/response types.
//!
//! This module defines:
//! - `FaqItem`: A question/answer pair as produced by the generator
//! - `FaqSet` / `Faq`: Database entities for saved results
//! - Request and response types for the saved-FAQ endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single generated question with its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// Represents a saved FAQ set from the database.
///
/// # Database Table
///
/// Maps to the `faq_sets` table. Each set belongs to exactly one user and
/// owns its items (deleted with it via `ON DELETE CASCADE`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FaqSet {
    pub id: Uuid,
    pub title: String,
    pub source_url: Option<String>,
    pub description: Option<String>,

    /// SEO analysis as returned by the scoring call, stored verbatim
    pub seo_score: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
}

/// Represents one item of a saved set (`faqs` table).
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: Uuid,
    pub faq_set_id: Uuid,
    pub question: String,
    pub answer: String,

    /// Zero-based position inside the set
    pub position: i32,
}

/// Request body for saving a FAQ set.
///
/// # JSON Example
///
/// ```json
/// {
///   "title": "example.com",
///   "sourceUrl": "https://example.com",
///   "description": "Generated on import",
///   "seoScore": { "score": 82, "summary": "..." },
///   "faqs": [{ "question": "What is it?", "answer": "A tool." }]
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFaqSetRequest {
    pub title: String,
    pub source_url: Option<String>,
    pub description: Option<String>,
    pub seo_score: Option<serde_json::Value>,
    pub faqs: Vec<FaqItem>,
}

/// Response body for a saved set, items ordered by position.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqSetResponse {
    pub id: Uuid,
    pub title: String,
    pub source_url: Option<String>,
    pub description: Option<String>,
    pub seo_score: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub faqs: Vec<Faq>,
}

impl FaqSetResponse {
    pub fn new(set: FaqSet, faqs: Vec<Faq>) -> Self {
        Self {
            id: set.id,
            title: set.title,
            source_url: set.source_url,
            description: set.description,
            seo_score: set.seo_score,
            created_at: set.created_at,
            faqs,
        }
    }
}

/// Output formats supported by the export endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Html,
}

/// Query string of `GET /api/faqs/{id}/export`.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}
