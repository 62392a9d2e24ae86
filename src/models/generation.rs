//! Request and response types of the generation endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::faq::FaqItem;

/// Request body of the public, API-key gated `POST /api/public/generate`.
///
/// # JSON Example
///
/// ```json
/// {
///   "url": "https://example.com",
///   "language": "en",
///   "count": 8,
///   "tone": "friendly",
///   "includeSeo": true,
///   "topics": ["pricing", "support"]
/// }
/// ```
///
/// Either `url` or `content` must be given. When both are present the
/// content wins and the page is not fetched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicGenerateRequest {
    pub url: Option<String>,
    pub content: Option<String>,

    #[serde(default = "default_public_language")]
    pub language: String,

    #[serde(default = "default_public_count")]
    pub count: i32,

    #[serde(default = "default_public_tone")]
    pub tone: String,

    /// `false` returns the FAQs as one plain-text block instead of a list
    #[serde(default = "default_true")]
    pub structured: bool,

    #[serde(default = "default_public_model")]
    pub model: String,

    #[serde(default)]
    pub include_seo: bool,

    #[serde(default)]
    pub topics: Vec<String>,
}

fn default_public_language() -> String {
    "de".to_string()
}

fn default_public_count() -> i32 {
    6
}

fn default_public_tone() -> String {
    "neutral".to_string()
}

fn default_public_model() -> String {
    "gpt-5-mini".to_string()
}

fn default_true() -> bool {
    true
}

/// Echo of the parameters used for a public generation call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMeta {
    pub language: String,
    pub count: i32,
    pub model: String,
    pub tone: String,
    pub topics: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Response body of the public generation endpoint.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PublicGenerateResponse {
    #[serde(rename_all = "camelCase")]
    Structured {
        success: bool,
        faqs: Vec<FaqItem>,
        seo: Option<SeoAnalysis>,
        meta: GenerationMeta,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        success: bool,
        faq_text: String,
        seo: Option<SeoAnalysis>,
    },
}

/// Request body of the session-authenticated `POST /api/generate`.
///
/// Absent parameters fall back to the caller's stored settings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub content: Option<String>,
    pub language: Option<String>,
    pub faq_count: Option<i32>,
    pub tone: Option<String>,
    pub model: Option<String>,
}

/// Response body of `POST /api/generate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FaqList {
    pub faqs: Vec<FaqItem>,
}

/// Request body of `POST /api/seo-score`.
#[derive(Debug, Deserialize)]
pub struct SeoScoreRequest {
    #[serde(default)]
    pub faq: Vec<FaqItem>,
}

/// Request body of `POST /api/extract`.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: Option<String>,
}

/// Response body of `POST /api/extract`.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub content: String,
}

/// SEO assessment of a FAQ list, as returned by the scoring call.
///
/// `score` ranges from 0 to 100; `estimated_impact` is a short label such
/// as "high", "medium" or "low" in the requested language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoAnalysis {
    pub score: f64,
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub estimated_impact: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_request_defaults() {
        let request: PublicGenerateRequest =
            serde_json::from_str(r#"{"content": "Some text"}"#).unwrap();

        assert_eq!(request.language, "de");
        assert_eq!(request.count, 6);
        assert_eq!(request.tone, "neutral");
        assert_eq!(request.model, "gpt-5-mini");
        assert!(request.structured);
        assert!(!request.include_seo);
        assert!(request.topics.is_empty());
        assert!(request.url.is_none());
    }

    #[test]
    fn text_response_uses_camel_case() {
        let response = PublicGenerateResponse::Text {
            success: true,
            faq_text: "Q1: a\nA: b".to_string(),
            seo: None,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["faqText"], "Q1: a\nA: b");
        assert!(value["seo"].is_null());
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn seo_analysis_tolerates_missing_lists() {
        let analysis: SeoAnalysis = serde_json::from_str(
            r#"{"score": 71, "summary": "Solid", "estimatedImpact": "medium"}"#,
        )
        .unwrap();

        assert_eq!(analysis.score, 71.0);
        assert!(analysis.strengths.is_empty());
        assert_eq!(analysis.estimated_impact, "medium");
    }
}
