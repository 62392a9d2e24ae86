//! FAQ generation and SEO scoring on top of the LLM client.

use serde_json::json;

use crate::{
    models::{faq::FaqItem, generation::{FaqList, SeoAnalysis}},
    services::llm::{JsonSchema, LlmClient, LlmError, StructuredPrompt},
};

/// Only the beginning of a page is sent to the model.
pub const MAX_CONTENT_CHARS: usize = 6000;

/// Model used for SEO scoring when the caller does not pick one.
pub const DEFAULT_SEO_MODEL: &str = "gpt-4o-mini";

/// Parameters of one generation call.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub language: String,
    pub count: i32,
    pub tone: String,
    pub model: String,
    pub topics: Vec<String>,
}

fn faq_schema() -> JsonSchema {
    JsonSchema {
        name: "faq_schema",
        schema: json!({
            "type": "object",
            "properties": {
                "faqs": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": { "type": "string" },
                            "answer": { "type": "string" }
                        },
                        "required": ["question", "answer"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["faqs"],
            "additionalProperties": false
        }),
    }
}

fn seo_schema() -> JsonSchema {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });

    JsonSchema {
        name: "seo_analysis",
        schema: json!({
            "type": "object",
            "properties": {
                "score": {
                    "type": "number",
                    "description": "How much the FAQ section strengthens the SEO of the whole site (0-100)"
                },
                "summary": { "type": "string" },
                "strengths": string_list,
                "weaknesses": string_list,
                "recommendations": string_list,
                "estimatedImpact": {
                    "type": "string",
                    "description": "Estimated impact on the site's SEO: high, medium or low"
                }
            },
            "required": [
                "score",
                "summary",
                "strengths",
                "weaknesses",
                "recommendations",
                "estimatedImpact"
            ],
            "additionalProperties": false
        }),
    }
}

/// First [`MAX_CONTENT_CHARS`] characters of `content`, never splitting a char.
pub fn truncate_content(content: &str) -> &str {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((end, _)) => &content[..end],
        None => content,
    }
}

fn faq_prompt(content: &str, params: &GenerationParams) -> StructuredPrompt {
    let topics = if params.topics.is_empty() {
        "none".to_string()
    } else {
        params.topics.join(", ")
    };

    StructuredPrompt {
        system: format!(
            "You are a tool that produces structured, high-quality FAQ lists from website text. Answer in {}.",
            params.language
        ),
        user: format!(
            "Create a structured FAQ list based on the following website content.\n\n\
             Requirements:\n\
             - Number of questions: {}\n\
             - Language: {}\n\
             - Tone: {}\n\
             - Topic focus: {}\n\
             - Keep it clear, easy to understand and SEO friendly.\n\n\
             Website content:\n{}",
            params.count,
            params.language,
            params.tone,
            topics,
            truncate_content(content)
        ),
    }
}

fn seo_prompt(faqs: &[FaqItem]) -> StructuredPrompt {
    StructuredPrompt {
        system: "You are an experienced SEO analyst. You assess how much an FAQ section \
                 strengthens the SEO of an entire website: keyword coverage, featured snippet \
                 potential, semantic relevance, engagement and E-E-A-T."
            .to_string(),
        user: format!(
            "Analyse the following FAQ section in the context of the whole website's SEO. \
             Return a numeric score (0-100), a summary, strengths, weaknesses, \
             recommendations and the estimated impact (high, medium, low).\n\n{}",
            numbered_faqs(faqs)
        ),
    }
}

fn numbered_faqs(faqs: &[FaqItem]) -> String {
    faqs.iter()
        .enumerate()
        .map(|(i, faq)| {
            format!(
                "Question {n}: {}\nAnswer {n}: {}",
                faq.question,
                faq.answer,
                n = i + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render FAQs as plain text: `Q1: ...\nA: ...` blocks separated by a blank line.
pub fn faq_text(faqs: &[FaqItem]) -> String {
    faqs.iter()
        .enumerate()
        .map(|(i, faq)| format!("Q{}: {}\nA: {}", i + 1, faq.question, faq.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Ask the model for FAQs about `content`.
pub async fn generate_faqs(
    llm: &LlmClient,
    content: &str,
    params: &GenerationParams,
) -> Result<Vec<FaqItem>, LlmError> {
    let list: FaqList = llm
        .complete_json(&params.model, &faq_prompt(content, params), &faq_schema())
        .await?;

    tracing::info!(
        model = %params.model,
        requested = params.count,
        generated = list.faqs.len(),
        "FAQs generated"
    );

    Ok(list.faqs)
}

/// Ask the model to score the SEO value of `faqs`.
pub async fn score_seo(
    llm: &LlmClient,
    model: &str,
    faqs: &[FaqItem],
) -> Result<SeoAnalysis, LlmError> {
    llm.complete_json(model, &seo_prompt(faqs), &seo_schema()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn params() -> GenerationParams {
        GenerationParams {
            language: "en".to_string(),
            count: 4,
            tone: "friendly".to_string(),
            model: "gpt-5-mini".to_string(),
            topics: vec![],
        }
    }

    fn items() -> Vec<FaqItem> {
        vec![
            FaqItem {
                question: "What is it?".to_string(),
                answer: "A tool.".to_string(),
            },
            FaqItem {
                question: "Is it free?".to_string(),
                answer: "Partly.".to_string(),
            },
        ]
    }

    #[test]
    fn content_is_truncated_on_char_boundaries() {
        let long = "ä".repeat(MAX_CONTENT_CHARS + 10);
        let truncated = truncate_content(&long);

        assert_eq!(truncated.chars().count(), MAX_CONTENT_CHARS);

        assert_eq!(truncate_content("short"), "short");
    }

    #[test]
    fn prompt_includes_parameters() {
        let mut params = params();
        params.topics = vec!["pricing".to_string(), "support".to_string()];

        let prompt = faq_prompt("Page body", &params);

        assert!(prompt.system.contains("Answer in en"));
        assert!(prompt.user.contains("Number of questions: 4"));
        assert!(prompt.user.contains("Tone: friendly"));
        assert!(prompt.user.contains("Topic focus: pricing, support"));
        assert!(prompt.user.ends_with("Page body"));
    }

    #[test]
    fn prompt_without_topics_says_none() {
        let prompt = faq_prompt("Page body", &params());

        assert!(prompt.user.contains("Topic focus: none"));
    }

    #[test]
    fn text_rendering_numbers_questions() {
        assert_eq!(
            faq_text(&items()),
            "Q1: What is it?\nA: A tool.\n\nQ2: Is it free?\nA: Partly."
        );
        assert_eq!(faq_text(&[]), "");
    }

    #[test]
    fn seo_prompt_lists_every_item() {
        let prompt = seo_prompt(&items());

        assert!(prompt.user.contains("Question 1: What is it?\nAnswer 1: A tool."));
        assert!(prompt.user.contains("Question 2: Is it free?"));
    }

    /// Strict structured output needs every property required and no extras.
    fn assert_closed(schema: &Value) {
        assert_eq!(schema["additionalProperties"], false);

        let properties = schema["properties"].as_object().unwrap();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), properties.len());
        for name in properties.keys() {
            assert!(required.contains(&json!(name)), "{} not required", name);
        }
    }

    #[test]
    fn schemas_are_closed_for_strict_mode() {
        let faq = faq_schema().schema;
        assert_closed(&faq);
        assert_closed(&faq["properties"]["faqs"]["items"]);

        assert_closed(&seo_schema().schema);
    }
}
