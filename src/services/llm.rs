//! Client for an OpenAI-compatible chat-completions API.
//!
//! Only structured calls are needed: every request carries a JSON schema
//! as a strict `response_format`, and the assistant message is parsed into the
//! caller's type.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Value, json};

/// Failures of an LLM call. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no message content")]
    EmptyResponse,

    #[error("response did not match the schema: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A named JSON schema the completion must conform to.
#[derive(Debug, Clone)]
pub struct JsonSchema {
    pub name: &'static str,
    pub schema: Value,
}

/// Chat messages of a single structured call.
#[derive(Debug, Clone)]
pub struct StructuredPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    auth_header: String,
    base_url: String,
}

impl LlmClient {
    /// `http` should carry the configured timeout; it is shared with page fetching.
    pub fn new(http: reqwest::Client, api_key: &str, base_url: &str) -> Self {
        Self {
            http,
            auth_header: format!("Bearer {}", api_key),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Run one schema-constrained completion and deserialize the answer.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        model: &str,
        prompt: &StructuredPrompt,
        schema: &JsonSchema,
    ) -> Result<T, LlmError> {
        let body = build_request(model, prompt, schema);

        let response = self
            .http
            .post(self.chat_completions_url())
            .header("Authorization", &self.auth_header)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: Value = response.json().await?;
        tracing::debug!(model, schema = schema.name, "LLM completion received");

        parse_structured(completion)
    }
}

fn build_request(model: &str, prompt: &StructuredPrompt, schema: &JsonSchema) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": prompt.system },
            { "role": "user", "content": prompt.user },
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "strict": true,
                "schema": schema.schema,
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extract the first choice's content and parse it as `T`.
fn parse_structured<T: DeserializeOwned>(completion: Value) -> Result<T, LlmError> {
    let completion: ChatCompletion = serde_json::from_value(completion)?;

    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)?;

    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        value: i32,
    }

    fn schema() -> JsonSchema {
        JsonSchema {
            name: "answer",
            schema: json!({
                "type": "object",
                "properties": { "value": { "type": "number" } },
                "required": ["value"],
                "additionalProperties": false
            }),
        }
    }

    #[test]
    fn request_carries_schema_and_messages() {
        let prompt = StructuredPrompt {
            system: "sys".to_string(),
            user: "usr".to_string(),
        };

        let body = build_request("gpt-4o-mini", &prompt, &schema());

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "answer");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(
            body["response_format"]["json_schema"]["schema"]["required"][0],
            "value"
        );
    }

    #[test]
    fn parses_first_choice_content() {
        let completion = json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "{\"value\": 42}" } },
                { "index": 1, "message": { "role": "assistant", "content": "{\"value\": 7}" } }
            ]
        });

        let answer: Answer = parse_structured(completion).unwrap();
        assert_eq!(answer, Answer { value: 42 });
    }

    #[test]
    fn missing_content_is_an_error() {
        let no_choices = json!({ "choices": [] });
        assert!(matches!(
            parse_structured::<Answer>(no_choices),
            Err(LlmError::EmptyResponse)
        ));

        let null_content = json!({ "choices": [{ "message": { "content": null } }] });
        assert!(matches!(
            parse_structured::<Answer>(null_content),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_content_is_an_error() {
        let completion = json!({ "choices": [{ "message": { "content": "not json" } }] });

        assert!(matches!(
            parse_structured::<Answer>(completion),
            Err(LlmError::InvalidJson(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let client = LlmClient::new(reqwest::Client::new(), "sk", "http://localhost:8080/");

        assert_eq!(
            client.chat_completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }
}
