//! Support-chat bridge to the Gemini completion service.
//!
//! The bridge is deliberately fail-soft: once a request body has parsed, the
//! endpoint always answers `success: true` with *some* response text. The
//! inner [`ChatClient`] returns a typed result; [`resolve_reply`] is the outer
//! boundary that maps any upstream failure to a canned message. Upstream
//! outages are therefore invisible to callers and only show up in logs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ChatConfig;

/// Fixed assistant scope prepended to every customer question.
pub const SYSTEM_CONTEXT: &str = "You are a helpful AI assistant for an ecommerce store named EStore. \
You help customers with:\n\
- Product information and recommendations\n\
- Order tracking and status\n\
- Shipping and delivery information\n\
- General customer service questions\n\
- Troubleshooting common issues\n\
- Pricing and discounts\n\n\
Keep responses concise (2-3 sentences), friendly, and professional. \
If you don't know something about the store, suggest they contact support.";

/// Returned when the upstream call fails outright.
pub const FALLBACK_OUTAGE: &str = "I'm experiencing a temporary issue. Please try again in a moment \
or contact our support team for immediate assistance.";

/// Returned when the upstream call succeeds but produces no usable text.
pub const FALLBACK_EMPTY: &str = "I'm here to help! Could you please rephrase your question or ask \
something about our products and services?";

const MAX_OUTPUT_TOKENS: u32 = 256;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl ChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends the composed prompt and returns the raw completion text, which
    /// may be empty when the model produced no candidates.
    pub async fn complete(&self, query: &str) -> Result<String, ChatError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: compose_prompt(query),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                temperature: TEMPERATURE,
            },
        };

        let response: GenerateResponse = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(extract_text(&response))
    }
}

pub fn compose_prompt(query: &str) -> String {
    format!("{SYSTEM_CONTEXT}\n\nCustomer Question: {query}")
}

fn extract_text(response: &GenerateResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| {
            c.parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

/// The outward-facing error boundary: every outcome becomes a reply string.
pub fn resolve_reply<E: std::fmt::Display>(result: Result<String, E>) -> String {
    match result {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => FALLBACK_EMPTY.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "completion service failed, serving fallback");
            FALLBACK_OUTAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_wraps_query_with_system_context() {
        let prompt = compose_prompt("Where is my order?");
        assert!(prompt.starts_with(SYSTEM_CONTEXT));
        assert!(prompt.ends_with("Customer Question: Where is my order?"));
    }

    #[test]
    fn successful_completion_is_trimmed() {
        assert_eq!(
            resolve_reply::<ChatError>(Ok("  Sure thing!  ".into())),
            "Sure thing!"
        );
    }

    #[test]
    fn empty_completion_falls_back_to_rephrase_prompt() {
        assert_eq!(resolve_reply::<ChatError>(Ok(String::new())), FALLBACK_EMPTY);
        assert_eq!(resolve_reply::<ChatError>(Ok("   \n".into())), FALLBACK_EMPTY);
    }

    #[test]
    fn upstream_failure_falls_back_to_outage_message() {
        let result: Result<String, &str> = Err("connection timed out");
        assert_eq!(resolve_reply(result), FALLBACK_OUTAGE);
    }

    #[test]
    fn degenerate_candidates_yield_empty_text() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_text(&response), "");

        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"content": null}]}"#).unwrap();
        assert_eq!(extract_text(&response), "");
    }

    #[test]
    fn candidate_parts_are_joined() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello"}, {"text": " there"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(&response), "Hello there");
    }
}
