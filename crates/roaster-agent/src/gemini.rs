//! Google Gemini (Generative Language API) provider.
//!
//! Auth is a static API key passed as the `key` query parameter. One
//! `generateContent` call per request; the composed prompt travels as a single
//! text part and the answer is read from `candidates[0].content.parts[0].text`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    /// `base_url` defaults to the public endpoint; `timeout` of `None` keeps
    /// the transport default.
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let base_url = base_url
            .unwrap_or_else(|| roaster_core::config::DEFAULT_GEMINI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: builder.build()?,
            api_key,
            base_url,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

fn build_body(req: &ChatRequest) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [{ "text": req.prompt }]
        }]
    })
}

/// Strip the request URL from transport errors: it carries the API key.
fn redact(e: reqwest::Error) -> ProviderError {
    ProviderError::Transport(e.without_url())
}

/// Pull the reply text out of a 200 body.
fn parse_body(body: &str) -> Result<ChatResponse, ProviderError> {
    let resp: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("invalid JSON body: {e}")))?;

    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("response has no candidates".to_string()))?;

    let content = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| {
            ProviderError::Malformed("candidate has no content.parts[0].text".to_string())
        })?;

    let usage = resp.usage_metadata.unwrap_or_default();
    Ok(ChatResponse {
        content,
        tokens_in: usage.prompt_token_count,
        tokens_out: usage.candidates_token_count,
        finish_reason: candidate.finish_reason.unwrap_or_default(),
    })
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = self.endpoint(&req.model);
        let body = build_body(req);

        debug!(
            model = %req.model,
            prompt_chars = req.prompt.chars().count(),
            "sending request to Gemini"
        );

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(redact)?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(redact)?;

        if status != 200 {
            warn!(status, body = %text, "Gemini API error");
            return Err(ProviderError::Status { status, body: text });
        }

        parse_body(&text)
    }
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<Usage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Usage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> ChatRequest {
        ChatRequest {
            model: "gemini-2.5-flash".to_string(),
            prompt: prompt.to_string(),
        }
    }

    #[test]
    fn body_wraps_prompt_in_single_part() {
        let body = build_body(&request("Привіт"));
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "Привіт"}]}]})
        );
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let p = GeminiProvider::new("k".into(), Some("http://localhost:9/".into()), None).unwrap();
        assert_eq!(
            p.endpoint("gemini-2.5-flash"),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn parses_first_part_and_usage() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Hello"}, {"text": " ignored"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3, "totalTokenCount": 15}
        }"#;
        let resp = parse_body(body).unwrap();
        assert_eq!(resp.content, "Hello");
        assert_eq!(resp.tokens_in, 12);
        assert_eq!(resp.tokens_out, 3);
        assert_eq!(resp.finish_reason, "STOP");
    }

    #[test]
    fn minimal_body_is_enough() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#;
        let resp = parse_body(body).unwrap();
        assert_eq!(resp.content, "Hello");
        assert_eq!(resp.tokens_in, 0);
        assert_eq!(resp.finish_reason, "");
    }

    #[test]
    fn empty_candidates_is_malformed() {
        let err = parse_body(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn blocked_candidate_without_content_is_malformed() {
        let err = parse_body(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_body("<html>oops</html>").unwrap_err();
        assert_eq!(err.code(), "MALFORMED_RESPONSE");
    }
}
