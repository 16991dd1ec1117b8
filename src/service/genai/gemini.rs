//! Gemini implementation of the generative-AI service.
//!
//! A thin wrapper over the `generateContent` REST endpoint. Inline image
//! data crosses the wire base64-encoded; this module owns the translation
//! in both directions so callers only ever see raw bytes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::base::{
    config::Config,
    types::Res,
};

use super::{GenAiClient, GenericGenAiClient, ReferenceImage};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// Extra methods on `GenAiClient` applied by the gemini implementation.

impl GenAiClient {
    pub fn gemini(config: &Config) -> Self {
        let client = GeminiGenAiClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl Part {
    fn text(text: String) -> Self {
        Self { text: Some(text), ..Default::default() }
    }

    fn inline(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: BASE64.encode(bytes),
            }),
            ..Default::default()
        }
    }
}

impl GenerateContentRequest {
    fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content { parts }],
        }
    }
}

/// Concatenate every text part of the first candidate.
fn collect_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| content.parts.iter().filter_map(|p| p.text.as_deref()).collect::<Vec<_>>().join(""))
        .unwrap_or_default()
}

/// Decode the first inline image of the first candidate, if any.
fn first_inline_image(response: &GenerateContentResponse) -> Res<Option<Vec<u8>>> {
    let Some(content) = response.candidates.first().and_then(|c| c.content.as_ref()) else {
        return Ok(None);
    };

    for part in &content.parts {
        if let Some(inline) = &part.inline_data {
            let bytes = BASE64.decode(&inline.data)?;
            return Ok(Some(bytes));
        }
    }

    Ok(None)
}

// Specific implementations.

/// Gemini generative-AI client implementation.
#[derive(Clone)]
pub struct GeminiGenAiClient {
    http: reqwest::Client,
    config: Config,
}

impl GeminiGenAiClient {
    /// Create a new Gemini client.
    #[instrument(name = "GeminiGenAiClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{GEMINI_API_BASE}/{model}:generateContent")
    }

    /// Helper function to make Gemini API calls with retry logic and timeout handling.
    async fn call_gemini_api(&self, model: &str, request: &GenerateContentRequest) -> Res<GenerateContentResponse> {
        const MAX_RETRIES: u32 = 3;
        const TIMEOUT: u64 = 120; // Image models can be slow.
        const RETRY_DELAY_MS: u64 = 1000;

        if self.config.gemini_api_key.is_empty() {
            return Err(anyhow::anyhow!("GEMINI_API_KEY is not set."));
        }

        let mut retries = 0;

        loop {
            let call = self
                .http
                .post(self.endpoint(model))
                .header("x-goog-api-key", &self.config.gemini_api_key)
                .json(request)
                .send();

            let result = timeout(Duration::from_secs(TIMEOUT), call).await;

            let failure = match result {
                Ok(Ok(response)) if response.status().is_success() => {
                    info!("Gemini API call succeeded after {} attempts", retries + 1);
                    return Ok(response.json().await?);
                }
                Ok(Ok(response)) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    format!("Gemini API returned {status}: {body}")
                }
                Ok(Err(err)) => format!("Gemini API call failed: {err}"),
                Err(_) => "Gemini API call timed out".to_string(),
            };

            if retries >= MAX_RETRIES {
                return Err(anyhow::anyhow!("{failure} (after {MAX_RETRIES} retries)"));
            }
            retries += 1;
            warn!("{failure}, retrying {retries}/{MAX_RETRIES}");

            // Exponential backoff between attempts.
            let delay = Duration::from_millis(RETRY_DELAY_MS * 2_u64.pow(retries - 1));
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl GenericGenAiClient for GeminiGenAiClient {
    #[instrument(name = "GeminiGenAiClient::generate_text", skip_all)]
    async fn generate_text(&self, prompt: &str) -> Res<String> {
        let request = GenerateContentRequest::from_parts(vec![Part::text(prompt.to_string())]);

        let response = self.call_gemini_api(&self.config.gemini_text_model, &request).await?;

        Ok(collect_text(&response))
    }

    #[instrument(name = "GeminiGenAiClient::generate_image", skip_all)]
    async fn generate_image(&self, prompt: &str) -> Res<Option<Vec<u8>>> {
        let request = GenerateContentRequest::from_parts(vec![Part::text(prompt.to_string())]);

        let response = self.call_gemini_api(&self.config.gemini_image_model, &request).await?;

        first_inline_image(&response)
    }

    #[instrument(name = "GeminiGenAiClient::generate_with_image", skip_all)]
    async fn generate_with_image(&self, prompt: &str, image: &[u8], mime_type: &str) -> Res<String> {
        let request = GenerateContentRequest::from_parts(vec![Part::inline(mime_type, image), Part::text(prompt.to_string())]);

        let response = self.call_gemini_api(&self.config.gemini_text_model, &request).await?;

        Ok(collect_text(&response))
    }

    #[instrument(name = "GeminiGenAiClient::generate_image_from_reference", skip_all)]
    async fn generate_image_from_reference(&self, prompt: &str, references: &[ReferenceImage]) -> Res<Option<Vec<u8>>> {
        let mut parts: Vec<Part> = references.iter().map(|r| Part::inline(&r.mime_type, &r.bytes)).collect();
        parts.push(Part::text(prompt.to_string()));

        let request = GenerateContentRequest::from_parts(parts);

        let response = self.call_gemini_api(&self.config.gemini_image_model, &request).await?;

        first_inline_image(&response)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_text_joins_text_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"こんにちは"},{"text":"世界"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(collect_text(&response), "こんにちは世界");
    }

    #[test]
    fn collect_text_empty_on_no_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();

        assert_eq!(collect_text(&response), "");
    }

    #[test]
    fn first_inline_image_decodes_base64() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"aGVsbG8="}}]}}]}"#,
        )
        .unwrap();

        assert_eq!(first_inline_image(&response).unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn first_inline_image_none_when_text_only() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"no image today"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(first_inline_image(&response).unwrap(), None);
    }

    #[test]
    fn request_serializes_inline_data_camel_case() {
        let request = GenerateContentRequest::from_parts(vec![Part::inline("image/png", b"ab"), Part::text("caption".to_string())]);

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["data"], "YWI=");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "caption");
        assert!(json["contents"][0]["parts"][1].get("inlineData").is_none());
    }
}
