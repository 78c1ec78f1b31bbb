//! REST client for the Gemini `generateContent` endpoint.
//!
//! Wraps a single multimodal call (text prompt + inline image) using
//! [`reqwest`] and flattens the reply into plain text.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GeminiConfig;
use crate::image::InlineImage;
use crate::model::VisionModel;

/// HTTP client for one Gemini model.
pub struct GeminiApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// Errors from the vision REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum VisionApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Vision API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered but produced no text (e.g. safety block).
    #[error("Vision API returned no text{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    EmptyResponse { reason: Option<String> },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiApi {
    /// Build a client from configuration, applying the request timeout.
    pub fn new(config: &GeminiConfig) -> Result<Self, VisionApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &GeminiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` and `image` and return the concatenated reply text.
    pub async fn generate_content(
        &self,
        prompt: &str,
        image: &InlineImage,
    ) -> Result<String, VisionApiError> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    { "inline_data": { "mime_type": image.mime_type, "data": image.data } },
                ]
            }]
        });

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: GenerateContentResponse = Self::parse_response(response).await?;
        let text = reply_text(&parsed);

        tracing::debug!(model = %self.model, chars = text.len(), "Vision model replied");

        if text.trim().is_empty() {
            return Err(VisionApiError::EmptyResponse {
                reason: empty_reason(&parsed),
            });
        }
        Ok(text)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`VisionApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, VisionApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VisionApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, VisionApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl VisionModel for GeminiApi {
    async fn generate(&self, prompt: &str, image: &InlineImage) -> Result<String, VisionApiError> {
        self.generate_content(prompt, image).await
    }
}

/// Text of the first candidate, all parts joined.
fn reply_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

fn empty_reason(response: &GenerateContentResponse) -> Option<String> {
    response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
        .or_else(|| {
            response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn joins_parts_of_first_candidate() {
        let r = parse(serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "```json\n" }, { "text": "{\"a\":1}\n```" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        }));
        assert_eq!(reply_text(&r), "```json\n{\"a\":1}\n```");
    }

    #[test]
    fn blocked_prompt_has_reason() {
        let r = parse(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }));
        assert_eq!(reply_text(&r), "");
        assert_eq!(empty_reason(&r).as_deref(), Some("SAFETY"));
    }

    #[test]
    fn finish_reason_used_when_no_feedback() {
        let r = parse(serde_json::json!({
            "candidates": [ { "finishReason": "RECITATION" } ]
        }));
        assert_eq!(empty_reason(&r).as_deref(), Some("RECITATION"));
    }

    #[test]
    fn error_display() {
        let err = VisionApiError::ApiError {
            status: 429,
            body: "quota".into(),
        };
        assert_eq!(err.to_string(), "Vision API error (429): quota");
        let empty = VisionApiError::EmptyResponse {
            reason: Some("SAFETY".into()),
        };
        assert_eq!(empty.to_string(), "Vision API returned no text (SAFETY)");
        let bare = VisionApiError::EmptyResponse { reason: None };
        assert_eq!(bare.to_string(), "Vision API returned no text");
    }

    #[test]
    fn client_builds_from_config() {
        let config = GeminiConfig {
            api_key: "k".into(),
            model: "gemini-1.5-flash".into(),
            base_url: "http://localhost:9".into(),
            timeout: std::time::Duration::from_secs(1),
        };
        let api = GeminiApi::new(&config).unwrap();
        assert_eq!(api.model(), "gemini-1.5-flash");
    }
}
