use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::provider::{ImageData, ImageProvider, ProviderError};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

// Helper function to truncate base64 data in JSON for cleaner logging
fn truncate_base64_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "data" {
                    if let serde_json::Value::String(s) = val {
                        if s.len() > 100 && s.chars().all(|c| c.is_alphanumeric() || c == '+' || c == '/' || c == '=') {
                            *val = serde_json::Value::String(format!("{}...[truncated {} chars]", &s[..50], s.len() - 50));
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for val in arr.iter_mut() {
                truncate_base64_in_json(val);
            }
        }
        _ => {}
    }
}

fn loggable(body: &serde_json::Value) -> String {
    let mut copy = body.clone();
    truncate_base64_in_json(&mut copy);
    serde_json::to_string_pretty(&copy).unwrap_or_default()
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn request_body(prompt: &str, images: &[ImageData]) -> serde_json::Value {
        let mut parts = vec![json!({ "text": prompt })];
        parts.extend(images.iter().map(|image| {
            json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.to_base64(),
                }
            })
        }));

        json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "candidateCount": 1
            }
        })
    }

    async fn perform_api_call(&self, prompt: &str, images: &[ImageData]) -> Result<ImageData, ProviderError> {
        let url = format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, self.api_key);
        info!("🔗 Making request to: {}", url.replace(&self.api_key, "***"));

        let request_body = Self::request_body(prompt, images);
        info!("📤 Request body: {}", loggable(&request_body));

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string().replace(&self.api_key, "***")))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ API Error response: {}", error_body);
            return Err(ProviderError::Api { status: status.as_u16(), body: error_body });
        }

        let response_text = response.text().await.map_err(|e| ProviderError::Http(e.to_string()))?;
        let parsed: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::Other(format!("parse error: {}", e)))?;

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&response_text) {
            info!("📥 Raw Gemini API response: {}", loggable(&value));
        }

        let texts = collect_texts(&parsed);
        match extract_first_image(&parsed) {
            Some(inline) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(&inline.data)
                    .map_err(|e| ProviderError::Decode(e.to_string()))?;
                info!("🖼️ Extracted {} image from API response: {} bytes", inline.mime_type, bytes.len());
                Ok(ImageData::new(bytes, inline.mime_type.clone()))
            }
            None => {
                warn!("⚠️ No image data found in API response; model said: {}", texts.join(" "));
                Err(ProviderError::NoImage)
            }
        }
    }
}

#[async_trait]
impl ImageProvider for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn render(&self, prompt: &str, images: &[ImageData]) -> Result<ImageData, ProviderError> {
        info!("Generating image with Gemini API ({} reference images)...", images.len());
        let result = self.perform_api_call(prompt, images).await;
        match &result {
            Ok(image) => info!("✅ Successfully generated image: {} bytes", image.bytes.len()),
            Err(e) => error!("❌ Failed to generate image: {}", e),
        }
        result
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData
    },
    Text { text: String },
    Other(serde_json::Value)
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

fn extract_first_image(resp: &GeminiResponse) -> Option<&InlineData> {
    resp.candidates
        .iter()
        .flat_map(|c| c.content.parts.iter())
        .find_map(|p| match p {
            Part::Inline { inline_data } => Some(inline_data),
            _ => None,
        })
}

fn collect_texts(resp: &GeminiResponse) -> Vec<&str> {
    resp.candidates
        .iter()
        .flat_map(|c| c.content.parts.iter())
        .filter_map(|p| match p {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::post, Json, Router};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn request_puts_prompt_before_images() {
        let images = [
            ImageData::new(vec![1u8, 2, 3], "image/png"),
            ImageData::new(vec![4u8, 5, 6], "image/jpeg"),
        ];
        let body = GeminiClient::request_body("make a mug", &images);
        let parts = body["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["text"], "make a mug");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
        assert_eq!(parts[2]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["TEXT", "IMAGE"]));
    }

    #[test]
    fn long_base64_is_truncated_for_logs() {
        let mut value = json!({ "parts": [{ "inlineData": { "data": "A".repeat(500), "mimeType": "image/png" } }] });
        truncate_base64_in_json(&mut value);
        let data = value["parts"][0]["inlineData"]["data"].as_str().unwrap();
        assert!(data.ends_with("...[truncated 450 chars]"));
        assert_eq!(value["parts"][0]["inlineData"]["mimeType"], "image/png");
    }

    #[test]
    fn response_parts_are_classified() {
        let parsed: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here is your mockup." },
                { "inlineData": { "mimeType": "image/png", "data": "AQID" } },
                { "thoughtSignature": "xyz" }
            ]}}]
        }))
        .unwrap();

        assert_eq!(collect_texts(&parsed), vec!["Here is your mockup."]);
        assert_eq!(extract_first_image(&parsed).map(|i| i.data.as_str()), Some("AQID"));
    }

    async fn spawn_mock(reply: serde_json::Value, status: StatusCode) -> String {
        let reply = Arc::new(reply);
        let app = Router::new().route(
            "/models/:call",
            post(move |Path(call): Path<String>, Json(body): Json<serde_json::Value>| {
                let reply = reply.clone();
                async move {
                    assert_eq!(call, "test-model:generateContent");
                    assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt");
                    (status, Json((*reply).clone()))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn render_decodes_inline_image() {
        let base = spawn_mock(
            json!({ "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "AQID" } }
            ]}}]}),
            StatusCode::OK,
        )
        .await;
        let client = GeminiClient::new("secret".into(), base, "test-model".into());

        let image = client.render("prompt", &[]).await.unwrap();
        assert_eq!(image.bytes.as_ref(), &[1u8, 2, 3]);
        assert_eq!(image.mime_type, "image/png");
    }

    #[tokio::test]
    async fn render_reports_missing_image_and_api_errors() {
        let text_only = spawn_mock(
            json!({ "candidates": [{ "content": { "parts": [{ "text": "I cannot do that." }] }}]}),
            StatusCode::OK,
        )
        .await;
        let client = GeminiClient::new("secret".into(), text_only, "test-model".into());
        assert!(matches!(client.render("prompt", &[]).await, Err(ProviderError::NoImage)));

        let failing = spawn_mock(json!({ "error": { "message": "quota" } }), StatusCode::TOO_MANY_REQUESTS).await;
        let client = GeminiClient::new("secret".into(), failing, "test-model".into());
        match client.render("prompt", &[]).await {
            Err(ProviderError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("quota"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
