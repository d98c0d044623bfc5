use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: status={status} body={body}")]
    Api { status: u16, body: String },
    #[error("no image data in response")]
    NoImage,
    #[error("invalid image payload: {0}")]
    Decode(String),
    #[error("no images generated after {0} attempt(s)")]
    Exhausted(usize),
    #[error("Other: {0}")]
    Other(String),
}

/// Raw image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl ImageData {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self { bytes: bytes.into(), mime_type: mime_type.into() }
    }

    /// Detects the MIME type from magic bytes, defaulting to PNG.
    pub fn sniff(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let mime_type = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("image/png");
        Self::new(bytes, mime_type)
    }

    /// Accepts either a `data:<mime>;base64,<payload>` URL or bare base64.
    pub fn from_data_url(input: &str) -> Result<Self, ProviderError> {
        let input = input.trim();
        let (declared, payload) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| ProviderError::Decode("data URL without payload".into()))?;
                let mime = header.trim_end_matches(";base64");
                (Some(mime).filter(|m| !m.is_empty()), payload)
            }
            None => (None, input),
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ProviderError::Decode("empty image payload".into()));
        }

        let mime_type = match image::guess_format(&bytes) {
            Ok(format) => format.to_mime_type().to_string(),
            Err(_) => declared.unwrap_or("image/png").to_string(),
        };
        Ok(Self::new(bytes, mime_type))
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// A backend that turns one prompt plus ordered reference images into one image.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    /// The prompt is sent first, followed by `images` in order.
    async fn render(&self, prompt: &str, images: &[ImageData]) -> Result<ImageData, ProviderError>;
}

/// Offline stand-in used when no API key is configured.
pub struct PlaceholderProvider;

const PLACEHOLDER_COLORS: [[u8; 3]; 5] = [
    [0x3B, 0x82, 0xF6],
    [0xEF, 0x44, 0x44],
    [0x10, 0xB9, 0x81],
    [0xF5, 0x9E, 0x0B],
    [0x8B, 0x5C, 0xF6],
];

impl PlaceholderProvider {
    fn placeholder_png(prompt: &str) -> Result<Vec<u8>, ProviderError> {
        let [r, g, b] = PLACEHOLDER_COLORS[prompt.len() % PLACEHOLDER_COLORS.len()];
        let transparent = prompt.contains("alpha channel");
        let (width, height) = (512u32, 512u32);

        // Diagonal fade from full color to 60% opacity.
        let img = RgbaImage::from_fn(width, height, |x, y| {
            let t = (x + y) as f32 / (width + height) as f32;
            let alpha = if transparent && (x < 64 || y < 64 || x >= width - 64 || y >= height - 64) {
                0
            } else {
                (255.0 * (1.0 - 0.4 * t)) as u8
            };
            Rgba([r, g, b, alpha])
        });

        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| ProviderError::Other(e.to_string()))?;
        Ok(buf.into_inner())
    }
}

#[async_trait]
impl ImageProvider for PlaceholderProvider {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn render(&self, prompt: &str, images: &[ImageData]) -> Result<ImageData, ProviderError> {
        info!("Using demo mode - no real images generated ({} reference images)", images.len());
        let png = Self::placeholder_png(prompt)?;
        info!("📦 Generated placeholder image: {} bytes", png.len());
        Ok(ImageData::new(png, "image/png"))
    }
}

/// Picks the image backend once at startup.
pub fn from_config(config: &Config) -> Arc<dyn ImageProvider> {
    let gemini = || -> Arc<dyn ImageProvider> {
        match &config.gemini_api_key {
            Some(key) => Arc::new(GeminiClient::new(
                key.clone(),
                config.gemini_api_base.clone(),
                config.gemini_model.clone(),
            )),
            None => {
                warn!("GEMINI_API_KEY is not set, falling back to placeholder images");
                Arc::new(PlaceholderProvider)
            }
        }
    };

    match config.ai_provider.as_str() {
        "gemini" | "gemini-2.5-flash-image" => gemini(),
        "placeholder" => Arc::new(PlaceholderProvider),
        other => {
            warn!("Unknown AI provider '{}', using Gemini", other);
            gemini()
        }
    }
}
