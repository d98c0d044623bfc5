use std::sync::Arc;

use tracing::{error, info};

use crate::prompt::{build_inpaint_prompt, build_prompt, build_upscale_prompt, EditType, GenerationMode, GenerationSettings};
use crate::provider::{ImageData, ImageProvider, ProviderError};

/// Turns user requests into prompts and drives the configured image provider.
pub struct ImageGenerator {
    provider: Arc<dyn ImageProvider>,
}

impl ImageGenerator {
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Calls the provider `count` times with the same prompt and inputs.
    ///
    /// Failed attempts are logged and skipped; the call only fails when no
    /// attempt produced an image.
    pub async fn generate(
        &self,
        mode: GenerationMode,
        settings: &GenerationSettings,
        inputs: &[ImageData],
        count: usize,
    ) -> Result<Vec<ImageData>, ProviderError> {
        let prompt = build_prompt(mode, settings);
        info!(
            "🎯 Generating {} image(s) in mode '{}' with prompt (truncated): {}",
            count,
            mode.as_str(),
            prompt.chars().take(120).collect::<String>()
        );

        let mut images = Vec::with_capacity(count);
        for attempt in 1..=count {
            match self.provider.render(&prompt, inputs).await {
                Ok(image) => images.push(image),
                Err(e) => error!("❌ Attempt {}/{} failed: {}", attempt, count, e),
            }
        }

        if images.is_empty() {
            return Err(ProviderError::Exhausted(count));
        }
        info!("✅ Generated {}/{} image(s)", images.len(), count);
        Ok(images)
    }

    /// The mask is sent as the second image.
    pub async fn inpaint(
        &self,
        image: ImageData,
        mask: ImageData,
        edit_type: EditType,
        instruction: &str,
    ) -> Result<ImageData, ProviderError> {
        let prompt = format!(
            "Inpaint the masked area of this image. {}",
            build_inpaint_prompt(edit_type, instruction)
        );
        info!("🖌️ Inpainting ({:?})", edit_type);
        self.provider.render(&prompt, &[image, mask]).await
    }

    pub async fn upscale(
        &self,
        image: ImageData,
        resolution: u32,
        transparent_background: bool,
    ) -> Result<ImageData, ProviderError> {
        let prompt = build_upscale_prompt(resolution, transparent_background);
        info!("🔍 Upscaling to {}x{}", resolution, resolution);
        self.provider.render(&prompt, &[image]).await
    }
}
