//! Image description orchestration: read, encode, ask, extract.

use crate::ai::mime::resolve_mime;
use crate::ai::{GeminiVisionClient, VisionService};
use crate::models::{Config, ImageInput};
use crate::prompts;
use crate::source::{FsImageSource, ImageSource};
use crate::Result;
use std::path::Path;
use tracing::info;

/// Reads one image through an [`ImageSource`] and asks a [`VisionService`] about it.
pub struct ImageDescriber {
    source: Box<dyn ImageSource>,
    vision: Box<dyn VisionService>,
    prompt: String,
    mime_type: Option<String>,
}

impl ImageDescriber {
    /// Build a describer from concrete dependencies.
    ///
    /// Tests and harnesses use this to inject mocks.
    pub fn with_services(source: Box<dyn ImageSource>, vision: Box<dyn VisionService>) -> Self {
        Self {
            source,
            vision,
            prompt: prompts::DESCRIBE_IMAGE.to_string(),
            mime_type: None,
        }
    }

    /// Filesystem reader plus Gemini client, as configured by `config`.
    pub fn from_config(config: &Config) -> Self {
        info!("Vision provider: Gemini (model: {})", config.model);

        let describer = Self::with_services(
            Box::new(FsImageSource),
            Box::new(GeminiVisionClient::from_config(config)),
        );
        match &config.prompt {
            Some(prompt) => describer.with_prompt(prompt.clone()),
            None => describer,
        }
    }

    pub fn with_prompt(mut self, prompt: String) -> Self {
        self.prompt = prompt;
        self
    }

    /// Send this MIME type instead of detecting one from the file.
    pub fn with_mime_type(mut self, mime_type: String) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    /// Describe the image at `image_path`.
    ///
    /// Read failures and content that is not a recognized image return before
    /// any request is sent. Exactly one request is made otherwise; nothing is
    /// retried.
    pub async fn describe(&self, image_path: &Path) -> Result<String> {
        let bytes = self.source.read_image(image_path).await?;

        let mime_type = match &self.mime_type {
            Some(mime) => mime.clone(),
            None => resolve_mime(image_path, &bytes)?.to_string(),
        };
        info!(
            "Describing {} ({} bytes, {})",
            image_path.display(),
            bytes.len(),
            mime_type
        );

        let input = ImageInput::new(mime_type, bytes, self.prompt.clone())?;
        self.vision.describe_image(&input).await
    }
}
