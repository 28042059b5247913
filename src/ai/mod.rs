//! AI service integration for image description
//!
//! Provides the vision service seam and its Gemini `generateContent`
//! implementation.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiVisionClient;
pub use mock::MockVisionClient;

use crate::models::ImageInput;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait VisionService: Send + Sync {
    /// Returns the text of the first candidate for one image and prompt.
    async fn describe_image(&self, input: &ImageInput) -> Result<String>;
}

#[async_trait]
impl<T: VisionService + ?Sized> VisionService for Arc<T> {
    async fn describe_image(&self, input: &ImageInput) -> Result<String> {
        (**self).describe_image(input).await
    }
}
