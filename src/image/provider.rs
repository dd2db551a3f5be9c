//! Image service trait.

use crate::error::Result;
use crate::image::types::{GenerationRequest, GenerationResponse};
use async_trait::async_trait;

/// A remote service that turns prompts into images.
///
/// Implementations perform exactly one round trip per call and never retry.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Generates images for the given request.
    async fn generate_images(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Returns the name of this service for display.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ImageService + ?Sized> ImageService for Box<T> {
    async fn generate_images(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        (**self).generate_images(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
