//! Core types for image generation.

use serde::{Deserialize, Serialize};

/// Default Imagen model identifier.
pub const DEFAULT_MODEL: &str = "imagen-3.0-generate-002";

/// A request to generate images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier, e.g. `imagen-3.0-generate-002`.
    pub model: String,
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// How many images the service should return.
    pub number_of_images: u32,
}

impl GenerationRequest {
    /// Creates a request for one image from the default model.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: prompt.into(),
            number_of_images: 1,
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// A generated image: raw encoded bytes as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Raw image bytes (typically PNG).
    pub data: Vec<u8>,
    /// MIME type reported by the service, if any.
    pub mime_type: Option<String>,
}

impl GeneratedImage {
    /// Wraps image bytes without a reported MIME type.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            mime_type: None,
        }
    }

    /// Sets the reported MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// MIME type to label the bytes with, `image/png` when unknown.
    pub fn mime_type_or_png(&self) -> &str {
        self.mime_type.as_deref().unwrap_or("image/png")
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type_or_png(), self.to_base64())
    }
}

/// The service's answer to one [`GenerationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "generated images should be written somewhere"]
pub struct GenerationResponse {
    /// Generated images, in service order. May be empty.
    pub generated_images: Vec<GeneratedImage>,
}

impl GenerationResponse {
    /// Creates a response from a list of images.
    pub fn new(generated_images: Vec<GeneratedImage>) -> Self {
        Self { generated_images }
    }

    /// Number of images returned.
    pub fn len(&self) -> usize {
        self.generated_images.len()
    }

    /// True when the service returned no images.
    pub fn is_empty(&self) -> bool {
        self.generated_images.is_empty()
    }

    /// Takes the first image, dropping the rest.
    pub fn into_first(self) -> Option<GeneratedImage> {
        self.generated_images.into_iter().next()
    }
}
