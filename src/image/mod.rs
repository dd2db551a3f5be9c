//! Image generation module.

mod provider;
pub mod providers;
mod types;

pub use provider::ImageService;
pub use types::{GeneratedImage, GenerationRequest, GenerationResponse, DEFAULT_MODEL};
