//! Image generation providers.

mod imagen;

pub use imagen::{ImagenProvider, ImagenProviderBuilder, DEFAULT_BASE_URL};
