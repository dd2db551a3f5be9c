#![warn(missing_docs)]
//! picgen - turn a text prompt into a picture with Google Imagen.
//!
//! One prompt, one request, one image written to standard output or a file.
//! With the `signal-bot` feature the same pipeline answers `/pic <prompt>`
//! messages in Signal groups.
//!
//! # Quick Start
//!
//! ```no_run
//! use picgen::{Credential, Destination, ImagenProvider, RunConfig, Runner};
//!
//! #[tokio::main]
//! async fn main() -> picgen::Result<()> {
//!     let runner = Runner::connect(Credential::from_env(), RunConfig::default(), ImagenProvider::new)?;
//!     let report = runner
//!         .run("A golden retriever puppy", &Destination::default_file())
//!         .await?;
//!     println!("wrote {} bytes", report.bytes_written);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `signal-bot`: Signal group bot driving `signal-cli`
//! - `cli`: the `picgen` command-line interface

mod config;
mod error;
pub mod image;
pub mod runner;
pub mod sink;

#[cfg(feature = "signal-bot")]
pub mod bot;

pub use config::{
    Credential, Destination, PromptSource, CREDENTIAL_ENV_VAR, DEFAULT_OUTPUT_FILE, DEFAULT_PROMPT,
};
pub use error::{parse_retry_after, sanitize_error_message, ErrorKind, PicGenError, Result};
pub use image::providers::{ImagenProvider, ImagenProviderBuilder};
pub use image::{GeneratedImage, GenerationRequest, GenerationResponse, ImageService};
pub use runner::{Cardinality, RunConfig, RunReport, Runner};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{Credential, Destination, PromptSource};
    pub use crate::error::{ErrorKind, PicGenError, Result};
    pub use crate::image::providers::ImagenProvider;
    pub use crate::image::{GeneratedImage, GenerationRequest, GenerationResponse, ImageService};
    pub use crate::runner::{Cardinality, RunConfig, Runner};

    #[cfg(feature = "signal-bot")]
    pub use crate::bot::{BotConfig, SignalBot};
}
