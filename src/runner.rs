//! The prompt-to-image pipeline: one request, one write.

use crate::config::{Credential, Destination};
use crate::error::{PicGenError, Result};
use crate::image::{
    GeneratedImage, GenerationRequest, GenerationResponse, ImageService, DEFAULT_MODEL,
};
use crate::sink;
use std::io::Write;

/// How the runner treats the number of images in a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cardinality {
    /// Write the first image; zero images writes nothing and still succeeds.
    #[default]
    FirstOnly,
    /// Anything other than exactly one image is a protocol error.
    ExactlyOne,
}

/// Settings for a [`Runner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Response cardinality policy.
    pub cardinality: Cardinality,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            cardinality: Cardinality::default(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Images the service returned.
    pub images_received: usize,
    /// Bytes written to the destination.
    pub bytes_written: usize,
}

/// Sends one prompt to an image service and writes the result.
pub struct Runner<S> {
    service: S,
    config: RunConfig,
}

impl<S: ImageService> Runner<S> {
    /// Creates a runner over an already constructed service.
    pub fn new(service: S, config: RunConfig) -> Self {
        Self { service, config }
    }

    /// Resolves the credential first, then builds the service with it.
    ///
    /// `connect` is never called when the credential is missing.
    pub fn connect(
        credential: Result<Credential>,
        config: RunConfig,
        connect: impl FnOnce(Credential) -> Result<S>,
    ) -> Result<Self> {
        let service = connect(credential?)?;
        Ok(Self::new(service, config))
    }

    /// The underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Requests images for `prompt` and applies the cardinality policy.
    ///
    /// Returns the image to write, if any, and how many were received.
    pub async fn fetch(&self, prompt: &str) -> Result<(Option<GeneratedImage>, usize)> {
        let request = GenerationRequest::new(prompt).with_model(&self.config.model);
        tracing::debug!(service = self.service.name(), model = %request.model, "requesting image");

        let response: GenerationResponse = self.service.generate_images(&request).await?;
        let received = response.len();

        match self.config.cardinality {
            Cardinality::ExactlyOne if received != 1 => {
                return Err(PicGenError::UnexpectedImageCount(received));
            }
            Cardinality::FirstOnly if received > 1 => {
                tracing::debug!(received, "using first image, discarding the rest");
            }
            Cardinality::FirstOnly if received == 0 => {
                tracing::warn!("image service returned no images; nothing will be written");
            }
            _ => {}
        }

        let image = response.into_first();
        if let Some(image) = &image {
            tracing::debug!(received, bytes = image.size(), "image received");
        }
        Ok((image, received))
    }

    /// Runs the pipeline against a destination.
    ///
    /// The destination is only opened when there is an image to write.
    pub async fn run(&self, prompt: &str, destination: &Destination) -> Result<RunReport> {
        let (image, images_received) = self.fetch(prompt).await?;
        let bytes_written = match image {
            Some(image) => sink::write_image(destination, &image.data)?,
            None => 0,
        };
        Ok(RunReport {
            images_received,
            bytes_written,
        })
    }

    /// Runs the pipeline into an arbitrary writer.
    pub async fn run_into<W: Write + ?Sized>(
        &self,
        prompt: &str,
        writer: &mut W,
    ) -> Result<RunReport> {
        let (image, images_received) = self.fetch(prompt).await?;
        let bytes_written = match image {
            Some(image) => sink::write_bytes(writer, &image.data)?,
            None => 0,
        };
        Ok(RunReport {
            images_received,
            bytes_written,
        })
    }
}
