//! Imagen (Google) image generation provider.

use crate::config::Credential;
use crate::error::{parse_retry_after, sanitize_error_message, PicGenError, Result};
use crate::image::provider::ImageService;
use crate::image::types::{GeneratedImage, GenerationRequest, GenerationResponse};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Builder for ImagenProvider.
#[derive(Debug, Clone, Default)]
pub struct ImagenProviderBuilder {
    credential: Option<Credential>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ImagenProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credential used for every request.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Overrides the API root, e.g. to point at a local mock.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a whole-request timeout. Unset means the client default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the provider.
    pub fn build(self) -> Result<ImagenProvider> {
        let credential = self
            .credential
            .ok_or(PicGenError::MissingCredential(crate::config::CREDENTIAL_ENV_VAR))?;

        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(ImagenProvider {
            client: client.build()?,
            credential,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Imagen image generation provider.
pub struct ImagenProvider {
    client: reqwest::Client,
    credential: Credential,
    base_url: String,
}

impl ImagenProvider {
    /// Creates a new `ImagenProviderBuilder`.
    pub fn builder() -> ImagenProviderBuilder {
        ImagenProviderBuilder::new()
    }

    /// Shorthand for a provider with default settings.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::builder().credential(credential).build()
    }

    fn predict_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:predict", self.base_url, model)
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let start = Instant::now();
        let url = self.predict_url(&request.model);
        let body = ImagenRequest::from_generation_request(request);

        tracing::debug!(model = %request.model, count = request.number_of_images, "sending Imagen request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.credential.expose())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let imagen_response: ImagenResponse = serde_json::from_slice(&response.bytes().await?)?;
        let generated = imagen_response.into_generation_response()?;

        tracing::debug!(
            images = generated.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Imagen request complete"
        );
        Ok(generated)
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> PicGenError {
    let text = sanitize_error_message(text);
    if status == 404 {
        return PicGenError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(Duration::from_secs);
        return PicGenError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return PicGenError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("api key not valid") || lower.contains("api_key_invalid") {
        return PicGenError::Auth(text);
    }
    if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited") {
        return PicGenError::ContentBlocked(text);
    }
    if status == 400 {
        return PicGenError::InvalidRequest(text);
    }
    PicGenError::Api {
        status,
        message: text,
    }
}

#[async_trait]
impl ImageService for ImagenProvider {
    async fn generate_images(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.generate_impl(request).await
    }

    fn name(&self) -> &str {
        "Imagen (Google)"
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
struct ImagenRequest {
    instances: Vec<ImagenInstance>,
    parameters: ImagenParameters,
}

#[derive(Debug, Serialize)]
struct ImagenInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenParameters {
    sample_count: u32,
}

impl ImagenRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        Self {
            instances: vec![ImagenInstance {
                prompt: req.prompt.clone(),
            }],
            parameters: ImagenParameters {
                sample_count: req.number_of_images,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImagenResponse {
    #[serde(default)]
    predictions: Vec<ImagenPrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagenPrediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

impl ImagenResponse {
    fn into_generation_response(self) -> Result<GenerationResponse> {
        let mut images = Vec::with_capacity(self.predictions.len());
        let mut filtered = Vec::new();

        for prediction in self.predictions {
            match prediction.bytes_base64_encoded {
                Some(b64) => {
                    let data = base64::engine::general_purpose::STANDARD
                        .decode(b64.trim())
                        .map_err(|e| PicGenError::Decode(e.to_string()))?;
                    let mut image = GeneratedImage::new(data);
                    image.mime_type = prediction.mime_type;
                    images.push(image);
                }
                None => {
                    if let Some(reason) = prediction.rai_filtered_reason {
                        filtered.push(reason);
                    }
                }
            }
        }

        if images.is_empty() && !filtered.is_empty() {
            return Err(PicGenError::ContentBlocked(filtered.join("; ")));
        }
        Ok(GenerationResponse::new(images))
    }
}
