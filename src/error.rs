//! Error types for picture generation.

use std::time::Duration;

/// Coarse classification of a [`PicGenError`].
///
/// Lets an operator tell credential problems from service problems from
/// local I/O problems without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unusable configuration (credential, arguments).
    Configuration,
    /// The image service rejected the request or could not be reached.
    RemoteService,
    /// Writing to the destination failed.
    Io,
    /// The service answered with something we cannot use.
    Protocol,
}

impl ErrorKind {
    /// Short label used when rendering errors for humans.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration error",
            Self::RemoteService => "image service error",
            Self::Io => "output error",
            Self::Protocol => "protocol error",
        }
    }

    /// Process exit code for this kind of failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration => 2,
            Self::RemoteService => 3,
            Self::Io => 4,
            Self::Protocol => 5,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors that can occur while generating and writing a picture.
#[derive(Debug, thiserror::Error)]
pub enum PicGenError {
    /// The credential environment variable is unset or empty.
    #[error("{0} is not set; export it with your Google AI API key")]
    MissingCredential(&'static str),

    /// API key rejected by the service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Quota or rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Server-suggested wait, when given.
        retry_after: Option<Duration>,
    },

    /// Prompt or output was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The service refused the request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response held a different number of images than required.
    #[error("expected exactly one generated image, got {0}")]
    UnexpectedImageCount(usize),

    /// I/O error while writing the picture.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PicGenError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential(_) => ErrorKind::Configuration,
            Self::Auth(_)
            | Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::ContentBlocked(_)
            | Self::InvalidRequest(_)
            | Self::Network(_) => ErrorKind::RemoteService,
            Self::Decode(_) | Self::Json(_) | Self::UnexpectedImageCount(_) => {
                ErrorKind::Protocol
            }
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for picture generation operations.
pub type Result<T> = std::result::Result<T, PicGenError>;

/// Maximum length of a service error body carried into an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Masks anything that looks like a Google API key and truncates long bodies.
///
/// Error bodies are echoed to the terminal and to chat replies, so they must
/// never carry the caller's credential.
pub fn sanitize_error_message(text: &str) -> String {
    let masked: Vec<String> = text
        .split_inclusive(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .map(|chunk| {
            let token_len = chunk
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(chunk.len());
            let (token, rest) = chunk.split_at(token_len);
            if token.starts_with("AIza") && token.len() >= 30 {
                format!("AIza***{rest}")
            } else {
                chunk.to_string()
            }
        })
        .collect();
    let masked = masked.concat();
    let trimmed = masked.trim();

    if trimmed.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let cut: String = trimmed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}

/// Reads a `Retry-After` header expressed in whole seconds.
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            PicGenError::MissingCredential("GOOGLE_AI_API_KEY").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(PicGenError::Auth("bad key".into()).kind(), ErrorKind::RemoteService);
        assert_eq!(
            PicGenError::RateLimited { retry_after: None }.kind(),
            ErrorKind::RemoteService
        );
        assert_eq!(PicGenError::Decode("bad base64".into()).kind(), ErrorKind::Protocol);
        assert_eq!(PicGenError::UnexpectedImageCount(0).kind(), ErrorKind::Protocol);
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(PicGenError::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            ErrorKind::Configuration.exit_code(),
            ErrorKind::RemoteService.exit_code(),
            ErrorKind::Io.exit_code(),
            ErrorKind::Protocol.exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_error_display() {
        let err = PicGenError::Api {
            status: 500,
            message: "Internal".into(),
        };
        assert_eq!(err.to_string(), "API error: 500 - Internal");

        let err = PicGenError::MissingCredential("GOOGLE_AI_API_KEY");
        assert!(err.to_string().starts_with("GOOGLE_AI_API_KEY is not set"));
    }

    #[test]
    fn test_sanitize_masks_api_key() {
        let text = "API key AIzaSyA1234567890abcdefghijklmnopqrs not valid.";
        let clean = sanitize_error_message(text);
        assert_eq!(clean, "API key AIza*** not valid.");
    }

    #[test]
    fn test_sanitize_truncates() {
        let text = "x".repeat(2_000);
        let clean = sanitize_error_message(&text);
        assert_eq!(clean.len(), MAX_ERROR_MESSAGE_LEN + 3);
        assert!(clean.ends_with("..."));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("42"));
        assert_eq!(parse_retry_after(&headers), Some(42));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(parse_retry_after(&headers), None);
    }
}
