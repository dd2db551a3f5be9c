//! Run configuration: credential, prompt source and destination.

use crate::error::{PicGenError, Result};
use std::path::PathBuf;

/// Environment variable holding the Google AI API key.
pub const CREDENTIAL_ENV_VAR: &str = "GOOGLE_AI_API_KEY";

/// Prompt used when none is supplied on the command line.
pub const DEFAULT_PROMPT: &str = "Nerds with green t-shirts dancing around a tree";

/// Conventional file name for the file destination.
pub const DEFAULT_OUTPUT_FILE: &str = "picture.png";

/// Secret authorizing calls to the image service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps an explicit API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Reads the credential from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the credential through an arbitrary variable lookup.
    ///
    /// An empty value counts as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        lookup(CREDENTIAL_ENV_VAR)
            .filter(|key| !key.trim().is_empty())
            .map(Self)
            .ok_or(PicGenError::MissingCredential(CREDENTIAL_ENV_VAR))
    }

    /// Returns the raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Where the prompt text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// The built-in [`DEFAULT_PROMPT`].
    Fixed,
    /// Text supplied by the caller, passed through verbatim.
    Argument(String),
}

impl PromptSource {
    /// Picks [`PromptSource::Argument`] when a value is present.
    pub fn from_arg(arg: Option<String>) -> Self {
        match arg {
            Some(prompt) => Self::Argument(prompt),
            None => Self::Fixed,
        }
    }

    /// Resolves the prompt text.
    pub fn prompt(&self) -> &str {
        match self {
            Self::Fixed => DEFAULT_PROMPT,
            Self::Argument(prompt) => prompt,
        }
    }
}

/// Where the generated image bytes go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The process's standard output, as raw bytes.
    Stdout,
    /// A file, created or truncated.
    File(PathBuf),
}

impl Destination {
    /// Parses a destination argument: `-` means standard output.
    pub fn parse(value: &str) -> Self {
        if value == "-" {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    /// The `picture.png` file in the working directory.
    pub fn default_file() -> Self {
        Self::File(PathBuf::from(DEFAULT_OUTPUT_FILE))
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("<stdout>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_credential_from_lookup() {
        let vars = env(&[(CREDENTIAL_ENV_VAR, "secret")]);
        let credential = Credential::from_lookup(|name| vars.get(name).cloned()).unwrap();
        assert_eq!(credential.expose(), "secret");
    }

    #[test]
    fn test_credential_missing() {
        let vars = env(&[]);
        let err = Credential::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(matches!(err, PicGenError::MissingCredential(CREDENTIAL_ENV_VAR)));
    }

    #[test]
    fn test_credential_empty_counts_as_missing() {
        let vars = env(&[(CREDENTIAL_ENV_VAR, "  ")]);
        assert!(Credential::from_lookup(|name| vars.get(name).cloned()).is_err());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("super-secret");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
    }

    #[test]
    fn test_prompt_source() {
        assert_eq!(PromptSource::from_arg(None).prompt(), DEFAULT_PROMPT);
        assert_eq!(
            PromptSource::from_arg(Some("a red fox".into())).prompt(),
            "a red fox"
        );
        // Empty prompts are passed through untouched.
        assert_eq!(PromptSource::from_arg(Some(String::new())).prompt(), "");
    }

    #[test]
    fn test_destination_parse() {
        assert_eq!(Destination::parse("-"), Destination::Stdout);
        assert_eq!(
            Destination::parse("out/picture.png"),
            Destination::File(PathBuf::from("out/picture.png"))
        );
        assert_eq!(
            Destination::default_file(),
            Destination::File(PathBuf::from("picture.png"))
        );
    }
}
