//! Bearer credential handling.

use std::fmt;

use crate::error::{EmbeddingError, Result};

/// Environment variable the credential is conventionally read from.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// An opaque bearer token.
///
/// The secret never appears in `Debug` or `Display` output; both render the
/// masked form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, rejecting empty or whitespace-only values.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(EmbeddingError::MissingCredential(API_KEY_ENV.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw token, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `sk-ab...wxyz` style rendering safe for logs.
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(5).collect();
        let len = self.0.chars().count();
        if len > 8 {
            let suffix: String = self.0.chars().skip(len - 4).collect();
            format!("{prefix}...{suffix}")
        } else {
            format!("{prefix}...")
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_credential_rejected() {
        assert!(matches!(
            Credential::new(""),
            Err(EmbeddingError::MissingCredential(_))
        ));
        assert!(Credential::new("   \n").is_err());
    }

    #[test]
    fn test_credential_is_trimmed() {
        let credential = Credential::new("  sk-test-123456789\n").unwrap();
        assert_eq!(credential.expose(), "sk-test-123456789");
    }

    #[test]
    fn test_masking_long_key() {
        let credential = Credential::new("sk-abcdefghijklmnopwxyz").unwrap();
        assert_eq!(credential.masked(), "sk-ab...wxyz");
        assert_eq!(format!("{credential:?}"), "Credential(\"sk-ab...wxyz\")");
        assert!(!format!("{credential}").contains("ghijkl"));
    }

    #[test]
    fn test_masking_short_key() {
        let credential = Credential::new("short").unwrap();
        assert_eq!(credential.masked(), "short...");
    }
}
