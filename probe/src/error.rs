//! Error types for the probe.

use embed_probe_embeddings::EmbeddingError;
use thiserror::Error;

/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Errors that prevent a probe run from producing a report.
///
/// Check-level failures, transport failures included, are not errors; they
/// are recorded in the report.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Bad credential, endpoint or header, detected before any request.
    #[error("configuration error: {0}")]
    Config(EmbeddingError),

    #[error("failed to serialize report")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_chain_names_the_cause_once() {
        let err = anyhow::Error::from(ProbeError::Config(EmbeddingError::InvalidEndpoint {
            endpoint: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        }));
        let rendered = format!("{err:#}");

        assert_eq!(
            rendered,
            "configuration error: invalid endpoint not a url: relative URL without a base"
        );
        assert_eq!(rendered.matches("relative URL without a base").count(), 1);
    }
}
