//! Error types for the embeddings client.

use thiserror::Error;

use crate::types::ApiErrorBody;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur when talking to an embeddings endpoint.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// No usable credential was supplied.
    #[error("missing credential: {0} is empty or unset")]
    MissingCredential(String),

    /// The endpoint base URL could not be parsed.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A header value could not be encoded.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    /// Connection, timeout or body transfer failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error(
        "API error (HTTP {status}): {}",
        describe_api_error(.error.as_ref(), .body, .retry_after_secs.as_ref())
    )]
    Api {
        status: u16,
        error: Option<ApiErrorBody>,
        body: String,
        retry_after_secs: Option<u64>,
    },

    /// A success response whose body did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A base64 embedding could not be decoded into packed floats.
    #[error("invalid base64 embedding: {0}")]
    InvalidBase64(String),
}

impl EmbeddingError {
    /// True for failures that happened below HTTP (no status was received).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

fn describe_api_error(
    error: Option<&ApiErrorBody>,
    body: &str,
    retry_after_secs: Option<&u64>,
) -> String {
    let mut description = match error {
        Some(body) => format!("{}: {}", body.error.r#type, body.error.message),
        None if body.is_empty() => "<empty body>".to_string(),
        None => body.to_string(),
    };
    if let Some(secs) = retry_after_secs {
        description.push_str(&format!(" (retry after {secs}s)"));
    }
    description
}
