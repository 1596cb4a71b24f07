//! Wire types for the `/v1/embeddings` endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Embedding;

/// Representation the server should use for returned vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingFormat {
    /// Plain JSON array of numbers.
    Float,
    /// Base64 string of packed little-endian f32 values.
    Base64,
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float => f.write_str("float"),
            Self::Base64 => f.write_str("base64"),
        }
    }
}

/// Request body for generating embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Model identifier.
    pub model: String,

    /// Texts to embed, in order.
    pub input: Vec<String>,

    /// Requested output dimension (if supported by the model).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<EncodingFormat>,

    /// End-user identifier forwarded to the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl EmbeddingRequest {
    /// Create a request for the given model and inputs.
    pub fn new<I, S>(model: impl Into<String>, input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: model.into(),
            input: input.into_iter().map(Into::into).collect(),
            dimensions: None,
            encoding_format: None,
            user: None,
        }
    }

    /// Set the output dimensions.
    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Set the encoding format.
    pub fn with_encoding_format(mut self, format: EncodingFormat) -> Self {
        self.encoding_format = Some(format);
        self
    }

    /// Set the end-user identifier.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Successful response from the embeddings endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub object: Option<String>,

    /// Model that produced the vectors.
    pub model: String,

    /// One entry per input.
    pub data: Vec<EmbeddingData>,

    #[serde(default)]
    pub usage: Option<Usage>,
}

impl EmbeddingResponse {
    /// The first entry, if any.
    pub fn first(&self) -> Option<&EmbeddingData> {
        self.data.first()
    }
}

/// A single embedding entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingData {
    #[serde(default)]
    pub object: Option<String>,

    pub embedding: EmbeddingVector,

    /// Position of the matching input.
    pub index: u32,
}

/// Vector payload, as returned for either encoding format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingVector {
    Float(Embedding),
    Base64(String),
}

impl EmbeddingVector {
    /// Number of dimensions for float vectors.
    ///
    /// Base64 payloads have to be decoded first, see [`crate::decode_base64_embedding`].
    pub fn float_len(&self) -> Option<usize> {
        match self {
            Self::Float(values) => Some(values.len()),
            Self::Base64(_) => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            Self::Float(values) => Some(values.as_slice()),
            Self::Base64(_) => None,
        }
    }

    pub fn as_base64(&self) -> Option<&str> {
        match self {
            Self::Float(_) => None,
            Self::Base64(encoded) => Some(encoded),
        }
    }

    /// Short description of the payload kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "float array",
            Self::Base64(_) => "string",
        }
    }
}

/// Token accounting. Compatible servers often report only part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,

    #[serde(default)]
    pub total_tokens: u64,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub r#type: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub param: Option<String>,

    #[serde(default)]
    pub code: Option<String>,
}

impl ApiErrorDetail {
    pub fn kind(&self) -> ApiErrorKind {
        ApiErrorKind::from_type(&self.r#type)
    }

    /// Both `type` and `message` carry text.
    pub fn is_complete(&self) -> bool {
        !self.r#type.trim().is_empty() && !self.message.trim().is_empty()
    }
}

/// Classification of the provider's `error.type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    InvalidRequest,
    Authentication,
    Permission,
    RateLimit,
    Server,
    Other,
}

impl ApiErrorKind {
    pub fn from_type(error_type: &str) -> Self {
        match error_type {
            "invalid_request_error" => Self::InvalidRequest,
            "authentication_error" => Self::Authentication,
            "permission_error" => Self::Permission,
            "rate_limit_error" | "insufficient_quota" => Self::RateLimit,
            "server_error" | "api_error" => Self::Server,
            _ => Self::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Authentication => "authentication",
            Self::Permission => "permission",
            Self::RateLimit => "rate_limit",
            Self::Server => "server",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_request_omits_unset_options() {
        let request = EmbeddingRequest::new("text-embedding-3-small", ["hello world"]);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "model": "text-embedding-3-small",
                "input": ["hello world"],
            })
        );
    }

    #[test]
    fn test_request_serializes_options() {
        let request = EmbeddingRequest::new("m", ["a", "b"])
            .with_dimensions(256)
            .with_encoding_format(EncodingFormat::Base64)
            .with_user("probe");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["dimensions"], 256);
        assert_eq!(body["encoding_format"], "base64");
        assert_eq!(body["user"], "probe");
        assert_eq!(body["input"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_response_accepts_both_vector_shapes() {
        let raw = r#"{
            "object": "list",
            "model": "text-embedding-3-small",
            "data": [
                {"object": "embedding", "embedding": [0.25, -1.0, 3], "index": 0},
                {"object": "embedding", "embedding": "AACAPw==", "index": 1}
            ],
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }"#;
        let response: EmbeddingResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].embedding.as_floats(), Some(&[0.25, -1.0, 3.0][..]));
        assert_eq!(response.data[1].embedding.as_base64(), Some("AACAPw=="));
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(4));
    }

    #[test]
    fn test_response_without_usage() {
        let raw = r#"{"model": "m", "data": []}"#;
        let response: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert!(response.usage.is_none());
        assert!(response.first().is_none());
    }

    #[test]
    fn test_integer_components_decode_as_floats() {
        let raw = r#"{"model":"m","data":[{"embedding":[0,1,-2,0.5],"index":0}]}"#;
        let response: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            response.data[0].embedding.as_floats(),
            Some(&[0.0, 1.0, -2.0, 0.5][..])
        );
    }

    #[test]
    fn test_partial_usage_is_accepted() {
        let raw = r#"{"model":"m","data":[{"embedding":[0.1],"index":0}],"usage":{"total_tokens":3}}"#;
        let response: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            response.usage,
            Some(Usage {
                prompt_tokens: 0,
                total_tokens: 3,
            })
        );
        assert_eq!(response.data[0].embedding.float_len(), Some(1));
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            ApiErrorKind::from_type("invalid_request_error"),
            ApiErrorKind::InvalidRequest
        );
        assert_eq!(
            ApiErrorKind::from_type("rate_limit_error"),
            ApiErrorKind::RateLimit
        );
        assert_eq!(ApiErrorKind::from_type("something_new"), ApiErrorKind::Other);
        assert_eq!(ApiErrorKind::RateLimit.to_string(), "rate_limit");
    }

    #[test]
    fn test_error_detail_completeness() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": {"type": "invalid_request_error", "message": ""}}"#)
                .unwrap();
        assert!(!body.error.is_complete());
        assert_eq!(body.error.kind(), ApiErrorKind::InvalidRequest);
    }
}
