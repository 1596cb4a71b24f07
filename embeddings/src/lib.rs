//! # Embeddings client
//!
//! Typed access to OpenAI-compatible `/v1/embeddings` endpoints.
//!
//! ## Features
//!
//! - **Wire types**: requests with optional dimension hint and encoding format,
//!   responses carrying either float arrays or base64 packed vectors
//! - **Error taxonomy**: configuration, transport, API and shape errors kept apart
//! - **Credential masking**: bearer tokens never show up in logs
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings Client                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Credential ──► OpenAIProvider ──► EmbeddingResponse            │
//! │                      │                    │                     │
//! │                      ▼                    ▼                     │
//! │              EmbeddingError       decode_base64_embedding       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod credential;
pub mod encoding;
pub mod error;
pub mod provider;
pub mod types;

pub use credential::{API_KEY_ENV, Credential};
pub use encoding::{BYTES_PER_COMPONENT, decode_base64_bytes, decode_base64_embedding};
pub use error::{EmbeddingError, Result};
pub use provider::{
    ClientConfig, DEFAULT_ENDPOINT, EmbeddingProvider, OpenAIProvider, known_dimension,
};
pub use types::{
    ApiErrorBody, ApiErrorDetail, ApiErrorKind, EmbeddingData, EmbeddingRequest,
    EmbeddingResponse, EmbeddingVector, EncodingFormat, Usage,
};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
