//! Embedding providers.
//!
//! The probe talks to providers through [`EmbeddingProvider`]; the only
//! concrete implementation speaks the OpenAI `/v1/embeddings` protocol, which
//! most hosted embedding services also accept.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::credential::Credential;
use crate::error::{EmbeddingError, Result};
use crate::types::{ApiErrorBody, EmbeddingRequest, EmbeddingResponse};

/// Default API host.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Path appended to the endpoint base URL.
pub const EMBEDDINGS_PATH: &str = "/v1/embeddings";

const ORGANIZATION_HEADER: &str = "OpenAI-Organization";

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Issue one embeddings request.
    ///
    /// Non-success statuses come back as [`EmbeddingError::Api`] so callers can
    /// inspect the structured error body.
    async fn create_embeddings(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse>;
}

/// Connection settings for [`OpenAIProvider`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL; `/v1/embeddings` is appended.
    pub endpoint: String,

    /// Optional `OpenAI-Organization` header value.
    pub organization: Option<String>,

    /// Whole-request timeout.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Set the endpoint base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the organization header.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Resolve the full embeddings URL for the configured endpoint.
    pub fn embeddings_url(&self) -> Result<Url> {
        let base = self.endpoint.trim().trim_end_matches('/');
        let joined = if base.ends_with("/v1") {
            format!("{base}/embeddings")
        } else {
            format!("{base}{EMBEDDINGS_PATH}")
        };

        let url = Url::parse(&joined).map_err(|e| EmbeddingError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(EmbeddingError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: format!("unsupported scheme `{other}`"),
            }),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            organization: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// OpenAI-compatible embedding provider.
pub struct OpenAIProvider {
    /// API key.
    credential: Credential,

    /// Fully resolved `/v1/embeddings` URL.
    url: Url,

    organization: Option<HeaderValue>,

    /// HTTP client.
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a new provider. Fails on a malformed endpoint or organization id.
    pub fn new(credential: Credential, config: &ClientConfig) -> Result<Self> {
        let url = config.embeddings_url()?;

        let organization = config
            .organization
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| EmbeddingError::InvalidHeader {
                name: ORGANIZATION_HEADER,
                reason: e.to_string(),
            })?;

        // Reject keys that cannot be sent before the first request goes out.
        HeaderValue::from_str(&format!("Bearer {}", credential.expose())).map_err(|e| {
            EmbeddingError::InvalidHeader {
                name: "Authorization",
                reason: e.to_string(),
            }
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        info!("Embeddings provider targeting {url} with key {credential}");

        Ok(Self {
            credential,
            url,
            organization,
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn create_embeddings(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        debug!(
            "Requesting {} embedding(s) with model: {}",
            request.input.len(),
            request.model
        );

        let mut builder = self
            .client
            .post(self.url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.credential.expose()))
            .header(CONTENT_TYPE, "application/json")
            .json(request);

        if let Some(organization) = &self.organization {
            builder = builder.header(ORGANIZATION_HEADER, organization.clone());
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok());
            let body = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<ApiErrorBody>(&body).ok();

            warn!("Embeddings request failed with HTTP {status}");

            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                error,
                body,
                retry_after_secs,
            });
        }

        let body = response.text().await?;
        let result: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| EmbeddingError::InvalidResponse(format!("undecodable body: {e}")))?;

        debug!(
            "Received {} embedding(s) from model {}",
            result.data.len(),
            result.model
        );

        Ok(result)
    }
}

/// Native output dimension of well-known models.
pub fn known_dimension(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        "text-embedding-ada-002" => Some(1536),
        _ => None,
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embeddings_url_appends_path() {
        let config = ClientConfig::default();
        assert_eq!(
            config.embeddings_url().unwrap().as_str(),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn test_embeddings_url_tolerates_trailing_slash_and_version() {
        let config = ClientConfig::default().with_endpoint("http://localhost:8080/");
        assert_eq!(
            config.embeddings_url().unwrap().as_str(),
            "http://localhost:8080/v1/embeddings"
        );

        let config = ClientConfig::default().with_endpoint("https://proxy.example/openai/v1");
        assert_eq!(
            config.embeddings_url().unwrap().as_str(),
            "https://proxy.example/openai/v1/embeddings"
        );
    }

    #[test]
    fn test_embeddings_url_rejects_garbage() {
        let config = ClientConfig::default().with_endpoint("not a url");
        assert!(matches!(
            config.embeddings_url(),
            Err(EmbeddingError::InvalidEndpoint { .. })
        ));

        let config = ClientConfig::default().with_endpoint("ftp://example.com");
        assert!(config.embeddings_url().is_err());
    }

    #[test]
    fn test_provider_rejects_bad_organization() {
        let credential = Credential::new("sk-test").unwrap();
        let config = ClientConfig::default().with_organization("bad\norg");
        assert!(matches!(
            OpenAIProvider::new(credential, &config),
            Err(EmbeddingError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_known_dimensions() {
        assert_eq!(known_dimension("text-embedding-3-large"), Some(3072));
        assert_eq!(known_dimension("text-embedding-3-small"), Some(1536));
        assert_eq!(known_dimension("custom"), None);
    }
}
