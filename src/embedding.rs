// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding endpoint client
//!
//! The pipeline only relies on "text in, fixed-length vector out". Failures
//! are typed on [`EmbeddingProvider::embed`] and flattened to the zero vector
//! by [`embed_or_zero`], which scores as "no similarity" downstream.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{DEFAULT_EMBEDDING_ENDPOINT, DEFAULT_EMBEDDING_MODEL};
use crate::errors::EmbeddingError;

/// Dimensionality of the hosted embedding model
pub const EMBEDDING_DIM: usize = 1536;

/// Inputs are cut to roughly the model's context window.
const MAX_INPUT_CHARS: usize = 24_000;

/// Something that turns text into a vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector this provider returns
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Model and endpoint for [`HttpEmbedder`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingSettings {
    pub model: String,
    pub endpoint: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            endpoint: DEFAULT_EMBEDDING_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible `/embeddings` endpoint
pub struct HttpEmbedder {
    client: Client,
    api_key: String,
    settings: EmbeddingSettings,
}

impl HttpEmbedder {
    pub fn new(api_key: impl Into<String>, settings: EmbeddingSettings) -> Self {
        Self::with_client(Client::new(), api_key, settings)
    }

    pub fn with_client(
        client: Client,
        api_key: impl Into<String>,
        settings: EmbeddingSettings,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            settings,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = prepare_input(text)?;

        let request_body = json!({
            "model": self.settings.model,
            "input": input,
        });

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse =
            serde_json::from_str(&body).map_err(|e| EmbeddingError::Malformed(e.to_string()))?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::Malformed("response has no data".to_string()))?;

        validate_embedding(vector, self.dimensions())
    }
}

fn prepare_input(text: &str) -> Result<&str, EmbeddingError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }
    match trimmed.char_indices().nth(MAX_INPUT_CHARS) {
        Some((cut, _)) => Ok(&trimmed[..cut]),
        None => Ok(trimmed),
    }
}

/// Reject vectors of the wrong length, with non-finite values, or all zeros
pub fn validate_embedding(vector: Vec<f32>, expected: usize) -> Result<Vec<f32>, EmbeddingError> {
    if vector.len() != expected {
        return Err(EmbeddingError::Dimension {
            expected,
            actual: vector.len(),
        });
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(EmbeddingError::Malformed(
            "embedding contains non-finite values".to_string(),
        ));
    }
    if vector.iter().all(|v| *v == 0.0) {
        return Err(EmbeddingError::AllZero);
    }
    Ok(vector)
}

pub fn zero_vector(dimensions: usize) -> Vec<f32> {
    vec![0.0; dimensions]
}

/// Embed `text`, substituting the zero vector on any failure
pub async fn embed_or_zero(provider: &dyn EmbeddingProvider, text: &str) -> Vec<f32> {
    match provider.embed(text).await {
        Ok(vector) => vector,
        Err(EmbeddingError::EmptyInput) => {
            debug!("skipping embedding of empty text");
            zero_vector(provider.dimensions())
        }
        Err(e) => {
            warn!("embedding failed, scoring as zero similarity: {}", e);
            zero_vector(provider.dimensions())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> EmbeddingSettings {
        EmbeddingSettings {
            model: "test-model".to_string(),
            endpoint: format!("{}/v1/embeddings", server.uri()),
        }
    }

    fn unit_vector(dim: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[0] = 1.0;
        v
    }

    #[tokio::test]
    async fn embeds_through_http_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": unit_vector(EMBEDDING_DIM) }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new("sk-test", settings_for(&server));
        let vector = embedder.embed("parse config").await.expect("embed");
        assert_eq!(vector.len(), EMBEDDING_DIM);
        assert_eq!(vector[0], 1.0);
    }

    #[tokio::test]
    async fn server_error_becomes_zero_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new("sk-test", settings_for(&server));
        let err = embedder.embed("anything").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Status { status: 500, .. }));

        let vector = embed_or_zero(&embedder, "anything").await;
        assert_eq!(vector, zero_vector(EMBEDDING_DIM));
    }

    #[tokio::test]
    async fn wrong_dimension_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": [0.1, 0.2, 0.3] }]
            })))
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new("sk-test", settings_for(&server));
        let err = embedder.embed("anything").await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::Dimension {
                expected: EMBEDDING_DIM,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new("sk-test", settings_for(&server));
        let err = embedder.embed("anything").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }

    #[tokio::test]
    async fn empty_input_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new("sk-test", settings_for(&server));
        let err = embedder.embed("   \n").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyInput));
    }

    #[test]
    fn all_zero_vector_fails_validation() {
        let err = validate_embedding(vec![0.0; 4], 4).unwrap_err();
        assert!(matches!(err, EmbeddingError::AllZero));
        assert!(validate_embedding(vec![0.0, 0.5, 0.0, 0.0], 4).is_ok());
    }

    #[test]
    fn long_input_is_truncated_on_char_boundary() {
        let text = "é".repeat(MAX_INPUT_CHARS + 10);
        let prepared = prepare_input(&text).unwrap();
        assert_eq!(prepared.chars().count(), MAX_INPUT_CHARS);
    }
}
