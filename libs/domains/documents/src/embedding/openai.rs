use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::provider::{Embedder, EmbeddingModel};
use crate::error::{DocumentError, DocumentResult};

/// OpenAI embedding provider configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: EmbeddingModel,
    /// Disables outbound TLS certificate verification for the embedding
    /// client. Dangerous; only for self-signed endpoints.
    pub accept_invalid_certs: bool,
}

impl EmbeddingConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            model: EmbeddingModel::default(),
            accept_invalid_certs: false,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.model = model;
        self
    }

    pub fn from_env() -> DocumentResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| DocumentError::Config("OPENAI_API_KEY not set".to_string()))?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let model = match std::env::var("EMBEDDING_MODEL") {
            Ok(name) => name.parse()?,
            Err(_) => EmbeddingModel::default(),
        };

        let accept_invalid_certs = std::env::var("DISABLE_SSL_VERIFICATION")
            .map(|v| v == "true")
            .unwrap_or(false);

        Ok(Self {
            api_key,
            base_url,
            model,
            accept_invalid_certs,
        })
    }
}

/// OpenAI embeddings provider
pub struct OpenAiEmbedder {
    client: Client,
    config: EmbeddingConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingConfig) -> DocumentResult<Self> {
        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate verification disabled for the embedding client");
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| DocumentError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> DocumentResult<Self> {
        Self::new(EmbeddingConfig::from_env()?)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn dimension(&self) -> u64 {
        self.config.model.dimension()
    }

    async fn embed_batch(&self, texts: &[String]) -> DocumentResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model: self.config.model.model_name().to_string(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DocumentError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        // Sort by index to maintain input order
        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);

        if data.len() != texts.len() {
            return Err(DocumentError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}
