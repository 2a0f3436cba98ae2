use std::str::FromStr;

use async_trait::async_trait;

use crate::error::{DocumentError, DocumentResult};

/// Trait for embedding generation providers.
///
/// The store never sees text; every document and query goes through one of
/// these before it reaches the index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Vector dimension produced by the configured model
    fn dimension(&self) -> u64;

    /// Generate embeddings for multiple texts in one call, preserving order
    async fn embed_batch(&self, texts: &[String]) -> DocumentResult<Vec<Vec<f32>>>;
}

/// Embedding model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingModel {
    /// text-embedding-3-small (1536 dimensions)
    #[default]
    TextEmbedding3Small,
    /// text-embedding-3-large (3072 dimensions)
    TextEmbedding3Large,
    /// text-embedding-ada-002 (1536 dimensions, legacy)
    TextEmbeddingAda002,
}

impl EmbeddingModel {
    pub fn dimension(&self) -> u64 {
        match self {
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
            EmbeddingModel::TextEmbeddingAda002 => 1536,
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
            EmbeddingModel::TextEmbeddingAda002 => "text-embedding-ada-002",
        }
    }
}

impl FromStr for EmbeddingModel {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text-embedding-3-small" => Ok(EmbeddingModel::TextEmbedding3Small),
            "text-embedding-3-large" => Ok(EmbeddingModel::TextEmbedding3Large),
            "text-embedding-ada-002" => Ok(EmbeddingModel::TextEmbeddingAda002),
            other => Err(DocumentError::Config(format!(
                "unknown embedding model '{other}'"
            ))),
        }
    }
}
