//! Documents Domain Library
//!
//! REST-facing document storage over an external vector database: collections
//! of text documents with flat metadata, batch upsert with per-record
//! insert/update reporting, and semantic similarity queries.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ DocumentService  │  ← resolver, upsert reconciliation, query envelope
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐     ┌──────────────────┐
//! │  DocumentStore   │     │     Embedder     │
//! │     (trait)      │     │     (trait)      │
//! └────────┬─────────┘     └────────┬─────────┘
//!          │                        │
//! ┌────────▼─────────┐     ┌────────▼─────────┐
//! │   QdrantStore    │     │  OpenAiEmbedder  │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! Storage, indexing and nearest-neighbor search live entirely in the
//! external store; embedding generation lives entirely in the provider. This
//! crate translates between the HTTP surface and those two collaborators.

pub mod embedding;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod qdrant;
pub mod reconcile;
pub mod sanitize;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use embedding::{Embedder, EmbeddingConfig, EmbeddingModel, OpenAiEmbedder};
pub use error::{DocumentError, DocumentResult};
pub use handlers::GatewayApiDoc;
pub use models::{
    CollectionInfo, IncludeField, ListOptions, Metadata, NewDocument, QueryHit, QueryOutput,
    StoredDocument, UpsertOutcome, UpsertStatus,
};
pub use qdrant::{QdrantConfig, QdrantStore};
pub use sanitize::sanitize_metadata;
pub use service::DocumentService;
pub use store::DocumentStore;
