use async_trait::async_trait;

use crate::error::DocumentResult;
use crate::models::{CollectionInfo, ListOptions, NewDocument, QueryHit, StoredDocument};

/// Store trait abstracting the external vector database.
///
/// Implementations own the mapping between external string ids and the
/// store's native point ids, and the translation of store errors into the
/// domain taxonomy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ===== Collection Management =====

    /// Create a new collection with the given vector dimension
    async fn create_collection(
        &self,
        name: &str,
        dimension: u64,
    ) -> DocumentResult<CollectionInfo>;

    /// Create-or-get: returns the collection, creating it when absent
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: u64,
    ) -> DocumentResult<CollectionInfo>;

    /// Get collection info, `None` when the collection does not exist
    async fn get_collection(&self, name: &str) -> DocumentResult<Option<CollectionInfo>>;

    /// List all collection names
    async fn list_collections(&self) -> DocumentResult<Vec<String>>;

    /// Delete a collection, `false` when it did not exist
    async fn delete_collection(&self, name: &str) -> DocumentResult<bool>;

    /// Exact number of documents in a collection
    async fn count(&self, name: &str) -> DocumentResult<u64>;

    // ===== Document Operations =====

    /// Fetch documents by external id; missing ids are simply absent from
    /// the result
    async fn fetch(&self, name: &str, ids: &[String]) -> DocumentResult<Vec<StoredDocument>>;

    /// List documents with optional id restriction, filter, limit and offset
    async fn list(
        &self,
        name: &str,
        options: ListOptions,
    ) -> DocumentResult<Vec<StoredDocument>>;

    /// Batched upsert, waiting for the write to be applied
    async fn upsert(&self, name: &str, documents: Vec<NewDocument>) -> DocumentResult<()>;

    /// Delete documents by external id, returns how many ids were addressed
    async fn delete(&self, name: &str, ids: &[String]) -> DocumentResult<u64>;

    /// Nearest-neighbor search for a single query vector
    async fn query(
        &self,
        name: &str,
        vector: Vec<f32>,
        n_results: u32,
        filter: Option<serde_json::Value>,
    ) -> DocumentResult<Vec<QueryHit>>;

    // ===== Service Operations =====

    /// Store liveness probe, returns a short identification string
    async fn heartbeat(&self) -> DocumentResult<String>;

    /// Drop every collection, returns how many were deleted
    async fn reset(&self) -> DocumentResult<u64>;
}
