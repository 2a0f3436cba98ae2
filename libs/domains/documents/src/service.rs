use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::embedding::Embedder;
use crate::error::{DocumentError, DocumentResult};
use crate::models::{
    CollectionInfo, IncludeField, ListOptions, Metadata, NewDocument, QueryOutput, StoredDocument,
    UpsertOutcome,
};
use crate::reconcile;
use crate::sanitize::sanitize_metadata;
use crate::store::DocumentStore;

/// Document service combining vector storage with embedding generation.
///
/// The store is generic so tests can swap in a mock; the embedder is shared
/// behind a trait object, the same composition the HTTP layer receives.
pub struct DocumentService<S: DocumentStore> {
    store: S,
    embedder: Arc<dyn Embedder>,
}

impl<S: DocumentStore> DocumentService<S> {
    pub fn new(store: S, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    // ===== Collection Management =====

    pub async fn create_collection(&self, name: &str) -> DocumentResult<CollectionInfo> {
        self.store
            .create_collection(name, self.embedder.dimension())
            .await
    }

    pub async fn list_collections(&self) -> DocumentResult<Vec<String>> {
        self.store.list_collections().await
    }

    /// Number of documents in a collection, 404 when it does not exist.
    pub async fn collection_count(&self, name: &str) -> DocumentResult<u64> {
        self.resolve_collection(name).await?;
        self.store.count(name).await
    }

    pub async fn delete_collection(&self, name: &str) -> DocumentResult<()> {
        if self.store.delete_collection(name).await? {
            Ok(())
        } else {
            Err(DocumentError::CollectionNotFound(name.to_string()))
        }
    }

    /// Resolve a collection handle, mapping absence to `CollectionNotFound`.
    ///
    /// When the stored vector configuration cannot be read (or no longer
    /// matches what this client would write), the resolver retries through
    /// create-or-get with the configured dimension instead of propagating.
    async fn resolve_collection(&self, name: &str) -> DocumentResult<CollectionInfo> {
        match self.store.get_collection(name).await {
            Ok(Some(info)) => {
                if info.dimension != self.embedder.dimension() {
                    warn!(
                        collection = name,
                        stored = info.dimension,
                        configured = self.embedder.dimension(),
                        "collection dimension differs from the configured embedding model"
                    );
                }
                Ok(info)
            }
            Ok(None) => Err(DocumentError::CollectionNotFound(name.to_string())),
            Err(err) if err.is_schema_mismatch() => {
                warn!(
                    collection = name,
                    "stored vector configuration unreadable, retrying with create-or-get: {}",
                    err
                );
                self.store
                    .ensure_collection(name, self.embedder.dimension())
                    .await
            }
            Err(err) => Err(err),
        }
    }

    // ===== Document Operations =====

    /// Batch upsert: classify each record as insert or update, merge
    /// metadata for updates, embed everything once and write one batch.
    pub async fn add_documents(
        &self,
        name: &str,
        documents: Vec<String>,
        ids: Option<Vec<Option<String>>>,
        metadatas: Option<Vec<Option<serde_json::Value>>>,
    ) -> DocumentResult<Vec<UpsertOutcome>> {
        reconcile::check_batch_shape(&documents, ids.as_deref(), metadatas.as_deref())?;
        self.resolve_collection(name).await?;

        let lookup = reconcile::supplied_ids(ids.as_deref());
        let existing: HashMap<String, Option<Metadata>> = if lookup.is_empty() {
            HashMap::new()
        } else {
            match self.store.fetch(name, &lookup).await {
                Ok(found) => found.into_iter().map(|doc| (doc.id, doc.metadata)).collect(),
                Err(err) => {
                    // Fail open: a failed existence check degrades every
                    // record in the batch to an insert.
                    warn!(
                        collection = name,
                        "existence check failed, treating batch as inserts: {}", err
                    );
                    HashMap::new()
                }
            }
        };

        let plan = reconcile::plan_batch(
            &documents,
            ids.as_deref(),
            metadatas.as_deref(),
            &existing,
        );

        let vectors = self.embedder.embed_batch(&documents).await?;

        let records: Vec<NewDocument> = plan
            .iter()
            .zip(vectors)
            .map(|(record, vector)| NewDocument {
                id: record.id.clone(),
                vector,
                document: record.document.clone(),
                metadata: record.metadata.clone(),
            })
            .collect();

        self.store.upsert(name, records).await?;

        Ok(plan
            .into_iter()
            .map(|record| UpsertOutcome {
                id: record.id,
                status: record.status,
            })
            .collect())
    }

    pub async fn list_documents(
        &self,
        name: &str,
        options: ListOptions,
    ) -> DocumentResult<Vec<StoredDocument>> {
        self.resolve_collection(name).await?;
        self.store.list(name, options).await
    }

    pub async fn get_document(&self, name: &str, id: &str) -> DocumentResult<StoredDocument> {
        self.resolve_collection(name).await?;

        let ids = [id.to_string()];
        self.store
            .fetch(name, &ids)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocumentError::DocumentNotFound(id.to_string()))
    }

    /// Read-merge-write update of a single document. Absent fields keep
    /// their stored values; supplied metadata is merged over what is stored.
    pub async fn update_document(
        &self,
        name: &str,
        id: &str,
        document: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> DocumentResult<()> {
        self.resolve_collection(name).await?;

        let ids = [id.to_string()];
        let existing = self
            .store
            .fetch(name, &ids)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocumentError::DocumentNotFound(id.to_string()))?;

        let document = document.unwrap_or(existing.document);
        let metadata = reconcile::merge_metadata(
            existing.metadata.as_ref(),
            sanitize_metadata(metadata.as_ref()),
        );

        let vector = self
            .embedder
            .embed_batch(std::slice::from_ref(&document))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocumentError::Embedding("no embedding returned".to_string()))?;

        self.store
            .upsert(
                name,
                vec![NewDocument {
                    id: id.to_string(),
                    vector,
                    document,
                    metadata,
                }],
            )
            .await
    }

    pub async fn delete_document(&self, name: &str, id: &str) -> DocumentResult<()> {
        self.resolve_collection(name).await?;

        let ids = [id.to_string()];
        let existing = self.store.fetch(name, &ids).await?;
        if existing.is_empty() {
            return Err(DocumentError::DocumentNotFound(id.to_string()));
        }

        self.store.delete(name, &ids).await?;
        Ok(())
    }

    // ===== Query =====

    /// Similarity query: embed every text in one batch, search per vector,
    /// and shape the grouped envelope. Fields excluded by `include` stay
    /// empty containers.
    pub async fn query(
        &self,
        name: &str,
        texts: Vec<String>,
        n_results: u32,
        where_doc: Option<serde_json::Value>,
        include: Option<Vec<IncludeField>>,
    ) -> DocumentResult<QueryOutput> {
        if texts.is_empty() {
            return Err(DocumentError::Validation(
                "queryTexts array is required".to_string(),
            ));
        }

        self.resolve_collection(name).await?;

        let include = include.unwrap_or_else(IncludeField::default_set);
        let with_documents = include.contains(&IncludeField::Documents);
        let with_metadatas = include.contains(&IncludeField::Metadatas);
        let with_distances = include.contains(&IncludeField::Distances);

        let vectors = self.embedder.embed_batch(&texts).await?;

        let mut output = QueryOutput::default();
        for vector in vectors {
            let hits = self
                .store
                .query(name, vector, n_results, where_doc.clone())
                .await?;

            output.count += hits.len();
            output
                .ids
                .push(hits.iter().map(|hit| hit.id.clone()).collect());
            if with_documents {
                output
                    .documents
                    .push(hits.iter().map(|hit| hit.document.clone()).collect());
            }
            if with_metadatas {
                output
                    .metadatas
                    .push(hits.iter().map(|hit| hit.metadata.clone()).collect());
            }
            if with_distances {
                output
                    .distances
                    .push(hits.iter().map(|hit| hit.distance).collect());
            }
        }

        Ok(output)
    }

    // ===== Service Operations =====

    pub async fn heartbeat(&self) -> DocumentResult<String> {
        self.store.heartbeat().await
    }

    /// Drop every collection in the store. Callers are responsible for
    /// checking the reset allowance before invoking this.
    pub async fn reset(&self) -> DocumentResult<u64> {
        self.store.reset().await
    }
}
