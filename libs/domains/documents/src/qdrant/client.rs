use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    self, Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance,
    Filter, GetPointsBuilder, PointId, PointStruct, ScrollPointsBuilder, SearchPointsBuilder,
    Struct, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder, value::Kind,
};
use qdrant_client::{Qdrant, QdrantError};
use uuid::Uuid;

use super::QdrantConfig;
use crate::error::{DocumentError, DocumentResult};
use crate::filter::translate_where;
use crate::models::{CollectionInfo, ListOptions, Metadata, NewDocument, QueryHit, StoredDocument};
use crate::store::DocumentStore;

/// Reserved payload fields; caller metadata lives nested under `metadata`
/// so user keys can never collide with these.
const FIELD_DOC_ID: &str = "doc_id";
const FIELD_DOCUMENT: &str = "document";
const FIELD_METADATA: &str = "metadata";

/// Page size used when scrolling through a collection.
const SCROLL_PAGE: u32 = 256;

/// Qdrant-backed implementation of DocumentStore
pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    pub fn connect(config: QdrantConfig) -> DocumentResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| DocumentError::Config(format!("Failed to build store client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    /// The store requires UUID point ids; external string ids are mapped
    /// deterministically so lookups never need a secondary index.
    fn point_id(external_id: &str) -> PointId {
        PointId::from(
            Uuid::new_v5(&Uuid::NAMESPACE_URL, external_id.as_bytes()).to_string(),
        )
    }

    fn build_payload(doc: &NewDocument) -> HashMap<String, QdrantValue> {
        let mut payload = HashMap::new();
        payload.insert(FIELD_DOC_ID.to_string(), QdrantValue::from(doc.id.clone()));
        payload.insert(
            FIELD_DOCUMENT.to_string(),
            QdrantValue::from(doc.document.clone()),
        );

        if let Some(metadata) = &doc.metadata {
            let fields = metadata
                .iter()
                .map(|(key, value)| (key.clone(), scalar_to_value(value)))
                .collect();
            payload.insert(
                FIELD_METADATA.to_string(),
                QdrantValue {
                    kind: Some(Kind::StructValue(Struct { fields })),
                },
            );
        }

        payload
    }

    /// Read a document back out of a point payload. Points without the
    /// reserved fields (written by someone else) are skipped.
    fn parse_payload(payload: &HashMap<String, QdrantValue>) -> Option<StoredDocument> {
        let id = match payload.get(FIELD_DOC_ID)?.kind.as_ref()? {
            Kind::StringValue(s) => s.clone(),
            _ => return None,
        };

        let document = match payload.get(FIELD_DOCUMENT).and_then(|v| v.kind.as_ref()) {
            Some(Kind::StringValue(s)) => s.clone(),
            _ => String::new(),
        };

        let metadata = payload.get(FIELD_METADATA).and_then(parse_metadata);

        Some(StoredDocument {
            id,
            document,
            metadata,
        })
    }

    fn list_filter(options: &ListOptions) -> DocumentResult<Option<Filter>> {
        let mut conditions = Vec::new();

        if let Some(ids) = &options.ids {
            conditions.push(Condition::has_id(
                ids.iter().map(|id| Self::point_id(id)),
            ));
        }

        if let Some(where_doc) = &options.filter {
            conditions.push(Condition::from(translate_where(where_doc)?));
        }

        if conditions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Filter::must(conditions)))
        }
    }
}

fn scalar_to_value(value: &serde_json::Value) -> QdrantValue {
    match value {
        serde_json::Value::Null => QdrantValue {
            kind: Some(Kind::NullValue(0)),
        },
        serde_json::Value::Bool(b) => QdrantValue::from(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                QdrantValue::from(i)
            } else {
                QdrantValue::from(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => QdrantValue::from(s.clone()),
        other => QdrantValue::from(other.to_string()),
    }
}

fn value_to_json(value: &QdrantValue) -> Option<serde_json::Value> {
    match &value.kind {
        Some(Kind::NullValue(_)) => Some(serde_json::Value::Null),
        Some(Kind::BoolValue(b)) => Some(serde_json::Value::Bool(*b)),
        Some(Kind::IntegerValue(i)) => Some(serde_json::Value::Number((*i).into())),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(*f).map(serde_json::Value::Number),
        Some(Kind::StringValue(s)) => Some(serde_json::Value::String(s.clone())),
        _ => None,
    }
}

fn parse_metadata(value: &QdrantValue) -> Option<Metadata> {
    match &value.kind {
        Some(Kind::StructValue(Struct { fields })) => {
            let map: Metadata = fields
                .iter()
                .filter_map(|(key, value)| value_to_json(value).map(|json| (key.clone(), json)))
                .collect();
            if map.is_empty() { None } else { Some(map) }
        }
        _ => None,
    }
}

/// The single spot where store errors are mapped onto the domain taxonomy.
/// The store does not expose structured error kinds on every call, so
/// absence is detected from the error text; swap this function if that
/// ever changes.
fn translate_store_error(collection: &str, err: &QdrantError) -> DocumentError {
    classify_store_message(collection, &err.to_string())
}

fn classify_store_message(collection: &str, msg: &str) -> DocumentError {
    let lower = msg.to_lowercase();
    if lower.contains("not found")
        || lower.contains("does not exist")
        || lower.contains("doesn't exist")
    {
        DocumentError::CollectionNotFound(collection.to_string())
    } else {
        DocumentError::Store(msg.to_string())
    }
}

fn extract_dimension(config: Option<qdrant::CollectionConfig>) -> Option<u64> {
    use qdrant_client::qdrant::vectors_config::Config;

    match config?.params?.vectors_config?.config? {
        Config::Params(params) => Some(params.size),
        Config::ParamsMap(map) => map.map.values().next().map(|params| params.size),
    }
}

#[async_trait]
impl DocumentStore for QdrantStore {
    async fn create_collection(
        &self,
        name: &str,
        dimension: u64,
    ) -> DocumentResult<CollectionInfo> {
        let builder = CreateCollectionBuilder::new(name)
            .vectors_config(VectorParamsBuilder::new(dimension, Distance::Cosine));

        self.client
            .create_collection(builder)
            .await
            .map_err(|e| DocumentError::Store(e.to_string()))?;

        Ok(CollectionInfo {
            name: name.to_string(),
            dimension,
        })
    }

    async fn ensure_collection(
        &self,
        name: &str,
        dimension: u64,
    ) -> DocumentResult<CollectionInfo> {
        let exists = self
            .client
            .collection_exists(name)
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        if !exists {
            return self.create_collection(name, dimension).await;
        }

        Ok(CollectionInfo {
            name: name.to_string(),
            dimension,
        })
    }

    async fn get_collection(&self, name: &str) -> DocumentResult<Option<CollectionInfo>> {
        let exists = self
            .client
            .collection_exists(name)
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        if !exists {
            return Ok(None);
        }

        let info = self
            .client
            .collection_info(name)
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        let result = info
            .result
            .ok_or_else(|| DocumentError::Store("collection info missing result".to_string()))?;

        let dimension = extract_dimension(result.config).ok_or_else(|| {
            DocumentError::Store(format!(
                "collection '{}' has an incompatible vector configuration",
                name
            ))
        })?;

        Ok(Some(CollectionInfo {
            name: name.to_string(),
            dimension,
        }))
    }

    async fn list_collections(&self) -> DocumentResult<Vec<String>> {
        let response = self
            .client
            .list_collections()
            .await
            .map_err(|e| DocumentError::Store(e.to_string()))?;

        Ok(response
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    async fn delete_collection(&self, name: &str) -> DocumentResult<bool> {
        let exists = self
            .client
            .collection_exists(name)
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        if !exists {
            return Ok(false);
        }

        let response = self
            .client
            .delete_collection(name)
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        Ok(response.result)
    }

    async fn count(&self, name: &str) -> DocumentResult<u64> {
        let response = self
            .client
            .count(CountPointsBuilder::new(name).exact(true))
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn fetch(&self, name: &str, ids: &[String]) -> DocumentResult<Vec<StoredDocument>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let point_ids: Vec<PointId> = ids.iter().map(|id| Self::point_id(id)).collect();

        let response = self
            .client
            .get_points(GetPointsBuilder::new(name, point_ids).with_payload(true))
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        Ok(response
            .result
            .iter()
            .filter_map(|point| Self::parse_payload(&point.payload))
            .collect())
    }

    async fn list(
        &self,
        name: &str,
        options: ListOptions,
    ) -> DocumentResult<Vec<StoredDocument>> {
        let filter = Self::list_filter(&options)?;
        let skip = options.offset.unwrap_or(0) as usize;
        let take = options.limit.map(|limit| limit as usize);

        // The store scrolls by point-id cursor, not numeric offset, so the
        // offset is emulated by reading past it and skipping client-side.
        let mut collected: Vec<StoredDocument> = Vec::new();
        let mut cursor: Option<PointId> = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(name)
                .limit(SCROLL_PAGE)
                .with_payload(true);
            if let Some(filter) = filter.clone() {
                builder = builder.filter(filter);
            }
            if let Some(cursor) = cursor.clone() {
                builder = builder.offset(cursor);
            }

            let response = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| translate_store_error(name, &e))?;

            collected.extend(
                response
                    .result
                    .iter()
                    .filter_map(|point| Self::parse_payload(&point.payload)),
            );

            let enough = take.is_some_and(|take| collected.len() >= skip + take);
            match response.next_page_offset {
                Some(next) if !enough => cursor = Some(next),
                _ => break,
            }
        }

        let remaining = collected.into_iter().skip(skip);
        Ok(match take {
            Some(take) => remaining.take(take).collect(),
            None => remaining.collect(),
        })
    }

    async fn upsert(&self, name: &str, documents: Vec<NewDocument>) -> DocumentResult<()> {
        let points: Vec<PointStruct> = documents
            .iter()
            .map(|doc| {
                PointStruct::new(
                    Self::point_id(&doc.id),
                    doc.vector.clone(),
                    Self::build_payload(doc),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(name, points).wait(true))
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        Ok(())
    }

    async fn delete(&self, name: &str, ids: &[String]) -> DocumentResult<u64> {
        let point_ids: Vec<PointId> = ids.iter().map(|id| Self::point_id(id)).collect();
        let count = point_ids.len() as u64;

        self.client
            .delete_points(DeletePointsBuilder::new(name).points(point_ids).wait(true))
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        Ok(count)
    }

    async fn query(
        &self,
        name: &str,
        vector: Vec<f32>,
        n_results: u32,
        filter: Option<serde_json::Value>,
    ) -> DocumentResult<Vec<QueryHit>> {
        let mut builder =
            SearchPointsBuilder::new(name, vector, n_results as u64).with_payload(true);

        if let Some(where_doc) = &filter {
            builder = builder.filter(translate_where(where_doc)?);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| translate_store_error(name, &e))?;

        Ok(response
            .result
            .iter()
            .filter_map(|point| {
                let stored = Self::parse_payload(&point.payload)?;
                Some(QueryHit {
                    id: stored.id,
                    // The store reports cosine similarity; callers expect a
                    // distance where smaller means closer.
                    distance: 1.0 - point.score,
                    document: stored.document,
                    metadata: stored.metadata,
                })
            })
            .collect())
    }

    async fn heartbeat(&self) -> DocumentResult<String> {
        let reply = self
            .client
            .health_check()
            .await
            .map_err(|e| DocumentError::Store(e.to_string()))?;

        Ok(format!("{} {}", reply.title, reply.version))
    }

    async fn reset(&self) -> DocumentResult<u64> {
        let collections = self.list_collections().await?;
        let mut dropped = 0;

        for name in collections {
            let response = self
                .client
                .delete_collection(&name)
                .await
                .map_err(|e| translate_store_error(&name, &e))?;
            if response.result {
                dropped += 1;
            }
        }

        Ok(dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn point_ids_are_deterministic() {
        assert_eq!(QdrantStore::point_id("x1"), QdrantStore::point_id("x1"));
        assert_ne!(QdrantStore::point_id("x1"), QdrantStore::point_id("x2"));
    }

    #[test]
    fn payload_roundtrip_preserves_document_and_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("tag".to_string(), json!("a"));
        metadata.insert("year".to_string(), json!(2024));
        metadata.insert("flag".to_string(), json!(true));
        metadata.insert("gone".to_string(), json!(null));

        let doc = NewDocument {
            id: "x1".to_string(),
            vector: vec![0.0; 4],
            document: "hello".to_string(),
            metadata: Some(metadata),
        };

        let payload = QdrantStore::build_payload(&doc);
        let parsed = QdrantStore::parse_payload(&payload).unwrap();

        assert_eq!(parsed.id, "x1");
        assert_eq!(parsed.document, "hello");
        let parsed_meta = parsed.metadata.unwrap();
        assert_eq!(parsed_meta.get("tag"), Some(&json!("a")));
        assert_eq!(parsed_meta.get("year"), Some(&json!(2024)));
        assert_eq!(parsed_meta.get("flag"), Some(&json!(true)));
        assert_eq!(parsed_meta.get("gone"), Some(&json!(null)));
    }

    #[test]
    fn payload_without_reserved_fields_is_skipped() {
        let mut payload = HashMap::new();
        payload.insert("foreign".to_string(), QdrantValue::from("data".to_string()));
        assert!(QdrantStore::parse_payload(&payload).is_none());
    }

    #[test]
    fn store_messages_mentioning_absence_map_to_not_found() {
        for msg in [
            "Collection `docs` doesn't exist!",
            "collection does not exist",
            "Not found: docs",
        ] {
            let translated = classify_store_message("docs", msg);
            assert!(matches!(translated, DocumentError::CollectionNotFound(_)));
        }

        let translated = classify_store_message("docs", "deadline exceeded");
        assert!(matches!(translated, DocumentError::Store(_)));
    }
}
