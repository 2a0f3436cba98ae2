//! Batch-upsert planning: per-record insert-vs-update classification and
//! metadata merging.

use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use crate::error::{DocumentError, DocumentResult};
use crate::models::{Metadata, UpsertStatus};
use crate::sanitize::sanitize_metadata;

/// A record with its final id, merged metadata and classification, ready to
/// be embedded and upserted.
#[derive(Debug, Clone)]
pub struct PlannedRecord {
    pub id: String,
    pub document: String,
    pub metadata: Option<Metadata>,
    pub status: UpsertStatus,
}

/// Validate the shape of a batch before touching the store.
///
/// `ids` may be shorter than `documents` (missing positions get generated
/// ids) but never longer. `metadatas`, when present, must match the document
/// count exactly.
pub fn check_batch_shape(
    documents: &[String],
    ids: Option<&[Option<String>]>,
    metadatas: Option<&[Option<Value>]>,
) -> DocumentResult<()> {
    if documents.is_empty() {
        return Err(DocumentError::Validation(
            "Documents array is required".to_string(),
        ));
    }

    if let Some(ids) = ids {
        if ids.len() > documents.len() {
            return Err(DocumentError::Validation(format!(
                "ids length ({}) exceeds documents length ({})",
                ids.len(),
                documents.len()
            )));
        }
    }

    if let Some(metadatas) = metadatas {
        if metadatas.len() != documents.len() {
            return Err(DocumentError::Validation(format!(
                "metadatas length ({}) does not match documents length ({})",
                metadatas.len(),
                documents.len()
            )));
        }
    }

    Ok(())
}

/// The subset of caller-supplied ids that actually name a record. Empty
/// strings mean "no id supplied", same as a missing entry.
pub fn supplied_ids(ids: Option<&[Option<String>]>) -> Vec<String> {
    ids.map(|ids| {
        ids.iter()
            .filter_map(|id| id.as_deref())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Build the upsert plan for a validated batch.
///
/// `existing` maps pre-existing ids to their stored metadata; records whose
/// supplied id appears there are classified `updated`, everything else is
/// `inserted`. For updates, new metadata is merged over the stored metadata
/// with new keys winning; without new metadata the stored metadata is carried
/// forward unchanged.
pub fn plan_batch(
    documents: &[String],
    ids: Option<&[Option<String>]>,
    metadatas: Option<&[Option<Value>]>,
    existing: &HashMap<String, Option<Metadata>>,
) -> Vec<PlannedRecord> {
    documents
        .iter()
        .enumerate()
        .map(|(i, document)| {
            let supplied = ids
                .and_then(|ids| ids.get(i))
                .and_then(|id| id.as_deref())
                .filter(|id| !id.is_empty());

            let id = supplied
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            let incoming = sanitize_metadata(
                metadatas
                    .and_then(|metadatas| metadatas.get(i))
                    .and_then(|m| m.as_ref()),
            );

            let (status, metadata) = match existing.get(&id) {
                Some(stored) => (
                    UpsertStatus::Updated,
                    merge_metadata(stored.as_ref(), incoming),
                ),
                None => (UpsertStatus::Inserted, incoming),
            };

            PlannedRecord {
                id,
                document: document.clone(),
                metadata,
                status,
            }
        })
        .collect()
}

/// Merge incoming metadata over what is already stored, incoming keys taking
/// precedence. `None` incoming carries the stored metadata forward.
pub fn merge_metadata(stored: Option<&Metadata>, incoming: Option<Metadata>) -> Option<Metadata> {
    match (stored, incoming) {
        (Some(stored), Some(incoming)) => {
            let mut merged = stored.clone();
            for (key, value) in incoming {
                merged.insert(key, value);
            }
            Some(merged)
        }
        (Some(stored), None) => Some(stored.clone()),
        (None, incoming) => incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: Value) -> Metadata {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn empty_documents_rejected() {
        let err = check_batch_shape(&[], None, None).unwrap_err();
        assert!(matches!(err, DocumentError::Validation(_)));
    }

    #[test]
    fn ids_longer_than_documents_rejected() {
        let docs = vec!["a".to_string()];
        let ids = vec![Some("x".to_string()), Some("y".to_string())];
        let err = check_batch_shape(&docs, Some(&ids), None).unwrap_err();
        assert!(matches!(err, DocumentError::Validation(_)));
    }

    #[test]
    fn metadatas_length_mismatch_rejected() {
        let docs = vec!["a".to_string(), "b".to_string()];
        let metas = vec![Some(json!({"k": 1}))];
        let err = check_batch_shape(&docs, None, Some(&metas)).unwrap_err();
        assert!(matches!(err, DocumentError::Validation(_)));
    }

    #[test]
    fn ids_shorter_than_documents_allowed() {
        let docs = vec!["a".to_string(), "b".to_string()];
        let ids = vec![Some("x".to_string())];
        assert!(check_batch_shape(&docs, Some(&ids), None).is_ok());
    }

    #[test]
    fn supplied_ids_skips_empty_and_missing() {
        let ids = vec![
            Some("x1".to_string()),
            None,
            Some(String::new()),
            Some("x2".to_string()),
        ];
        assert_eq!(supplied_ids(Some(&ids)), vec!["x1", "x2"]);
        assert!(supplied_ids(None).is_empty());
    }

    #[test]
    fn new_record_is_inserted_with_sanitized_metadata() {
        let docs = vec!["hello".to_string()];
        let ids = vec![Some("x1".to_string())];
        let metas = vec![Some(json!({"tag": "a", "nums": [1, 2]}))];

        let plan = plan_batch(&docs, Some(&ids), Some(&metas), &HashMap::new());

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].id, "x1");
        assert_eq!(plan[0].status, UpsertStatus::Inserted);
        let metadata = plan[0].metadata.as_ref().unwrap();
        assert_eq!(metadata.get("tag"), Some(&json!("a")));
        assert_eq!(metadata.get("nums"), Some(&json!("[1,2]")));
    }

    #[test]
    fn existing_record_is_updated_and_keeps_stored_metadata() {
        let docs = vec!["replacement".to_string()];
        let ids = vec![Some("x1".to_string())];
        let mut existing = HashMap::new();
        existing.insert("x1".to_string(), Some(meta(json!({"tag": "a"}))));

        let plan = plan_batch(&docs, Some(&ids), None, &existing);

        assert_eq!(plan[0].status, UpsertStatus::Updated);
        assert_eq!(
            plan[0].metadata.as_ref().unwrap().get("tag"),
            Some(&json!("a"))
        );
    }

    #[test]
    fn update_merges_new_keys_over_stored() {
        let docs = vec!["doc".to_string()];
        let ids = vec![Some("x1".to_string())];
        let metas = vec![Some(json!({"tag": "b", "extra": 2}))];
        let mut existing = HashMap::new();
        existing.insert(
            "x1".to_string(),
            Some(meta(json!({"tag": "a", "kept": true}))),
        );

        let plan = plan_batch(&docs, Some(&ids), Some(&metas), &existing);

        let metadata = plan[0].metadata.as_ref().unwrap();
        assert_eq!(metadata.get("tag"), Some(&json!("b")));
        assert_eq!(metadata.get("kept"), Some(&json!(true)));
        assert_eq!(metadata.get("extra"), Some(&json!(2)));
    }

    #[test]
    fn missing_ids_generate_uuids() {
        let docs = vec!["a".to_string(), "b".to_string()];
        let ids = vec![Some("x1".to_string())];

        let plan = plan_batch(&docs, Some(&ids), None, &HashMap::new());

        assert_eq!(plan[0].id, "x1");
        assert!(Uuid::parse_str(&plan[1].id).is_ok());
        assert_eq!(plan[1].status, UpsertStatus::Inserted);
    }

    #[test]
    fn empty_string_id_generates_uuid() {
        let docs = vec!["a".to_string()];
        let ids = vec![Some(String::new())];

        let plan = plan_batch(&docs, Some(&ids), None, &HashMap::new());

        assert!(Uuid::parse_str(&plan[0].id).is_ok());
    }

    #[test]
    fn order_mirrors_input() {
        let docs: Vec<String> = (0..5).map(|i| format!("doc{i}")).collect();
        let plan = plan_batch(&docs, None, None, &HashMap::new());
        let bodies: Vec<&str> = plan.iter().map(|r| r.document.as_str()).collect();
        assert_eq!(bodies, vec!["doc0", "doc1", "doc2", "doc3", "doc4"]);
    }
}
