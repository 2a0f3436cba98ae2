use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Flat metadata mapping: string keys to scalar JSON values.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Collection handle as seen through the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionInfo {
    pub name: String,
    /// Vector dimension of the underlying index.
    pub dimension: u64,
}

/// A document as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredDocument {
    pub id: String,
    pub document: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

/// A fully prepared record ready for a batched upsert.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: String,
    pub vector: Vec<f32>,
    pub document: String,
    pub metadata: Option<Metadata>,
}

/// Options for listing documents in a collection.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub ids: Option<Vec<String>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub filter: Option<serde_json::Value>,
}

/// Per-record outcome of a batch upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpsertOutcome {
    pub id: String,
    pub status: UpsertStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UpsertStatus {
    Inserted,
    Updated,
}

impl UpsertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertStatus::Inserted => "inserted",
            UpsertStatus::Updated => "updated",
        }
    }
}

/// A single nearest-neighbor hit.
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub id: String,
    pub distance: f32,
    pub document: String,
    pub metadata: Option<Metadata>,
}

/// Result fields a query may ask for. Defaults to documents, metadatas
/// and distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IncludeField {
    Documents,
    Metadatas,
    Distances,
}

impl IncludeField {
    pub fn default_set() -> Vec<IncludeField> {
        vec![
            IncludeField::Documents,
            IncludeField::Metadatas,
            IncludeField::Distances,
        ]
    }
}

/// Query results grouped per input text, excluded fields left as empty
/// containers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryOutput {
    /// Document bodies per query group (the `results` field on the wire).
    pub documents: Vec<Vec<String>>,
    pub ids: Vec<Vec<String>>,
    pub metadatas: Vec<Vec<Option<Metadata>>>,
    pub distances: Vec<Vec<f32>>,
    /// Total hits across all groups.
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(UpsertStatus::Inserted).unwrap(),
            serde_json::json!("inserted")
        );
        assert_eq!(
            serde_json::to_value(UpsertStatus::Updated).unwrap(),
            serde_json::json!("updated")
        );
    }

    #[test]
    fn include_field_deserializes_lowercase() {
        let fields: Vec<IncludeField> =
            serde_json::from_str(r#"["documents", "distances"]"#).unwrap();
        assert_eq!(
            fields,
            vec![IncludeField::Documents, IncludeField::Distances]
        );
    }
}
