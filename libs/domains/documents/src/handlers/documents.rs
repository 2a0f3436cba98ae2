//! Document handlers: batch upsert, listing, single-document access

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::collections::MessageResponse;
use crate::error::{DocumentError, DocumentResult};
use crate::models::{ListOptions, Metadata, UpsertOutcome};
use crate::service::DocumentService;
use crate::store::DocumentStore;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddDocumentsRequest {
    pub documents: Option<Vec<String>>,
    /// Caller-supplied ids; null or empty entries get generated ids.
    pub ids: Option<Vec<Option<String>>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub metadatas: Option<Vec<Option<serde_json::Value>>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddDocumentsResponse {
    pub message: String,
    pub results: Vec<UpsertOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct ListDocumentsParams {
    /// Comma-separated list of document ids
    pub ids: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// JSON-encoded where filter
    #[serde(rename = "where")]
    pub where_: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentPageResponse {
    pub documents: Vec<String>,
    pub ids: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub metadatas: Vec<Option<Metadata>>,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: String,
    pub document: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDocumentRequest {
    pub document: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentUpdatedResponse {
    pub message: String,
    pub id: String,
}

/// Batch upsert documents into a collection
#[utoipa::path(
    post,
    path = "/collections/{name}/documents",
    tag = "documents",
    params(("name" = String, Path, description = "Collection name")),
    request_body = AddDocumentsRequest,
    responses(
        (status = 200, description = "Per-record upsert outcomes", body = AddDocumentsResponse),
        (status = 400, description = "Shape or length mismatch"),
        (status = 404, description = "Collection not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn add_documents<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
    Path(name): Path<String>,
    Json(request): Json<AddDocumentsRequest>,
) -> DocumentResult<Json<AddDocumentsResponse>> {
    let documents = request
        .documents
        .filter(|docs| !docs.is_empty())
        .ok_or_else(|| DocumentError::Validation("Documents array is required".to_string()))?;

    let results = service
        .add_documents(&name, documents, request.ids, request.metadatas)
        .await?;

    Ok(Json(AddDocumentsResponse {
        message: "Documents upserted successfully".to_string(),
        results,
    }))
}

/// List documents in a collection
#[utoipa::path(
    get,
    path = "/collections/{name}/documents",
    tag = "documents",
    params(
        ("name" = String, Path, description = "Collection name"),
        ("ids" = Option<String>, Query, description = "Comma-separated document ids"),
        ("limit" = Option<u32>, Query, description = "Maximum number of documents"),
        ("offset" = Option<u32>, Query, description = "Number of documents to skip"),
        ("where" = Option<String>, Query, description = "JSON-encoded metadata filter")
    ),
    responses(
        (status = 200, description = "Documents in the collection", body = DocumentPageResponse),
        (status = 400, description = "Malformed where filter"),
        (status = 404, description = "Collection not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_documents<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
    Path(name): Path<String>,
    Query(params): Query<ListDocumentsParams>,
) -> DocumentResult<Json<DocumentPageResponse>> {
    let ids = params
        .ids
        .map(|csv| csv.split(',').map(str::to_string).collect());

    let filter = params
        .where_
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|e| {
                DocumentError::Validation(format!("invalid where filter: {}", e))
            })
        })
        .transpose()?;

    let documents = service
        .list_documents(
            &name,
            ListOptions {
                ids,
                limit: params.limit,
                offset: params.offset,
                filter,
            },
        )
        .await?;

    let count = documents.len();
    let mut page = DocumentPageResponse {
        documents: Vec::with_capacity(count),
        ids: Vec::with_capacity(count),
        metadatas: Vec::with_capacity(count),
        count,
    };
    for doc in documents {
        page.ids.push(doc.id);
        page.documents.push(doc.document);
        page.metadatas.push(doc.metadata);
    }

    Ok(Json(page))
}

/// Fetch a single document
#[utoipa::path(
    get,
    path = "/collections/{name}/documents/{id}",
    tag = "documents",
    params(
        ("name" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "Document id")
    ),
    responses(
        (status = 200, description = "The document", body = DocumentResponse),
        (status = 404, description = "Collection or document not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_document<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
    Path((name, id)): Path<(String, String)>,
) -> DocumentResult<Json<DocumentResponse>> {
    let document = service.get_document(&name, &id).await?;

    Ok(Json(DocumentResponse {
        id: document.id,
        document: document.document,
        metadata: document.metadata,
    }))
}

/// Update a single document, preserving unspecified fields
#[utoipa::path(
    patch,
    path = "/collections/{name}/documents/{id}",
    tag = "documents",
    params(
        ("name" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "Document id")
    ),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Document updated", body = DocumentUpdatedResponse),
        (status = 404, description = "Collection or document not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_document<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
    Path((name, id)): Path<(String, String)>,
    Json(request): Json<UpdateDocumentRequest>,
) -> DocumentResult<Json<DocumentUpdatedResponse>> {
    service
        .update_document(&name, &id, request.document, request.metadata)
        .await?;

    Ok(Json(DocumentUpdatedResponse {
        message: "Document updated successfully".to_string(),
        id,
    }))
}

/// Delete a single document
#[utoipa::path(
    delete,
    path = "/collections/{name}/documents/{id}",
    tag = "documents",
    params(
        ("name" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "Document id")
    ),
    responses(
        (status = 200, description = "Document deleted", body = MessageResponse),
        (status = 404, description = "Collection or document not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_document<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
    Path((name, id)): Path<(String, String)>,
) -> DocumentResult<Json<MessageResponse>> {
    service.delete_document(&name, &id).await?;

    Ok(Json(MessageResponse {
        message: format!("Document {} deleted successfully", id),
    }))
}
