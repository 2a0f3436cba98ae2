//! Collection management handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{DocumentError, DocumentResult};
use crate::service::DocumentService;
use crate::store::DocumentStore;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCollectionRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionCreatedResponse {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionSummary {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionsResponse {
    pub collections: Vec<CollectionSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionDetailResponse {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Create a new collection
#[utoipa::path(
    post,
    path = "/collections",
    tag = "collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = CollectionCreatedResponse),
        (status = 400, description = "Collection name missing"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_collection<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
    Json(request): Json<CreateCollectionRequest>,
) -> DocumentResult<impl IntoResponse> {
    let name = request
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| DocumentError::Validation("Collection name is required".to_string()))?;

    let collection = service.create_collection(&name).await?;

    Ok((
        StatusCode::CREATED,
        Json(CollectionCreatedResponse {
            name: collection.name,
            message: "Collection created".to_string(),
        }),
    ))
}

/// List all collections
#[utoipa::path(
    get,
    path = "/collections",
    tag = "collections",
    responses(
        (status = 200, description = "List of collections", body = CollectionsResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_collections<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
) -> DocumentResult<Json<CollectionsResponse>> {
    let collections = service.list_collections().await?;

    Ok(Json(CollectionsResponse {
        collections: collections
            .into_iter()
            .map(|name| CollectionSummary { name })
            .collect(),
    }))
}

/// Get collection details with its document count
#[utoipa::path(
    get,
    path = "/collections/{name}",
    tag = "collections",
    params(("name" = String, Path, description = "Collection name")),
    responses(
        (status = 200, description = "Collection details", body = CollectionDetailResponse),
        (status = 404, description = "Collection not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_collection<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
    Path(name): Path<String>,
) -> DocumentResult<Json<CollectionDetailResponse>> {
    let count = service.collection_count(&name).await?;

    Ok(Json(CollectionDetailResponse { name, count }))
}

/// Delete a collection
#[utoipa::path(
    delete,
    path = "/collections/{name}",
    tag = "collections",
    params(("name" = String, Path, description = "Collection name")),
    responses(
        (status = 200, description = "Collection deleted", body = MessageResponse),
        (status = 404, description = "Collection not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_collection<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
    Path(name): Path<String>,
) -> DocumentResult<Json<MessageResponse>> {
    service.delete_collection(&name).await?;

    Ok(Json(MessageResponse {
        message: format!("Collection {} deleted", name),
    }))
}
