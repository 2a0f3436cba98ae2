//! Similarity query handler

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{DocumentError, DocumentResult};
use crate::models::{IncludeField, Metadata};
use crate::service::DocumentService;
use crate::store::DocumentStore;

const DEFAULT_N_RESULTS: u32 = 10;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query_texts: Option<Vec<String>>,
    pub n_results: Option<u32>,
    #[schema(value_type = Option<Object>)]
    #[serde(rename = "where")]
    pub where_: Option<serde_json::Value>,
    pub include: Option<Vec<IncludeField>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponseBody {
    /// Document bodies per query text
    pub results: Vec<Vec<String>>,
    pub ids: Vec<Vec<String>>,
    #[schema(value_type = Vec<Vec<Object>>)]
    pub metadatas: Vec<Vec<Option<Metadata>>>,
    pub distances: Vec<Vec<f32>>,
    pub query_texts: Vec<String>,
    pub count: usize,
}

/// Semantic similarity query against a collection
#[utoipa::path(
    post,
    path = "/collections/{name}/query",
    tag = "query",
    params(("name" = String, Path, description = "Collection name")),
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Query results", body = QueryResponseBody),
        (status = 400, description = "queryTexts missing or empty"),
        (status = 404, description = "Collection not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn query_collection<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
    Path(name): Path<String>,
    Json(request): Json<QueryRequest>,
) -> DocumentResult<Json<QueryResponseBody>> {
    let query_texts = request
        .query_texts
        .filter(|texts| !texts.is_empty())
        .ok_or_else(|| DocumentError::Validation("queryTexts array is required".to_string()))?;

    let output = service
        .query(
            &name,
            query_texts.clone(),
            request.n_results.unwrap_or(DEFAULT_N_RESULTS),
            request.where_,
            request.include,
        )
        .await?;

    Ok(Json(QueryResponseBody {
        results: output.documents,
        ids: output.ids,
        metadatas: output.metadatas,
        distances: output.distances,
        query_texts,
        count: output.count,
    }))
}
