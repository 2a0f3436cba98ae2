pub mod collections;
pub mod documents;
pub mod health;
pub mod query;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;

use crate::service::DocumentService;
use crate::store::DocumentStore;

/// OpenAPI documentation for the gateway API
#[derive(OpenApi)]
#[openapi(
    paths(
        collections::create_collection,
        collections::list_collections,
        collections::get_collection,
        collections::delete_collection,
        documents::add_documents,
        documents::list_documents,
        documents::get_document,
        documents::update_document,
        documents::delete_document,
        query::query_collection,
        health::health,
    ),
    components(schemas(
        collections::CreateCollectionRequest,
        collections::CollectionCreatedResponse,
        collections::CollectionSummary,
        collections::CollectionsResponse,
        collections::CollectionDetailResponse,
        collections::MessageResponse,
        documents::AddDocumentsRequest,
        documents::AddDocumentsResponse,
        documents::DocumentPageResponse,
        documents::DocumentResponse,
        documents::UpdateDocumentRequest,
        documents::DocumentUpdatedResponse,
        query::QueryRequest,
        query::QueryResponseBody,
    )),
    tags(
        (name = "collections", description = "Collection management"),
        (name = "documents", description = "Document storage"),
        (name = "query", description = "Semantic similarity queries"),
        (name = "health", description = "Liveness")
    )
)]
pub struct GatewayApiDoc;

/// Router for all authenticated gateway routes
pub fn router<S: DocumentStore + 'static>(service: Arc<DocumentService<S>>) -> Router {
    Router::new()
        .route(
            "/collections",
            get(collections::list_collections::<S>).post(collections::create_collection::<S>),
        )
        .route(
            "/collections/{name}",
            get(collections::get_collection::<S>).delete(collections::delete_collection::<S>),
        )
        .route(
            "/collections/{name}/documents",
            get(documents::list_documents::<S>).post(documents::add_documents::<S>),
        )
        .route(
            "/collections/{name}/documents/{id}",
            get(documents::get_document::<S>)
                .patch(documents::update_document::<S>)
                .delete(documents::delete_document::<S>),
        )
        .route("/collections/{name}/query", post(query::query_collection::<S>))
        .with_state(service)
}

/// Router for the unauthenticated health endpoint
pub fn health_router<S: DocumentStore + 'static>(service: Arc<DocumentService<S>>) -> Router {
    Router::new()
        .route("/health", get(health::health::<S>))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbedder;
    use crate::error::DocumentError;
    use crate::models::{CollectionInfo, QueryHit, StoredDocument};
    use crate::store::MockDocumentStore;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const DIM: u64 = 1536;

    fn embedder() -> Arc<MockEmbedder> {
        let mut mock = MockEmbedder::new();
        mock.expect_dimension().return_const(DIM);
        mock.expect_embed_batch()
            .returning(|texts| Ok(texts.iter().map(|_| vec![0.1, 0.2]).collect()));
        Arc::new(mock)
    }

    fn app(store: MockDocumentStore) -> Router {
        router(Arc::new(DocumentService::new(store, embedder())))
    }

    fn collection(name: &str) -> CollectionInfo {
        CollectionInfo {
            name: name.to_string(),
            dimension: DIM,
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_collection_requires_name() {
        let response = app(MockDocumentStore::new())
            .oneshot(json_request("POST", "/collections", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_collection_returns_201() {
        let mut store = MockDocumentStore::new();
        store
            .expect_create_collection()
            .returning(|name, dimension| {
                Ok(CollectionInfo {
                    name: name.to_string(),
                    dimension,
                })
            });

        let response = app(store)
            .oneshot(json_request("POST", "/collections", json!({"name": "docs"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["name"], "docs");
        assert_eq!(body["message"], "Collection created");
    }

    #[tokio::test]
    async fn get_missing_collection_returns_404() {
        let mut store = MockDocumentStore::new();
        store.expect_get_collection().returning(|_| Ok(None));

        let response = app(store)
            .oneshot(get_request("/collections/ghost"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_collection_returns_count() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));
        store.expect_count().returning(|_| Ok(42));

        let response = app(store)
            .oneshot(get_request("/collections/docs"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body, json!({"name": "docs", "count": 42}));
    }

    #[tokio::test]
    async fn list_collections_wraps_names() {
        let mut store = MockDocumentStore::new();
        store
            .expect_list_collections()
            .returning(|| Ok(vec!["a".to_string(), "b".to_string()]));

        let response = app(store).oneshot(get_request("/collections")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(
            body,
            json!({"collections": [{"name": "a"}, {"name": "b"}]})
        );
    }

    #[tokio::test]
    async fn delete_missing_collection_returns_404() {
        let mut store = MockDocumentStore::new();
        store.expect_delete_collection().returning(|_| Ok(false));

        let response = app(store)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/collections/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn add_documents_requires_documents_array() {
        let response = app(MockDocumentStore::new())
            .oneshot(json_request(
                "POST",
                "/collections/docs/documents",
                json!({}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn add_documents_rejects_length_mismatch() {
        let response = app(MockDocumentStore::new())
            .oneshot(json_request(
                "POST",
                "/collections/docs/documents",
                json!({
                    "documents": ["only one"],
                    "ids": ["x1", "x2"]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app(MockDocumentStore::new())
            .oneshot(json_request(
                "POST",
                "/collections/docs/documents",
                json!({
                    "documents": ["a", "b"],
                    "metadatas": [{"k": 1}]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn add_documents_reports_per_record_status() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));
        store.expect_fetch().returning(|_, _| {
            Ok(vec![StoredDocument {
                id: "x1".to_string(),
                document: "old".to_string(),
                metadata: None,
            }])
        });
        store.expect_upsert().returning(|_, _| Ok(()));

        let response = app(store)
            .oneshot(json_request(
                "POST",
                "/collections/docs/documents",
                json!({
                    "documents": ["hello", "world"],
                    "ids": ["x1", null]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["results"][0]["id"], "x1");
        assert_eq!(body["results"][0]["status"], "updated");
        assert_eq!(body["results"][1]["status"], "inserted");
    }

    #[tokio::test]
    async fn list_documents_passes_parsed_params() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));
        store
            .expect_list()
            .withf(|_, options| {
                options.ids == Some(vec!["a".to_string(), "b".to_string()])
                    && options.limit == Some(5)
                    && options.offset == Some(2)
                    && options.filter == Some(json!({"tag": "x"}))
            })
            .returning(|_, _| Ok(vec![]));

        let response = app(store)
            .oneshot(get_request(
                "/collections/docs/documents?ids=a,b&limit=5&offset=2&where=%7B%22tag%22%3A%22x%22%7D",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn list_documents_rejects_malformed_where() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));

        let response = app(store)
            .oneshot(get_request("/collections/docs/documents?where=notjson"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_missing_document_returns_404() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));
        store.expect_fetch().returning(|_, _| Ok(vec![]));

        let response = app(store)
            .oneshot(get_request("/collections/docs/documents/ghost"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_document_returns_record() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));
        store.expect_fetch().returning(|_, _| {
            Ok(vec![StoredDocument {
                id: "x1".to_string(),
                document: "hello".to_string(),
                metadata: Some(json!({"tag": "a"}).as_object().unwrap().clone()),
            }])
        });

        let response = app(store)
            .oneshot(get_request("/collections/docs/documents/x1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(
            body,
            json!({"id": "x1", "document": "hello", "metadata": {"tag": "a"}})
        );
    }

    #[tokio::test]
    async fn delete_missing_document_returns_404_not_500() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));
        store.expect_fetch().returning(|_, _| Ok(vec![]));

        let response = app(store)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/collections/docs/documents/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_document_returns_confirmation() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));
        store.expect_fetch().returning(|_, _| {
            Ok(vec![StoredDocument {
                id: "x1".to_string(),
                document: "old".to_string(),
                metadata: None,
            }])
        });
        store.expect_upsert().returning(|_, _| Ok(()));

        let response = app(store)
            .oneshot(json_request(
                "PATCH",
                "/collections/docs/documents/x1",
                json!({"document": "new body"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["id"], "x1");
    }

    #[tokio::test]
    async fn query_requires_texts() {
        let response = app(MockDocumentStore::new())
            .oneshot(json_request(
                "POST",
                "/collections/docs/query",
                json!({"queryTexts": []}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn query_empty_collection_returns_empty_envelope() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));
        store.expect_query().returning(|_, _, _, _| Ok(vec![]));

        let response = app(store)
            .oneshot(json_request(
                "POST",
                "/collections/docs/query",
                json!({"queryTexts": ["anything"]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["count"], 0);
        assert_eq!(body["ids"], json!([[]]));
        assert_eq!(body["queryTexts"], json!(["anything"]));
    }

    #[tokio::test]
    async fn query_returns_grouped_hits() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_collection()
            .returning(|name| Ok(Some(collection(name))));
        store
            .expect_query()
            .withf(|_, _, n_results, _| *n_results == 3)
            .returning(|_, _, _, _| {
                Ok(vec![QueryHit {
                    id: "x1".to_string(),
                    distance: 0.1,
                    document: "hello".to_string(),
                    metadata: None,
                }])
            });

        let response = app(store)
            .oneshot(json_request(
                "POST",
                "/collections/docs/query",
                json!({"queryTexts": ["greeting"], "nResults": 3}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["results"], json!([["hello"]]));
        assert_eq!(body["ids"], json!([["x1"]]));
    }

    #[tokio::test]
    async fn health_reports_store_heartbeat() {
        let mut store = MockDocumentStore::new();
        store
            .expect_heartbeat()
            .returning(|| Ok("qdrant 1.15.0".to_string()));

        let response = health_router(Arc::new(DocumentService::new(store, embedder())))
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["heartbeat"], "qdrant 1.15.0");
    }

    #[tokio::test]
    async fn health_surfaces_store_failure() {
        let mut store = MockDocumentStore::new();
        store
            .expect_heartbeat()
            .returning(|| Err(DocumentError::Store("connection refused".to_string())));

        let response = health_router(Arc::new(DocumentService::new(store, embedder())))
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn store_failures_surface_as_500() {
        let mut store = MockDocumentStore::new();
        store
            .expect_list_collections()
            .returning(|| Err(DocumentError::Store("connection refused".to_string())));

        let response = app(store).oneshot(get_request("/collections")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response.into_body()).await;
        assert!(body["message"].as_str().unwrap().contains("connection refused"));
    }
}
