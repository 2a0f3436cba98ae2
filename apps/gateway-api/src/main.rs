//! Gateway API - REST facade over the vector store

use std::sync::Arc;

use axum::{Json, routing::get};
use axum_helpers::server::{create_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_documents::{DocumentService, OpenAiEmbedder, QdrantStore, handlers};
use serde_json::json;
use tracing::info;

mod config;
mod middleware;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to vector store at {}", config.qdrant.url);

    let store = QdrantStore::connect(config.qdrant.clone())?;
    let embedder = Arc::new(OpenAiEmbedder::new(config.embedding.clone())?);
    let service = Arc::new(DocumentService::new(store, embedder));

    let app_info = config.app;
    let api = handlers::router(service.clone())
        .route(
            "/",
            get(move || async move {
                Json(json!({ "message": app_info.name, "version": app_info.version }))
            }),
        )
        .layer(axum::middleware::from_fn_with_state(
            Arc::new(config.api_key.clone()),
            middleware::require_api_key,
        ));

    // Health stays outside the auth layer.
    let routes = api.merge(handlers::health_router(service));
    let app = create_router::<handlers::GatewayApiDoc>(routes);

    info!(
        "Starting {} v{} on {}",
        config.app.name,
        config.app.version,
        config.server.address()
    );

    create_app(app, &config.server).await?;

    info!("Gateway shutdown complete");
    Ok(())
}
