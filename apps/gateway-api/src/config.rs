//! Configuration for the gateway API

use core_config::{app_info, env_required, server::ServerConfig, AppInfo, FromEnv};
use domain_documents::{EmbeddingConfig, QdrantConfig};

pub use core_config::Environment;

/// Application configuration, read once at startup and immutable afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub qdrant: QdrantConfig,
    pub embedding: EmbeddingConfig,
    /// Inbound credential every request except /health must present.
    pub api_key: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let qdrant = QdrantConfig::from_env()?;
        let embedding = EmbeddingConfig::from_env()?;
        let api_key = env_required("API_KEY")?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            qdrant,
            embedding,
            api_key,
        })
    }
}
