use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Document '{0}' not found")]
    DocumentNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

impl DocumentError {
    /// Whether a store failure looks like a vector-configuration mismatch
    /// between the stored collection and the configured embedding model.
    /// The resolver retries these through create-or-get instead of failing.
    pub fn is_schema_mismatch(&self) -> bool {
        match self {
            DocumentError::Store(msg) => {
                let lower = msg.to_lowercase();
                lower.contains("incompatible vector configuration")
                    || lower.contains("dimension error")
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DocumentError {
    fn from(err: reqwest::Error) -> Self {
        DocumentError::Embedding(err.to_string())
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Internal(format!("JSON error: {}", err))
    }
}

/// Convert DocumentError to AppError for standardized HTTP error responses
impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::CollectionNotFound(name) => {
                AppError::NotFound(format!("Collection '{}' not found", name))
            }
            DocumentError::DocumentNotFound(id) => {
                AppError::NotFound(format!("Document '{}' not found", id))
            }
            DocumentError::Validation(msg) => AppError::BadRequest(msg),
            DocumentError::Store(msg) => {
                AppError::InternalServerError(format!("Store error: {}", msg))
            }
            DocumentError::Embedding(msg) => {
                AppError::InternalServerError(format!("Embedding error: {}", msg))
            }
            DocumentError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            DocumentError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for DocumentError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
