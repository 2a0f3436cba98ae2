//! Shared axum plumbing: the application error taxonomy with JSON responses,
//! router assembly with the common middleware stack, and server startup with
//! graceful shutdown.

pub mod errors;
pub mod server;

pub use errors::{AppError, ErrorResponse};
pub use server::{create_app, create_router, shutdown_signal};
