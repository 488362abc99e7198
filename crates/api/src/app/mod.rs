//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: backend selection and the query engine behind the routes
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: query-string DTOs and the response envelope
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices) -> Router {
    build_router(Arc::new(services))
}

/// Router over already-shared services; tests keep a handle to seed data.
pub fn build_router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/catalog", routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
