use axum::{Router, routing::get};

pub mod items;
pub mod system;

/// Router for the catalog read endpoints (mounted under `/catalog`).
pub fn router() -> Router {
    Router::new()
        .route("/items", get(items::list_items))
        .route("/items/feed", get(items::feed_items))
        .route("/items/:id", get(items::get_item))
}
