pub mod handlers;

pub use handlers::{batch_match, health_check, inline_match};

use crate::service::MatcherService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Routes that need no database.
pub fn stateless_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/match/inline", post(inline_match))
}

pub fn router(service: Arc<MatcherService>) -> Router {
    let batch_routes = Router::new()
        .route("/api/match/batch", post(batch_match))
        .with_state(service);

    stateless_routes().merge(batch_routes)
}
