pub mod health;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::content::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_handler))
        // Original endpoint, kept for existing clients
        .route("/get-page", get(handlers::handle_get_page))
        .route("/api/v1/pages", get(handlers::handle_get_page));

    // Page images are served straight from the content tree.
    let prefix = state.config.static_url_prefix.clone();
    let router = if prefix.starts_with('/') {
        router.nest_service(&prefix, ServeDir::new(&state.config.content_root))
    } else {
        router
    };

    router.with_state(state)
}
