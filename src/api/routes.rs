use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    let mut router = Router::new()
        // Catalog
        .route("/facas", get(handlers::list_facas))
        .route(
            "/facas",
            post(handlers::create_faca).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/facas/:id", get(handlers::get_faca))
        .route(
            "/facas/:id",
            put(handlers::update_faca).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Asset serving
        .route("/facas/:id/pdf", get(handlers::download_pdf))
        .route("/facas/:id/cdr", get(handlers::download_cdr))
        .route("/facas/:id/thumb", get(handlers::serve_thumbnail))
        .route("/facas/:id/preview", get(handlers::preview_faca))
        // Two-step deletion
        .route("/facas/:id/delete", post(handlers::request_delete))
        .route("/facas/delete/confirm", post(handlers::confirm_delete))
        .route("/facas/delete/cancel", post(handlers::cancel_delete))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled; purge route is available");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
