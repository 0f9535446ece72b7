use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::docs;
use crate::handlers::{self, AppState};

/// Largest accepted request body; webhook payloads are lists of ids.
/// Enforced by the body extractors, so oversized payloads surface as a
/// `VALIDATION_ERROR` through the handler's rejection mapping.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Billing routes, kept separate so callers can wrap them in extra layers
/// (rate limiting) without affecting liveness and docs.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/customer-billing/:customer_id",
            get(handlers::customer_billing),
        )
        .route(
            "/webhook/customer-billing",
            post(handlers::webhook_customer_billing),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Builds the full application around `api`.
pub fn router(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/docs", get(docs::serve_swagger_ui))
        .route("/api-docs/openapi.json", get(docs::serve_openapi_spec))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
