// routes.rs
use std::sync::Arc;

use axum::{routing::post, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{digest::run_digest, webhook::stripe_webhook},
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .route("/healthcheck", axum::routing::get(health_check))
        .route("/webhook/stripe", post(stripe_webhook))
        .route("/digest/run", post(run_digest))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new().nest("/api", api_route)
}
