//! HTTP route handlers

mod conditions;
mod elements;
mod integration;
mod variants;
mod websites;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}

/// Body returned by every delete endpoint
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

impl Deleted {
    fn new(id: String) -> Json<Self> {
        Json(Self { id, deleted: true })
    }
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let (status, label) = match state.store.health_check() {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::error!(error = %e, "storage health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };
    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage: state.store.name().to_string(),
        }),
    )
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors_enabled = state.config.cors_enabled;

    let router = Router::new()
        .route("/health", get(health))
        // Embedded script
        .route("/api/integration/variants", post(integration::variants))
        .route("/variants", post(integration::variants))
        .route("/api/integration/widget.js", get(integration::widget))
        // Management API
        .route("/api/websites", get(websites::list).post(websites::create))
        .route(
            "/api/websites/:id",
            get(websites::get).put(websites::update).delete(websites::delete),
        )
        .route("/api/websites/:id/api-key", post(websites::rotate_api_key))
        .route("/api/websites/:id/snippet", get(websites::snippet))
        .route("/api/elements", get(elements::list).post(elements::create))
        .route(
            "/api/elements/:id",
            get(elements::get).put(elements::update).delete(elements::delete),
        )
        .route("/api/variants", get(variants::list).post(variants::create))
        .route(
            "/api/variants/:id",
            get(variants::get).put(variants::update).delete(variants::delete),
        )
        .route("/api/conditions", get(conditions::list).post(conditions::create))
        .route(
            "/api/conditions/:id",
            get(conditions::get).put(conditions::update).delete(conditions::delete),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // The integration endpoint is called from arbitrary tenant origins
    if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
