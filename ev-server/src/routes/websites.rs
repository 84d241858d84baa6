//! Website management routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

use ev_core::{NewWebsite, SiteSnapshot, Website, WebsitePatch};

use super::Deleted;
use crate::auth::{ApiError, CurrentUser, JsonBody};
use crate::AppState;

/// Embed snippet response
#[derive(Debug, Serialize)]
pub struct SnippetResponse {
    pub snippet: String,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Website>>, ApiError> {
    Ok(Json(state.catalog.list_websites(&user)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<NewWebsite>,
) -> Result<(StatusCode, Json<Website>), ApiError> {
    let website = state.catalog.create_website(&user, req)?;
    Ok((StatusCode::CREATED, Json(website)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SiteSnapshot>, ApiError> {
    Ok(Json(state.catalog.get_website(&user, &id)?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<WebsitePatch>,
) -> Result<Json<Website>, ApiError> {
    Ok(Json(state.catalog.update_website(&user, &id, req)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    state.catalog.delete_website(&user, &id)?;
    Ok(Deleted::new(id))
}

/// Issue a new API key, invalidating the old one
pub async fn rotate_api_key(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Website>, ApiError> {
    Ok(Json(state.catalog.rotate_api_key(&user, &id)?))
}

pub async fn snippet(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SnippetResponse>, ApiError> {
    let snippet = state
        .catalog
        .snippet(&user, &id, &state.config.public_url())?;
    Ok(Json(SnippetResponse { snippet }))
}
