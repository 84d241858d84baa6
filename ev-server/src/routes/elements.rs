//! Element management routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use ev_core::{EVError, Element, ElementPatch, ElementSnapshot, NewElement};

use super::Deleted;
use crate::auth::{ApiError, CurrentUser, JsonBody};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub website_id: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Element>>, ApiError> {
    let website_id = query
        .website_id
        .ok_or_else(|| EVError::invalid("websiteId is required"))?;
    Ok(Json(state.catalog.list_elements(&user, &website_id)?))
}

/// Create an element; the response includes its default variant
pub async fn create(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<NewElement>,
) -> Result<(StatusCode, Json<ElementSnapshot>), ApiError> {
    let element = state.catalog.create_element(&user, req)?;
    Ok((StatusCode::CREATED, Json(element)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ElementSnapshot>, ApiError> {
    Ok(Json(state.catalog.get_element(&user, &id)?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ElementPatch>,
) -> Result<Json<Element>, ApiError> {
    Ok(Json(state.catalog.update_element(&user, &id, req)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    state.catalog.delete_element(&user, &id)?;
    Ok(Deleted::new(id))
}
