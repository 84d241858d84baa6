//! Variant management routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use ev_core::{EVError, NewVariant, Variant, VariantPatch, VariantSnapshot};

use super::Deleted;
use crate::auth::{ApiError, CurrentUser, JsonBody};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub element_id: Option<String>,
}

/// Variants of an element, default first
pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Variant>>, ApiError> {
    let element_id = query
        .element_id
        .ok_or_else(|| EVError::invalid("elementId is required"))?;
    Ok(Json(state.catalog.list_variants(&user, &element_id)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<NewVariant>,
) -> Result<(StatusCode, Json<Variant>), ApiError> {
    let variant = state.catalog.create_variant(&user, req)?;
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<VariantSnapshot>, ApiError> {
    Ok(Json(state.catalog.get_variant(&user, &id)?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<VariantPatch>,
) -> Result<Json<Variant>, ApiError> {
    Ok(Json(state.catalog.update_variant(&user, &id, req)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    state.catalog.delete_variant(&user, &id)?;
    Ok(Deleted::new(id))
}
