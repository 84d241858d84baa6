//! Condition management routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use ev_core::{Condition, ConditionPatch, EVError, NewCondition};

use super::Deleted;
use crate::auth::{ApiError, CurrentUser, JsonBody};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub variant_id: Option<String>,
}

/// Conditions of a variant by ascending priority
pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Condition>>, ApiError> {
    let variant_id = query
        .variant_id
        .ok_or_else(|| EVError::invalid("variantId is required"))?;
    Ok(Json(state.catalog.list_conditions(&user, &variant_id)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<NewCondition>,
) -> Result<(StatusCode, Json<Condition>), ApiError> {
    let condition = state.catalog.create_condition(&user, req)?;
    Ok((StatusCode::CREATED, Json(condition)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Condition>, ApiError> {
    Ok(Json(state.catalog.get_condition(&user, &id)?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ConditionPatch>,
) -> Result<Json<Condition>, ApiError> {
    Ok(Json(state.catalog.update_condition(&user, &id, req)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    state.catalog.delete_condition(&user, &id)?;
    Ok(Deleted::new(id))
}
