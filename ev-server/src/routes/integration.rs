//! Endpoints used by the embedded script

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Json},
};
use serde::Serialize;

use ev_core::{EVError, RequestContext, ResolvedVariant};

use crate::auth::{api_key, ApiError};
use crate::AppState;

const WIDGET_JS: &str = include_str!("../../assets/widget.js");

/// Resolution response
#[derive(Debug, Serialize)]
pub struct VariantsResponse {
    pub variants: Vec<ResolvedVariant>,
}

/// Resolve every element of the calling site for the posted context
///
/// The key is checked before the body is parsed, so an unauthenticated
/// caller never learns anything about payload validation.
pub async fn variants(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<VariantsResponse>, ApiError> {
    let site = state.integration.authenticate(api_key(&headers))?;

    let context = RequestContext::from_json_bytes(&body).map_err(|e| {
        EVError::InvalidContextPayload {
            reason: e.to_string(),
        }
    })?;

    let resolution = state.integration.resolve(&site, &context);
    tracing::debug!(
        website_id = site.website_id(),
        served = resolution.variants.len(),
        skipped = resolution.failures.len(),
        "variants served"
    );

    Ok(Json(VariantsResponse {
        variants: resolution.variants,
    }))
}

/// The loader script tenants embed
pub async fn widget() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        WIDGET_JS,
    )
}
