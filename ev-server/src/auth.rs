//! Request identity, body extraction and error responses

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use ev_core::{EVError, Principal};
use serde::de::DeserializeOwned;

/// Header carrying the embedded script's API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header the upstream proxy sets to the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// API key presented by the embedded script, if any
pub fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

/// The caller of a management endpoint
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| CurrentUser(Principal::new(id)))
            .ok_or(ApiError(EVError::Unauthenticated))
    }
}

/// JSON request body whose parse failures are reported as `INVALID_INPUT`
/// in the regular `{"error", "code"}` shape
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError(EVError::invalid(e.body_text())))?;
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError(EVError::invalid(format!("Malformed request body: {}", e))))
    }
}

/// An [`EVError`] rendered as `{"error", "code"}` with its mapped status
#[derive(Debug)]
pub struct ApiError(pub EVError);

impl From<EVError> for ApiError {
    fn from(err: EVError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_error() {
            tracing::error!(error = %self.0, code = self.0.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self.0, code = self.0.error_code(), "request rejected");
        }

        (status, Json(self.0.to_error_response())).into_response()
    }
}
