//! Request extractors.

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{HeaderMap, header::CONTENT_TYPE, request::Parts},
};
use irbankmock_core::sep::SepError;
use irbankmock_shared::AppError;
use serde::de::DeserializeOwned;

use crate::REQUEST_ID_HEADER;
use crate::error::ApiError;

/// Per-request context for handlers.
///
/// Use this to tag error responses with the request id:
///
/// ```ignore
/// async fn handler(ctx: RequestContext) -> Result<Json<Value>, ApiError> {
///     repo.list().await.map_err(|e| ctx.error(e))?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_id: Option<String>,
}

impl RequestContext {
    /// Wraps an error for this request.
    pub fn error(&self, error: impl Into<AppError>) -> ApiError {
        ApiError::new(error).with_request_id(self.request_id.clone())
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Ok(Self { request_id })
    }
}

/// Returns true when the request body is URL-encoded form data.
pub fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Decodes a form or JSON body according to the content type.
///
/// Anything that is not form data is read as JSON.
pub fn decode_body<T: DeserializeOwned>(headers: &HeaderMap, body: &[u8]) -> Result<T, SepError> {
    if is_form(headers) {
        serde_urlencoded::from_bytes(body).map_err(|e| {
            tracing::debug!(error = %e, "Invalid form body");
            SepError::InvalidRequest
        })
    } else {
        serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(error = %e, "Invalid JSON body");
            SepError::InvalidRequest
        })
    }
}

/// Body extractor accepting either URL-encoded form data or JSON.
///
/// Rejects undecodable bodies with `InvalidRequest`.
#[derive(Debug, Clone)]
pub struct FormOrJson<T>(pub T);

impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::from(SepError::InvalidRequest))?;
        decode_body(&headers, &body).map(Self).map_err(ApiError::from)
    }
}
