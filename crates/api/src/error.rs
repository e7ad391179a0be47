//! Error responses.
//!
//! Business errors are returned as `{success:false, error}` with the status
//! they carry. Anything else is logged under a fresh error id and the
//! caller only learns that id.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use irbankmock_core::sep::{ManagementError, SepError};
use irbankmock_db::{LifecycleError, RegistryError};
use irbankmock_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use uuid::Uuid;

/// An [`AppError`] on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    request_id: Option<String>,
}

impl ApiError {
    /// Wraps an error.
    pub fn new(error: impl Into<AppError>) -> Self {
        Self {
            error: error.into(),
            request_id: None,
        }
    }

    /// Attaches the id of the request that failed.
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::new(error)
    }
}

impl From<SepError> for ApiError {
    fn from(error: SepError) -> Self {
        Self::new(error)
    }
}

impl From<ManagementError> for ApiError {
    fn from(error: ManagementError) -> Self {
        Self::new(error)
    }
}

impl From<LifecycleError> for ApiError {
    fn from(error: LifecycleError) -> Self {
        Self::new(error)
    }
}

impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        Self::new(error)
    }
}

impl From<DbErr> for ApiError {
    fn from(error: DbErr) -> Self {
        Self::new(AppError::internal(error.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.error.is_business() {
            return (
                status,
                Json(json!({
                    "success": false,
                    "error": self.error.message(),
                })),
            )
                .into_response();
        }

        let error_id = Uuid::new_v4();
        tracing::error!(
            %error_id,
            request_id = self.request_id.as_deref().unwrap_or_default(),
            error = %self.error,
            "Unhandled server error"
        );

        (
            status,
            Json(json!({
                "success": false,
                "error": format!("Server error. Error id: {error_id}"),
                "errorId": error_id,
                "requestId": self.request_id,
            })),
        )
            .into_response()
    }
}
