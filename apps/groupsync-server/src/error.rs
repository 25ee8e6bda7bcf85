//! Mapping of core errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use groupsync_core::GroupSyncError;
use groupsync_storage::StoreError;
use serde::Serialize;
use tracing::warn;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str),
    Core(GroupSyncError),
}

impl ApiError {
    pub fn invalid(field: impl Into<String>) -> Self {
        ApiError::Core(GroupSyncError::invalid_argument(field))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Core(err) => match err {
                GroupSyncError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
                GroupSyncError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
                GroupSyncError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
                GroupSyncError::NotFound { .. } => StatusCode::NOT_FOUND,
                GroupSyncError::StoreFailure(StoreError::AlreadyExists | StoreError::Conflict) => {
                    StatusCode::CONFLICT
                }
                GroupSyncError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<GroupSyncError> for ApiError {
    fn from(err: GroupSyncError) -> Self {
        ApiError::Core(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    id: &'static str,
    message: String,
    status_code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (id, message) = match &self {
            ApiError::Unauthorized(msg) => ("unauthorized", msg.to_string()),
            ApiError::Core(err) => (err.kind(), err.to_string()),
        };
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            warn!("Request failed: {}", message);
        }
        let body = ErrorBody {
            id,
            message,
            status_code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
