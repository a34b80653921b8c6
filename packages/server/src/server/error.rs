//! HTTP mapping for domain errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::common::ErrandError;

pub type ApiResult<T> = Result<Json<T>, ErrandError>;

pub fn status_for(err: &ErrandError) -> StatusCode {
    match err {
        ErrandError::Validation(_) => StatusCode::BAD_REQUEST,
        ErrandError::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrandError::Authorization(_) => StatusCode::FORBIDDEN,
        ErrandError::NotFound(_) => StatusCode::NOT_FOUND,
        ErrandError::StateGuard(_) | ErrandError::Conflict(_) => StatusCode::CONFLICT,
        ErrandError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ErrandError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = match &self {
            ErrandError::Dependency(e) => {
                error!(error = ?e, "Request failed on a dependency");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
