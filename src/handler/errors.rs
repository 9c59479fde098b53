use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::HbnbError;

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    /// Set on 500s only; the same id is logged next to the real cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message: message.into(),
            status_code: status.as_u16(),
            error_id: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        let mut response = Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occurred",
        );
        response.error_id = Some(Uuid::new_v4().to_string());
        response
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<HbnbError> for ErrorResponse {
    fn from(err: HbnbError) -> Self {
        if err.is_internal() {
            let response = Self::internal();
            tracing::error!(
                error_id = ?response.error_id,
                details = %err,
                "Internal server error occurred"
            );
            return response;
        }
        Self::new(err.status_code(), err.to_string())
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl IntoResponse for HbnbError {
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Fallback for unmatched routes.
pub async fn handle_404(uri: Uri) -> impl IntoResponse {
    tracing::warn!("404 Not Found: {}", uri.path());
    ErrorResponse::not_found(format!("No route for {}", uri.path()))
}
