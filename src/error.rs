use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::ValidationError;

#[derive(Debug, Error)]
pub enum HbnbError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Business-rule violation (duplicate review, own-place review, ...).
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("password hashing error: {0}")]
    Hashing(String),

    #[error("token encoding error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = HbnbError> = std::result::Result<T, E>;

impl HbnbError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Storage(_)
            | Self::Hashing(_)
            | Self::Token(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Errors whose message must not reach the client.
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}
