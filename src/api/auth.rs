use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Entity;
use crate::handler::auth::AuthenticatedUser;
use crate::handler::errors::ErrorResponse;
use crate::handler::json::JsonBody;
use crate::services::HbnbFacade;
use crate::services::facade::NewUser;

#[derive(Deserialize)]
pub struct LoginApi {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
}

#[derive(Serialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub user_id: Uuid,
    pub is_admin: bool,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/v1/auth/login
pub async fn login_api(
    Extension(facade): Extension<Arc<HbnbFacade>>,
    JsonBody(payload): JsonBody<LoginApi>,
) -> impl IntoResponse {
    match facade.login(&payload.email, &payload.password).await {
        Ok(access_token) => (StatusCode::OK, Json(LoginResponse { access_token })).into_response(),
        Err(e) => ErrorResponse::from(e).into_response(),
    }
}

/// POST /api/v1/auth/register
pub async fn register_api(
    Extension(facade): Extension<Arc<HbnbFacade>>,
    JsonBody(payload): JsonBody<NewUser>,
) -> impl IntoResponse {
    match facade.register_user(payload).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                id: user.id(),
                email: user.email().to_string(),
            }),
        )
            .into_response(),
        Err(e) => ErrorResponse::from(e).into_response(),
    }
}

/// GET /api/v1/auth/protected
pub async fn protected_api(user: AuthenticatedUser) -> Response {
    (
        StatusCode::OK,
        Json(ProtectedResponse {
            message: format!("Hello, user {}", user.user_id),
            user_id: user.user_id,
            is_admin: user.is_admin,
        }),
    )
        .into_response()
}

/// GET /api/v1/auth/admin-only, behind `require_auth` + `require_admin`
pub async fn admin_only_api(
    Extension(user): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(MessageResponse {
            message: format!("Admin access granted to {}", user.user_id),
        }),
    )
}
