use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::parse_id;
use crate::domain::{Entity, User};
use crate::handler::auth::AuthenticatedUser;
use crate::handler::errors::ErrorResponse;
use crate::handler::json::JsonBody;
use crate::services::HbnbFacade;
use crate::services::facade::{NewUser, UserUpdate};

/// POST /api/v1/users/ (admin)
pub async fn create_user(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    JsonBody(payload): JsonBody<NewUser>,
) -> Result<Response, ErrorResponse> {
    caller.require_admin("Admin privileges required")?;
    let user = facade.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// GET /api/v1/users/
pub async fn list_users(
    Extension(facade): Extension<Arc<HbnbFacade>>,
) -> Result<Response, ErrorResponse> {
    let users = facade.get_all_users().await?;
    Ok((StatusCode::OK, Json(users)).into_response())
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(User::NAME, &id)?;
    let user = facade.get_user(id).await?;
    Ok((StatusCode::OK, Json(user)).into_response())
}

/// PUT /api/v1/users/{id}
///
/// Users may edit their own names; email, password and the admin flag
/// belong to administrators.
pub async fn update_user(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UserUpdate>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(User::NAME, &id)?;
    facade.get_user(id).await?;

    if !caller.is_admin {
        if caller.user_id != id {
            return Err(ErrorResponse::forbidden("Unauthorized action"));
        }
        if payload.touches_credentials() {
            return Err(ErrorResponse::forbidden(
                "You cannot modify email, password or admin status",
            ));
        }
    }

    let user = facade.update_user(id, payload).await?;
    Ok((StatusCode::OK, Json(user)).into_response())
}

/// DELETE /api/v1/users/{id} (admin)
pub async fn delete_user(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
) -> Result<Response, ErrorResponse> {
    caller.require_admin("Admin privileges required")?;
    let id = parse_id(User::NAME, &id)?;
    facade.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
