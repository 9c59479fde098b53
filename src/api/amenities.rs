use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::parse_id;
use crate::domain::{Amenity, AmenityPatch, Entity};
use crate::handler::auth::AuthenticatedUser;
use crate::handler::errors::ErrorResponse;
use crate::handler::json::JsonBody;
use crate::services::HbnbFacade;
use crate::services::facade::NewAmenity;

const ADMIN_ONLY: &str = "Admin privileges required";

/// POST /api/v1/amenities/ (admin)
pub async fn create_amenity(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    JsonBody(payload): JsonBody<NewAmenity>,
) -> Result<Response, ErrorResponse> {
    caller.require_admin(ADMIN_ONLY)?;
    let amenity = facade.create_amenity(payload).await?;
    Ok((StatusCode::CREATED, Json(amenity)).into_response())
}

/// GET /api/v1/amenities/
pub async fn list_amenities(
    Extension(facade): Extension<Arc<HbnbFacade>>,
) -> Result<Response, ErrorResponse> {
    let amenities = facade.get_all_amenities().await?;
    Ok((StatusCode::OK, Json(amenities)).into_response())
}

/// GET /api/v1/amenities/{id}
pub async fn get_amenity(
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(Amenity::NAME, &id)?;
    let amenity = facade.get_amenity(id).await?;
    Ok((StatusCode::OK, Json(amenity)).into_response())
}

/// PUT /api/v1/amenities/{id} (admin)
pub async fn update_amenity(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<AmenityPatch>,
) -> Result<Response, ErrorResponse> {
    caller.require_admin(ADMIN_ONLY)?;
    let id = parse_id(Amenity::NAME, &id)?;
    let amenity = facade.update_amenity(id, payload).await?;
    Ok((StatusCode::OK, Json(amenity)).into_response())
}

/// DELETE /api/v1/amenities/{id} (admin)
pub async fn delete_amenity(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
) -> Result<Response, ErrorResponse> {
    caller.require_admin(ADMIN_ONLY)?;
    let id = parse_id(Amenity::NAME, &id)?;
    facade.delete_amenity(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
