use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::parse_id;
use crate::domain::{Entity, Review, ReviewPatch};
use crate::handler::auth::AuthenticatedUser;
use crate::handler::errors::ErrorResponse;
use crate::handler::json::JsonBody;
use crate::services::HbnbFacade;
use crate::services::facade::NewReview;

const AUTHOR_ONLY: &str = "Unauthorized action";

/// POST /api/v1/reviews/
pub async fn create_review(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    JsonBody(payload): JsonBody<NewReview>,
) -> Result<Response, ErrorResponse> {
    let review = facade.create_review(caller.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(review)).into_response())
}

/// GET /api/v1/reviews/
pub async fn list_reviews(
    Extension(facade): Extension<Arc<HbnbFacade>>,
) -> Result<Response, ErrorResponse> {
    let reviews = facade.get_all_reviews().await?;
    Ok((StatusCode::OK, Json(reviews)).into_response())
}

/// GET /api/v1/reviews/{id}
pub async fn get_review(
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(Review::NAME, &id)?;
    let review = facade.get_review(id).await?;
    Ok((StatusCode::OK, Json(review)).into_response())
}

/// PUT /api/v1/reviews/{id} (author or admin)
pub async fn update_review(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ReviewPatch>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(Review::NAME, &id)?;
    let review = facade.get_review(id).await?;
    caller.require_owner_or_admin(review.user_id(), AUTHOR_ONLY)?;

    let review = facade.update_review(id, payload).await?;
    Ok((StatusCode::OK, Json(review)).into_response())
}

/// DELETE /api/v1/reviews/{id} (author or admin)
pub async fn delete_review(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(Review::NAME, &id)?;
    let review = facade.get_review(id).await?;
    caller.require_owner_or_admin(review.user_id(), AUTHOR_ONLY)?;

    facade.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
