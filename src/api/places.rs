use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::parse_id;
use crate::domain::{Amenity, Entity, Place, PlacePatch};
use crate::handler::auth::AuthenticatedUser;
use crate::handler::errors::ErrorResponse;
use crate::handler::json::JsonBody;
use crate::services::HbnbFacade;
use crate::services::facade::{NewPlace, PlaceDetails};

const OWNER_ONLY: &str = "Unauthorized action";

#[derive(Debug, Serialize)]
pub struct PlaceSummary {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: Uuid,
}

impl From<&Place> for PlaceSummary {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id(),
            title: place.title().to_string(),
            price: place.price(),
            latitude: place.latitude(),
            longitude: place.longitude(),
            owner_id: place.owner_id(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AmenitySummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PlaceDetailsResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner: OwnerSummary,
    pub amenities: Vec<AmenitySummary>,
    pub reviews: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlaceDetails> for PlaceDetailsResponse {
    fn from(details: PlaceDetails) -> Self {
        let PlaceDetails {
            place,
            owner,
            amenities,
        } = details;
        Self {
            id: place.id(),
            title: place.title().to_string(),
            description: place.description().map(str::to_string),
            price: place.price(),
            latitude: place.latitude(),
            longitude: place.longitude(),
            owner: OwnerSummary {
                id: owner.id(),
                first_name: owner.first_name().to_string(),
                last_name: owner.last_name().to_string(),
                email: owner.email().to_string(),
            },
            amenities: amenities
                .iter()
                .map(|a| AmenitySummary {
                    id: a.id(),
                    name: a.name().to_string(),
                })
                .collect(),
            reviews: place.reviews().to_vec(),
            created_at: place.created_at(),
            updated_at: place.updated_at(),
        }
    }
}

/// POST /api/v1/places/
///
/// The caller becomes the owner. Administrators may pass `owner_id` to
/// create on someone else's behalf.
pub async fn create_place(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    JsonBody(payload): JsonBody<NewPlace>,
) -> Result<Response, ErrorResponse> {
    let owner_id = match payload.owner_id {
        Some(owner_id) if owner_id != caller.user_id && !caller.is_admin => {
            return Err(ErrorResponse::forbidden(
                "You can only create places for yourself",
            ));
        }
        Some(owner_id) => owner_id,
        None => caller.user_id,
    };

    let place = facade.create_place(owner_id, payload).await?;
    Ok((StatusCode::CREATED, Json(place)).into_response())
}

/// GET /api/v1/places/
pub async fn list_places(
    Extension(facade): Extension<Arc<HbnbFacade>>,
) -> Result<Response, ErrorResponse> {
    let places = facade.get_all_places().await?;
    let summaries: Vec<PlaceSummary> = places.iter().map(PlaceSummary::from).collect();
    Ok((StatusCode::OK, Json(summaries)).into_response())
}

/// GET /api/v1/places/{id}
pub async fn get_place(
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(Place::NAME, &id)?;
    let details = facade.get_place_details(id).await?;
    Ok((StatusCode::OK, Json(PlaceDetailsResponse::from(details))).into_response())
}

/// PUT /api/v1/places/{id} (owner or admin)
pub async fn update_place(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<PlacePatch>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(Place::NAME, &id)?;
    let place = facade.get_place(id).await?;
    caller.require_owner_or_admin(place.owner_id(), OWNER_ONLY)?;

    let place = facade.update_place(id, payload).await?;
    Ok((StatusCode::OK, Json(place)).into_response())
}

/// DELETE /api/v1/places/{id} (owner or admin)
pub async fn delete_place(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(Place::NAME, &id)?;
    let place = facade.get_place(id).await?;
    caller.require_owner_or_admin(place.owner_id(), OWNER_ONLY)?;

    facade.delete_place(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// GET /api/v1/places/{id}/reviews
pub async fn list_place_reviews(
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path(id): Path<String>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(Place::NAME, &id)?;
    let reviews = facade.get_reviews_by_place(id).await?;
    Ok((StatusCode::OK, Json(reviews)).into_response())
}

/// POST /api/v1/places/{id}/amenities/{amenity_id} (owner or admin)
pub async fn add_place_amenity(
    caller: AuthenticatedUser,
    Extension(facade): Extension<Arc<HbnbFacade>>,
    Path((id, amenity_id)): Path<(String, String)>,
) -> Result<Response, ErrorResponse> {
    let id = parse_id(Place::NAME, &id)?;
    let amenity_id = parse_id(Amenity::NAME, &amenity_id)?;
    let place = facade.get_place(id).await?;
    caller.require_owner_or_admin(place.owner_id(), OWNER_ONLY)?;

    let place = facade.add_amenity_to_place(id, amenity_id).await?;
    Ok((StatusCode::OK, Json(place)).into_response())
}
