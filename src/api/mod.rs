pub mod amenities;
pub mod auth;
pub mod health;
pub mod places;
pub mod reviews;
pub mod users;

use axum::{
    Router,
    extract::Extension,
    middleware::from_fn,
    routing::{MethodRouter, get, post},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::handler::auth::{require_admin, require_auth};
use crate::handler::errors::{ErrorResponse, handle_404};
use crate::handler::logging::request_logging_middleware;
use crate::services::HbnbFacade;
use tower_http::cors::CorsLayer;

pub const API_PREFIX: &str = "/api/v1";

/// Path ids that are not UUIDs cannot name anything, so they are a 404.
pub(crate) fn parse_id(entity: &str, raw: &str) -> Result<Uuid, ErrorResponse> {
    Uuid::parse_str(raw).map_err(|_| ErrorResponse::not_found(format!("{entity} not found")))
}

/// Register a collection route with and without the trailing slash.
fn collection(router: Router, path: &str, methods: MethodRouter) -> Router {
    router
        .route(path, methods.clone())
        .route(&format!("{path}/"), methods)
}

/// Build the full application router around a facade.
pub fn router(facade: Arc<HbnbFacade>) -> Router {
    let jwt_service = facade.jwt_service();

    let admin_router = Router::new()
        .route(
            &format!("{API_PREFIX}/auth/admin-only"),
            get(auth::admin_only_api),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn(require_auth));

    let mut api = Router::new()
        .route(&format!("{API_PREFIX}/auth/login"), post(auth::login_api))
        .route(
            &format!("{API_PREFIX}/auth/register"),
            post(auth::register_api),
        )
        .route(
            &format!("{API_PREFIX}/auth/protected"),
            get(auth::protected_api),
        )
        .route(
            &format!("{API_PREFIX}/users/{{id}}"),
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            &format!("{API_PREFIX}/amenities/{{id}}"),
            get(amenities::get_amenity)
                .put(amenities::update_amenity)
                .delete(amenities::delete_amenity),
        )
        .route(
            &format!("{API_PREFIX}/places/{{id}}"),
            get(places::get_place)
                .put(places::update_place)
                .delete(places::delete_place),
        )
        .route(
            &format!("{API_PREFIX}/places/{{id}}/reviews"),
            get(places::list_place_reviews),
        )
        .route(
            &format!("{API_PREFIX}/places/{{id}}/amenities/{{amenity_id}}"),
            post(places::add_place_amenity),
        )
        .route(
            &format!("{API_PREFIX}/reviews/{{id}}"),
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::readiness_check))
        .route("/api/health/live", get(health::liveness_check));

    api = collection(
        api,
        &format!("{API_PREFIX}/users"),
        get(users::list_users).post(users::create_user),
    );
    api = collection(
        api,
        &format!("{API_PREFIX}/amenities"),
        get(amenities::list_amenities).post(amenities::create_amenity),
    );
    api = collection(
        api,
        &format!("{API_PREFIX}/places"),
        get(places::list_places).post(places::create_place),
    );
    api = collection(
        api,
        &format!("{API_PREFIX}/reviews"),
        get(reviews::list_reviews).post(reviews::create_review),
    );

    api.merge(admin_router)
        .fallback(handle_404)
        .layer(from_fn(request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(jwt_service))
        .layer(Extension(facade))
}
