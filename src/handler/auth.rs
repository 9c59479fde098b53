use axum::{
    extract::{Extension, FromRequestParts, Request},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HbnbError;
use crate::handler::errors::ErrorResponse;
use crate::services::jwt_service::{Claims, JwtService};

/// Identity taken from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            is_admin: claims.is_admin,
        }
    }
}

impl AuthenticatedUser {
    pub fn require_admin(&self, message: &str) -> Result<(), HbnbError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(HbnbError::forbidden(message))
        }
    }

    pub fn require_owner_or_admin(&self, owner_id: Uuid, message: &str) -> Result<(), HbnbError> {
        if self.is_admin || self.user_id == owner_id {
            Ok(())
        } else {
            Err(HbnbError::forbidden(message))
        }
    }
}

fn authenticate(
    jwt_service: &JwtService,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, ErrorResponse> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| ErrorResponse::unauthorized("Missing authorization header"))?;
    jwt_service
        .verify_token(&token)
        .map(AuthenticatedUser::from)
        .map_err(|_| ErrorResponse::unauthorized("Invalid or expired token"))
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_auth` further up the stack.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(*user);
        }

        let jwt_service = parts
            .extensions
            .get::<Arc<JwtService>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("JwtService extension missing from router");
                ErrorResponse::internal()
            })?;
        authenticate(&jwt_service, &parts.headers)
    }
}

/// Middleware that requires JWT authentication
pub async fn require_auth(
    Extension(jwt_service): Extension<Arc<JwtService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&jwt_service, &headers) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

/// Middleware that requires an administrator; layer it inside `require_auth`.
pub async fn require_admin(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Response {
    if user.is_admin {
        next.run(request).await
    } else {
        ErrorResponse::forbidden("Admin privileges required").into_response()
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer test123"));

        let token = extract_bearer_token(&headers);
        assert_eq!(token, Some("test123".to_string()));
    }

    #[test]
    fn test_extract_bearer_token_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn test_extract_bearer_token_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc123"));
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn test_extract_bearer_token_bearer_too_short() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn test_authenticated_user_from_claims() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id,
            is_admin: true,
            exp: 1234567890,
            iat: 1234567890,
            iss: "hbnb".to_string(),
        };

        let user = AuthenticatedUser::from(claims);
        assert_eq!(user.user_id, id);
        assert!(user.is_admin);
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = Uuid::new_v4();
        let stranger = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            is_admin: false,
        };
        let admin = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            is_admin: true,
        };
        let me = AuthenticatedUser {
            user_id: owner,
            is_admin: false,
        };

        assert!(me.require_owner_or_admin(owner, "Unauthorized action").is_ok());
        assert!(admin.require_owner_or_admin(owner, "Unauthorized action").is_ok());
        assert!(matches!(
            stranger.require_owner_or_admin(owner, "Unauthorized action"),
            Err(HbnbError::Forbidden(_))
        ));
        assert!(stranger.require_admin("Admin privileges required").is_err());
    }
}
