use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::User;
use crate::error::{HbnbError, Result};

pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;
/// Ten years.
pub const MAX_TTL_SECS: i64 = 10 * 365 * DEFAULT_TTL_SECS;
const ISSUER: &str = "hbnb";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // User id
    pub is_admin: bool, // Admin flag at issue time
    pub exp: i64,       // Expiration time
    pub iat: i64,       // Issued at
    pub iss: String,    // Issuer
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: ISSUER.to_string(),
            ttl,
        }
    }

    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| HbnbError::Internal("token expiry out of range".into()))?;
        let claims = Claims {
            sub: user.id,
            is_admin: user.is_admin(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Any decoding failure (bad signature, expired, wrong issuer) is an
    /// authentication error.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                HbnbError::unauthenticated("Invalid or expired token")
            })
    }

}
