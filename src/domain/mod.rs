//! Entity models and their validation rules.

pub mod amenity;
pub mod place;
pub mod review;
pub mod user;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::error::HbnbError;

pub use amenity::{Amenity, AmenityAttribute, AmenityPatch};
pub use place::{Place, PlaceAttribute, PlacePatch};
pub use review::{Review, ReviewAttribute, ReviewPatch};
pub use user::{User, UserAttribute, UserPatch};

/// A field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Persisted domain object with a stable identity.
///
/// `apply` is the validating partial update used by
/// [`Repository::update`](crate::repository::Repository::update); it must
/// leave the entity untouched when it returns an error.
pub trait Entity: Clone + Send + Sync + 'static {
    type Patch: Send + 'static;
    type Attribute: Send + Sync + 'static;

    /// Human readable name used in "not found" messages.
    const NAME: &'static str;

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn apply(&mut self, patch: Self::Patch) -> Result<(), ValidationError>;
    fn matches(&self, attribute: &Self::Attribute) -> bool;

    /// Uniqueness rule against another stored entity. Repositories check it
    /// under the same lock (or constraint) as the write itself.
    fn conflicts_with(&self, _other: &Self) -> Option<HbnbError> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        let now = current_time();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`; it always moves strictly forward.
    pub fn touch(&mut self) {
        let now = current_time();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

// Postgres keeps microseconds, so never hand out more precision than that.
fn current_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Trimmed, non-empty text of at most `max` characters.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be {max} characters or less"),
        ));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_strictly_increases() {
        let mut ts = Timestamps::now();
        let created = ts.created_at;
        let mut previous = ts.updated_at;
        for _ in 0..100 {
            ts.touch();
            assert!(ts.updated_at > previous);
            previous = ts.updated_at;
        }
        assert_eq!(ts.created_at, created);
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", "  WiFi ", 50).unwrap(), "WiFi");
        assert_eq!(
            required_text("name", "   ", 50).unwrap_err().field,
            "name"
        );
        assert!(required_text("name", &"x".repeat(51), 50).is_err());
        assert!(required_text("name", &"é".repeat(50), 50).is_ok());
    }
}
