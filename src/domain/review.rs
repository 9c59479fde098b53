use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HbnbError;

use super::{Entity, Place, Timestamps, ValidationError};

pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub(crate) id: Uuid,
    pub(crate) text: String,
    pub(crate) rating: i32,
    pub(crate) place_id: Uuid,
    pub(crate) user_id: Uuid,
    #[serde(flatten)]
    pub(crate) timestamps: Timestamps,
}

/// Partial update for a [`Review`]; the place and author never change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
    pub text: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone)]
pub enum ReviewAttribute {
    Author(Uuid),
    Place(Uuid),
    AuthorAndPlace { user_id: Uuid, place_id: Uuid },
}

fn validate_text(text: &str) -> Result<String, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::new("text", "is required"));
    }
    Ok(text.to_owned())
}

fn validate_rating(rating: i32) -> Result<i32, ValidationError> {
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(ValidationError::new(
            "rating",
            format!("must be between {RATING_MIN} and {RATING_MAX}"),
        ));
    }
    Ok(rating)
}

impl Review {
    /// Build a review of `place` written by `user_id`.
    ///
    /// Owners cannot review their own place.
    pub fn new(
        text: &str,
        rating: i32,
        place: &Place,
        user_id: Uuid,
    ) -> Result<Self, ValidationError> {
        let text = validate_text(text)?;
        let rating = validate_rating(rating)?;
        if place.owner_id() == user_id {
            return Err(ValidationError::new(
                "place_id",
                "you cannot review your own place",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            text,
            rating,
            place_id: place.id,
            user_id,
            timestamps: Timestamps::now(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn place_id(&self) -> Uuid {
        self.place_id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), ValidationError> {
        self.text = validate_text(text)?;
        self.timestamps.touch();
        Ok(())
    }

    pub fn set_rating(&mut self, rating: i32) -> Result<(), ValidationError> {
        self.rating = validate_rating(rating)?;
        self.timestamps.touch();
        Ok(())
    }
}

impl PartialEq for Review {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Review {}

impl Entity for Review {
    type Patch = ReviewPatch;
    type Attribute = ReviewAttribute;

    const NAME: &'static str = "Review";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at
    }

    fn apply(&mut self, patch: ReviewPatch) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(text) = patch.text.as_deref() {
            next.set_text(text)?;
        }
        if let Some(rating) = patch.rating {
            next.set_rating(rating)?;
        }
        next.timestamps.touch();
        *self = next;
        Ok(())
    }

    fn matches(&self, attribute: &ReviewAttribute) -> bool {
        match attribute {
            ReviewAttribute::Author(user_id) => self.user_id == *user_id,
            ReviewAttribute::Place(place_id) => self.place_id == *place_id,
            ReviewAttribute::AuthorAndPlace { user_id, place_id } => {
                self.user_id == *user_id && self.place_id == *place_id
            }
        }
    }

    fn conflicts_with(&self, other: &Review) -> Option<HbnbError> {
        (self.user_id == other.user_id && self.place_id == other.place_id)
            .then(|| HbnbError::conflict("You have already reviewed this place"))
    }
}
