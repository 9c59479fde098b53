use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, Timestamps, ValidationError, required_text};

pub const TITLE_MAX: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct Place {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) price: f64,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) owner_id: Uuid,
    pub(crate) amenities: Vec<Uuid>,
    pub(crate) reviews: Vec<Uuid>,
    #[serde(flatten)]
    pub(crate) timestamps: Timestamps,
}

/// Partial update for a [`Place`]. `owner_id` is deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub amenities: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone)]
pub enum PlaceAttribute {
    Owner(Uuid),
    Amenity(Uuid),
}

fn validate_price(price: f64) -> Result<f64, ValidationError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::new("price", "must be a positive number"));
    }
    Ok(price)
}

fn validate_latitude(latitude: f64) -> Result<f64, ValidationError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::new("latitude", "must be between -90 and 90"));
    }
    Ok(latitude)
}

fn validate_longitude(longitude: f64) -> Result<f64, ValidationError> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::new(
            "longitude",
            "must be between -180 and 180",
        ));
    }
    Ok(longitude)
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
}

impl Place {
    pub fn new(
        title: &str,
        description: Option<&str>,
        price: f64,
        latitude: f64,
        longitude: f64,
        owner_id: Uuid,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            title: required_text("title", title, TITLE_MAX)?,
            description: normalize_description(description),
            price: validate_price(price)?,
            latitude: validate_latitude(latitude)?,
            longitude: validate_longitude(longitude)?,
            owner_id,
            amenities: Vec::new(),
            reviews: Vec::new(),
            timestamps: Timestamps::now(),
        })
    }

    /// Construction-time amenity set; unlike [`Place::set_amenities`] this
    /// leaves `updated_at` equal to `created_at`.
    pub fn with_amenities(mut self, amenities: Vec<Uuid>) -> Self {
        for amenity_id in amenities {
            if !self.amenities.contains(&amenity_id) {
                self.amenities.push(amenity_id);
            }
        }
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn amenities(&self) -> &[Uuid] {
        &self.amenities
    }

    pub fn reviews(&self) -> &[Uuid] {
        &self.reviews
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), ValidationError> {
        self.title = required_text("title", title, TITLE_MAX)?;
        self.timestamps.touch();
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = normalize_description(description);
        self.timestamps.touch();
    }

    pub fn set_price(&mut self, price: f64) -> Result<(), ValidationError> {
        self.price = validate_price(price)?;
        self.timestamps.touch();
        Ok(())
    }

    pub fn set_latitude(&mut self, latitude: f64) -> Result<(), ValidationError> {
        self.latitude = validate_latitude(latitude)?;
        self.timestamps.touch();
        Ok(())
    }

    pub fn set_longitude(&mut self, longitude: f64) -> Result<(), ValidationError> {
        self.longitude = validate_longitude(longitude)?;
        self.timestamps.touch();
        Ok(())
    }

    /// Replace the amenity set, dropping duplicates but keeping first-seen order.
    pub fn set_amenities(&mut self, amenities: Vec<Uuid>) {
        self.amenities.clear();
        for amenity_id in amenities {
            if !self.amenities.contains(&amenity_id) {
                self.amenities.push(amenity_id);
            }
        }
        self.timestamps.touch();
    }

    /// Returns `false` when the amenity was already linked.
    pub fn add_amenity(&mut self, amenity_id: Uuid) -> bool {
        if self.amenities.contains(&amenity_id) {
            return false;
        }
        self.amenities.push(amenity_id);
        self.timestamps.touch();
        true
    }

    pub fn remove_amenity(&mut self, amenity_id: Uuid) -> bool {
        let before = self.amenities.len();
        self.amenities.retain(|id| *id != amenity_id);
        before != self.amenities.len()
    }

    pub fn add_review(&mut self, review_id: Uuid) {
        if !self.reviews.contains(&review_id) {
            self.reviews.push(review_id);
        }
    }

    pub fn remove_review(&mut self, review_id: Uuid) -> bool {
        let before = self.reviews.len();
        self.reviews.retain(|id| *id != review_id);
        before != self.reviews.len()
    }
}

impl Entity for Place {
    type Patch = PlacePatch;
    type Attribute = PlaceAttribute;

    const NAME: &'static str = "Place";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at
    }

    fn apply(&mut self, patch: PlacePatch) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(title) = patch.title.as_deref() {
            next.set_title(title)?;
        }
        if let Some(description) = patch.description.as_deref() {
            next.set_description(Some(description));
        }
        if let Some(price) = patch.price {
            next.set_price(price)?;
        }
        if let Some(latitude) = patch.latitude {
            next.set_latitude(latitude)?;
        }
        if let Some(longitude) = patch.longitude {
            next.set_longitude(longitude)?;
        }
        if let Some(amenities) = patch.amenities {
            next.set_amenities(amenities);
        }
        next.timestamps.touch();
        *self = next;
        Ok(())
    }

    fn matches(&self, attribute: &PlaceAttribute) -> bool {
        match attribute {
            PlaceAttribute::Owner(owner_id) => self.owner_id == *owner_id,
            PlaceAttribute::Amenity(amenity_id) => self.amenities.contains(amenity_id),
        }
    }
}
