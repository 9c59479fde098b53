use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HbnbError;

use super::{Entity, Timestamps, ValidationError, required_text};

pub const NAME_MAX: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct Amenity {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    #[serde(flatten)]
    pub(crate) timestamps: Timestamps,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmenityPatch {
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AmenityAttribute {
    /// Case-insensitive name match.
    Name(String),
}

impl Amenity {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required_text("name", name, NAME_MAX)?,
            timestamps: Timestamps::now(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = required_text("name", name, NAME_MAX)?;
        self.timestamps.touch();
        Ok(())
    }
}

impl PartialEq for Amenity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Amenity {}

impl Entity for Amenity {
    type Patch = AmenityPatch;
    type Attribute = AmenityAttribute;

    const NAME: &'static str = "Amenity";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at
    }

    fn apply(&mut self, patch: AmenityPatch) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(name) = patch.name.as_deref() {
            next.set_name(name)?;
        }
        next.timestamps.touch();
        *self = next;
        Ok(())
    }

    fn matches(&self, attribute: &AmenityAttribute) -> bool {
        match attribute {
            AmenityAttribute::Name(name) => self.name.to_lowercase() == name.trim().to_lowercase(),
        }
    }

    fn conflicts_with(&self, other: &Amenity) -> Option<HbnbError> {
        (self.name.to_lowercase() == other.name.to_lowercase())
            .then(|| ValidationError::new("name", "amenity name already exists").into())
    }
}
