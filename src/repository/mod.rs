use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Entity, Place};
use crate::error::Result;

pub mod memory;
pub mod sqlx_impl;

/// Storage-agnostic CRUD over one entity type.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync + 'static {
    async fn add(&self, entity: E) -> Result<E>;

    async fn get(&self, id: Uuid) -> Result<Option<E>>;

    /// All entities, oldest first.
    async fn get_all(&self) -> Result<Vec<E>>;

    /// Persist the full current state of an existing entity.
    async fn save(&self, entity: &E) -> Result<()>;

    /// Returns `false` when nothing was stored under `id`.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn get_by_attribute(&self, attribute: &E::Attribute) -> Result<Option<E>>;

    async fn find_all_by_attribute(&self, attribute: &E::Attribute) -> Result<Vec<E>>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Load, run the entity's validating `apply`, persist.
    ///
    /// `Ok(None)` means there was no entity under `id` and nothing happened.
    async fn update(&self, id: Uuid, patch: E::Patch) -> Result<Option<E>> {
        let Some(mut entity) = self.get(id).await? else {
            return Ok(None);
        };
        entity.apply(patch)?;
        self.save(&entity).await?;
        Ok(Some(entity))
    }
}

/// Link bookkeeping on places. Each call touches only the link it names, so
/// it never races a concurrent full-row `save` of the same place.
#[async_trait]
pub trait PlaceRepository: Repository<Place> {
    /// Record `review_id` on its place. A no-op where the list is derived
    /// from stored reviews.
    async fn link_review(&self, place_id: Uuid, review_id: Uuid) -> Result<()>;

    async fn unlink_review(&self, place_id: Uuid, review_id: Uuid) -> Result<()>;

    /// Returns `false` when the amenity was already linked.
    async fn link_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> Result<bool>;

    /// Drop the amenity from every place that lists it.
    async fn unlink_amenity(&self, amenity_id: Uuid) -> Result<()>;
}
