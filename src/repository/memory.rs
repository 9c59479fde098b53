use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PlaceRepository, Repository};
use crate::domain::{Entity, Place};
use crate::error::{HbnbError, Result};

/// Process-local repository backed by a map. Contents vanish with the process.
pub struct InMemoryRepository<E: Entity> {
    storage: RwLock<HashMap<Uuid, E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            storage: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// First uniqueness violation between `entity` and any other stored entity.
fn conflict<E: Entity>(storage: &HashMap<Uuid, E>, entity: &E) -> Option<HbnbError> {
    storage
        .values()
        .filter(|other| other.id() != entity.id())
        .find_map(|other| entity.conflicts_with(other))
}

fn oldest_first<E: Entity>(mut entities: Vec<E>) -> Vec<E> {
    entities.sort_by_key(|e| (e.created_at(), e.id()));
    entities
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn add(&self, entity: E) -> Result<E> {
        let mut storage = self.storage.write().await;
        if storage.contains_key(&entity.id()) {
            return Err(HbnbError::Internal(format!(
                "{} {} already stored",
                E::NAME,
                entity.id()
            )));
        }
        if let Some(err) = conflict(&storage, &entity) {
            return Err(err);
        }
        storage.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn get(&self, id: Uuid) -> Result<Option<E>> {
        Ok(self.storage.read().await.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        let entities = self.storage.read().await.values().cloned().collect();
        Ok(oldest_first(entities))
    }

    async fn save(&self, entity: &E) -> Result<()> {
        let mut storage = self.storage.write().await;
        if let Some(err) = conflict(&storage, entity) {
            return Err(err);
        }
        match storage.get_mut(&entity.id()) {
            Some(stored) => {
                *stored = entity.clone();
                Ok(())
            }
            None => Err(HbnbError::not_found(E::NAME, entity.id())),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.storage.write().await.remove(&id).is_some())
    }

    async fn get_by_attribute(&self, attribute: &E::Attribute) -> Result<Option<E>> {
        let matches = self.find_all_by_attribute(attribute).await?;
        Ok(matches.into_iter().next())
    }

    async fn find_all_by_attribute(&self, attribute: &E::Attribute) -> Result<Vec<E>> {
        let entities = self
            .storage
            .read()
            .await
            .values()
            .filter(|e| e.matches(attribute))
            .cloned()
            .collect();
        Ok(oldest_first(entities))
    }
}

#[async_trait]
impl PlaceRepository for InMemoryRepository<Place> {
    async fn link_review(&self, place_id: Uuid, review_id: Uuid) -> Result<()> {
        let mut storage = self.storage.write().await;
        let place = storage
            .get_mut(&place_id)
            .ok_or_else(|| HbnbError::not_found(Place::NAME, place_id))?;
        place.add_review(review_id);
        Ok(())
    }

    async fn unlink_review(&self, place_id: Uuid, review_id: Uuid) -> Result<()> {
        if let Some(place) = self.storage.write().await.get_mut(&place_id) {
            place.remove_review(review_id);
        }
        Ok(())
    }

    async fn link_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> Result<bool> {
        let mut storage = self.storage.write().await;
        let place = storage
            .get_mut(&place_id)
            .ok_or_else(|| HbnbError::not_found(Place::NAME, place_id))?;
        Ok(place.add_amenity(amenity_id))
    }

    async fn unlink_amenity(&self, amenity_id: Uuid) -> Result<()> {
        for place in self.storage.write().await.values_mut() {
            place.remove_amenity(amenity_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Amenity, AmenityAttribute, AmenityPatch};

    #[tokio::test]
    async fn test_crud_cycle() {
        let repo = InMemoryRepository::<Amenity>::new();
        let wifi = repo.add(Amenity::new("WiFi").unwrap()).await.unwrap();
        let pool = repo.add(Amenity::new("Pool").unwrap()).await.unwrap();

        assert_eq!(repo.get(wifi.id()).await.unwrap(), Some(wifi.clone()));
        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id(), wifi.id());
        assert_eq!(all[1].id(), pool.id());

        let found = repo
            .get_by_attribute(&AmenityAttribute::Name("pool".into()))
            .await
            .unwrap();
        assert_eq!(found.map(|a| a.id()), Some(pool.id()));

        assert!(repo.delete(wifi.id()).await.unwrap());
        assert!(!repo.delete(wifi.id()).await.unwrap());
        assert!(repo.get(wifi.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_applies_validation() {
        let repo = InMemoryRepository::<Amenity>::new();
        let tv = repo.add(Amenity::new("TV").unwrap()).await.unwrap();

        let updated = repo
            .update(
                tv.id(),
                AmenityPatch {
                    name: Some("Smart TV".into()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name(), "Smart TV");
        assert_eq!(
            repo.get(tv.id()).await.unwrap().unwrap().name(),
            "Smart TV"
        );

        let err = repo
            .update(tv.id(), AmenityPatch { name: Some("".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, HbnbError::Validation(_)));
        assert_eq!(
            repo.get(tv.id()).await.unwrap().unwrap().name(),
            "Smart TV"
        );
    }

    #[tokio::test]
    async fn test_update_missing_is_noop() {
        let repo = InMemoryRepository::<Amenity>::new();
        let result = repo
            .update(Uuid::new_v4(), AmenityPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_unknown_entity_fails() {
        let repo = InMemoryRepository::<Amenity>::new();
        let ghost = Amenity::new("Ghost").unwrap();
        let err = repo.save(&ghost).await.unwrap_err();
        assert!(matches!(err, HbnbError::NotFound { entity: "Amenity", .. }));
    }

    #[tokio::test]
    async fn test_unique_names_enforced_on_write() {
        let repo = InMemoryRepository::<Amenity>::new();
        repo.add(Amenity::new("Sauna").unwrap()).await.unwrap();
        let pool = repo.add(Amenity::new("Pool").unwrap()).await.unwrap();

        let err = repo.add(Amenity::new("POOL").unwrap()).await.unwrap_err();
        assert!(matches!(err, HbnbError::Validation(ref e) if e.field == "name"));

        let mut renamed = pool.clone();
        renamed.set_name("sauna").unwrap();
        let err = repo.save(&renamed).await.unwrap_err();
        assert!(matches!(err, HbnbError::Validation(ref e) if e.field == "name"));
        assert_eq!(repo.get(pool.id()).await.unwrap().unwrap().name(), "Pool");

        // Re-saving an entity never conflicts with itself.
        repo.save(&pool).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_place_links_leave_other_fields_alone() {
        let repo = InMemoryRepository::<Place>::new();
        let place = Place::new("Loft", None, 100.0, 10.0, 20.0, Uuid::new_v4()).unwrap();
        let place = repo.add(place).await.unwrap();

        let mut edited = place.clone();
        edited.set_price(150.0).unwrap();
        repo.save(&edited).await.unwrap();

        let review_id = Uuid::new_v4();
        repo.link_review(place.id(), review_id).await.unwrap();
        let stored = repo.get(place.id()).await.unwrap().unwrap();
        assert_eq!(stored.price(), 150.0);
        assert_eq!(stored.reviews(), &[review_id]);
        assert_eq!(stored.updated_at(), edited.updated_at());

        let amenity_id = Uuid::new_v4();
        assert!(repo.link_amenity(place.id(), amenity_id).await.unwrap());
        assert!(!repo.link_amenity(place.id(), amenity_id).await.unwrap());
        let stored = repo.get(place.id()).await.unwrap().unwrap();
        assert_eq!(stored.price(), 150.0);
        assert_eq!(stored.amenities(), &[amenity_id]);
        assert!(stored.updated_at() > edited.updated_at());

        repo.unlink_amenity(amenity_id).await.unwrap();
        repo.unlink_review(place.id(), review_id).await.unwrap();
        let stored = repo.get(place.id()).await.unwrap().unwrap();
        assert!(stored.amenities().is_empty());
        assert!(stored.reviews().is_empty());

        let err = repo
            .link_review(Uuid::new_v4(), review_id)
            .await
            .unwrap_err();
        assert!(matches!(err, HbnbError::NotFound { entity: "Place", .. }));
    }
}
