use std::sync::Arc;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::user::{Email, Password};
use crate::domain::{
    Amenity, AmenityAttribute, AmenityPatch, Entity, Place, PlaceAttribute, PlacePatch, Review,
    ReviewAttribute, ReviewPatch, User, UserAttribute, UserPatch, ValidationError,
};
use crate::error::{HbnbError, Result};
use crate::repository::{PlaceRepository, Repository};
use crate::repository::memory::InMemoryRepository;
use crate::repository::sqlx_impl::{
    PgAmenityRepository, PgPlaceRepository, PgReviewRepository, PgUserRepository,
};
use crate::services::jwt_service::{Claims, JwtService};
use crate::services::password::{dummy_hash, hash_password, verify_password};

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Profile changes as submitted; the password is still plaintext here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    /// Fields only an administrator may change.
    pub fn touches_credentials(&self) -> bool {
        self.email.is_some() || self.password.is_some() || self.is_admin.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAmenity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPlace {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Only honoured for administrators; everyone else owns what they create.
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub amenities: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub text: String,
    pub rating: i32,
    pub place_id: Uuid,
}

/// A place together with the entities it references.
#[derive(Debug, Clone)]
pub struct PlaceDetails {
    pub place: Place,
    pub owner: User,
    pub amenities: Vec<Amenity>,
}

/// Single entry point for the API layer. Owns one repository per entity
/// type and enforces the rules that span more than one of them.
#[derive(Clone)]
pub struct HbnbFacade {
    users: Arc<dyn Repository<User>>,
    places: Arc<dyn PlaceRepository>,
    amenities: Arc<dyn Repository<Amenity>>,
    reviews: Arc<dyn Repository<Review>>,
    jwt_service: Arc<JwtService>,
}

impl HbnbFacade {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        places: Arc<dyn PlaceRepository>,
        amenities: Arc<dyn Repository<Amenity>>,
        reviews: Arc<dyn Repository<Review>>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            users,
            places,
            amenities,
            reviews,
            jwt_service,
        }
    }

    pub fn in_memory(jwt_service: Arc<JwtService>) -> Self {
        Self::new(
            Arc::new(InMemoryRepository::<User>::new()),
            Arc::new(InMemoryRepository::<Place>::new()),
            Arc::new(InMemoryRepository::<Amenity>::new()),
            Arc::new(InMemoryRepository::<Review>::new()),
            jwt_service,
        )
    }

    pub fn postgres(pool: PgPool, jwt_service: Arc<JwtService>) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgPlaceRepository::new(pool.clone())),
            Arc::new(PgAmenityRepository::new(pool.clone())),
            Arc::new(PgReviewRepository::new(pool)),
            jwt_service,
        )
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    // ----------------------------------------------------------- users

    pub async fn create_user(&self, input: NewUser) -> Result<User> {
        let email = Email::try_from(input.email.as_str())?;
        let password = Password::try_from(input.password.as_str())?;
        self.ensure_email_free(email.as_ref(), None).await?;

        let password_hash = hash_password(&password)?;
        let user = User::new(
            &input.first_name,
            &input.last_name,
            email.as_ref(),
            password_hash,
            input.is_admin,
        )?;
        let user = self.users.add(user).await?;
        info!(user_id = %user.id(), is_admin = user.is_admin(), "User created");
        Ok(user)
    }

    /// Open self-registration; never grants admin.
    pub async fn register_user(&self, input: NewUser) -> Result<User> {
        self.create_user(NewUser {
            is_admin: false,
            ..input
        })
        .await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| HbnbError::not_found(User::NAME, id))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users
            .get_by_attribute(&UserAttribute::Email(email.to_string()))
            .await
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        self.users.get_all().await
    }

    pub async fn update_user(&self, id: Uuid, input: UserUpdate) -> Result<User> {
        self.get_user(id).await?;

        if let Some(email) = input.email.as_deref() {
            let email = Email::try_from(email)?;
            self.ensure_email_free(email.as_ref(), Some(id)).await?;
        }
        let password_hash = match input.password.as_deref() {
            Some(plain) => Some(hash_password(&Password::try_from(plain)?)?),
            None => None,
        };

        let patch = UserPatch {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password_hash,
            is_admin: input.is_admin,
        };
        self.users
            .update(id, patch)
            .await?
            .ok_or_else(|| HbnbError::not_found(User::NAME, id))
    }

    /// Removes the user's places (with their reviews) and every review they wrote.
    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        self.get_user(id).await?;

        for place in self
            .places
            .find_all_by_attribute(&PlaceAttribute::Owner(id))
            .await?
        {
            self.delete_place(place.id()).await?;
        }
        for review in self
            .reviews
            .find_all_by_attribute(&ReviewAttribute::Author(id))
            .await?
        {
            self.delete_review(review.id()).await?;
        }

        self.users.delete(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> Result<()> {
        match self.get_user_by_email(email).await? {
            Some(existing) if Some(existing.id()) != owner => {
                Err(ValidationError::new("email", "email already registered").into())
            }
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------- amenities

    pub async fn create_amenity(&self, input: NewAmenity) -> Result<Amenity> {
        let amenity = Amenity::new(&input.name)?;
        self.ensure_amenity_name_free(amenity.name(), None).await?;
        let amenity = self.amenities.add(amenity).await?;
        info!(amenity_id = %amenity.id(), name = amenity.name(), "Amenity created");
        Ok(amenity)
    }

    pub async fn get_amenity(&self, id: Uuid) -> Result<Amenity> {
        self.amenities
            .get(id)
            .await?
            .ok_or_else(|| HbnbError::not_found(Amenity::NAME, id))
    }

    pub async fn get_all_amenities(&self) -> Result<Vec<Amenity>> {
        self.amenities.get_all().await
    }

    pub async fn update_amenity(&self, id: Uuid, patch: AmenityPatch) -> Result<Amenity> {
        self.get_amenity(id).await?;
        if let Some(name) = patch.name.as_deref() {
            self.ensure_amenity_name_free(name, Some(id)).await?;
        }
        self.amenities
            .update(id, patch)
            .await?
            .ok_or_else(|| HbnbError::not_found(Amenity::NAME, id))
    }

    /// Unlinks the amenity from every place before removing it.
    pub async fn delete_amenity(&self, id: Uuid) -> Result<()> {
        self.get_amenity(id).await?;
        self.places.unlink_amenity(id).await?;
        self.amenities.delete(id).await?;
        info!(amenity_id = %id, "Amenity deleted");
        Ok(())
    }

    async fn ensure_amenity_name_free(&self, name: &str, owner: Option<Uuid>) -> Result<()> {
        let existing = self
            .amenities
            .get_by_attribute(&AmenityAttribute::Name(name.to_string()))
            .await?;
        match existing {
            Some(amenity) if Some(amenity.id()) != owner => {
                Err(ValidationError::new("name", "amenity name already exists").into())
            }
            _ => Ok(()),
        }
    }

    async fn ensure_amenities_exist(&self, ids: &[Uuid]) -> Result<()> {
        for id in ids {
            if self.amenities.get(*id).await?.is_none() {
                let reason = format!("amenity {id} not found");
                return Err(ValidationError::new("amenities", reason).into());
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------- places

    pub async fn create_place(&self, owner_id: Uuid, input: NewPlace) -> Result<Place> {
        if self.users.get(owner_id).await?.is_none() {
            return Err(ValidationError::new("owner_id", "owner not found").into());
        }

        let place = Place::new(
            &input.title,
            input.description.as_deref(),
            input.price,
            input.latitude,
            input.longitude,
            owner_id,
        )?;
        self.ensure_amenities_exist(&input.amenities).await?;

        let place = self.places.add(place.with_amenities(input.amenities)).await?;
        info!(place_id = %place.id(), owner_id = %owner_id, "Place created");
        Ok(place)
    }

    pub async fn get_place(&self, id: Uuid) -> Result<Place> {
        self.places
            .get(id)
            .await?
            .ok_or_else(|| HbnbError::not_found(Place::NAME, id))
    }

    pub async fn get_place_details(&self, id: Uuid) -> Result<PlaceDetails> {
        let place = self.get_place(id).await?;
        let owner = self.users.get(place.owner_id()).await?.ok_or_else(|| {
            HbnbError::Internal(format!("place {id} references a missing owner"))
        })?;

        let mut amenities = Vec::with_capacity(place.amenities().len());
        for amenity_id in place.amenities() {
            if let Some(amenity) = self.amenities.get(*amenity_id).await? {
                amenities.push(amenity);
            }
        }

        Ok(PlaceDetails {
            place,
            owner,
            amenities,
        })
    }

    pub async fn get_all_places(&self) -> Result<Vec<Place>> {
        self.places.get_all().await
    }

    pub async fn update_place(&self, id: Uuid, patch: PlacePatch) -> Result<Place> {
        self.get_place(id).await?;
        if let Some(amenities) = patch.amenities.as_deref() {
            self.ensure_amenities_exist(amenities).await?;
        }
        self.places
            .update(id, patch)
            .await?
            .ok_or_else(|| HbnbError::not_found(Place::NAME, id))
    }

    /// Deleting a place deletes its reviews.
    pub async fn delete_place(&self, id: Uuid) -> Result<()> {
        self.get_place(id).await?;

        for review in self
            .reviews
            .find_all_by_attribute(&ReviewAttribute::Place(id))
            .await?
        {
            self.reviews.delete(review.id()).await?;
        }

        self.places.delete(id).await?;
        info!(place_id = %id, "Place deleted");
        Ok(())
    }

    pub async fn add_amenity_to_place(&self, place_id: Uuid, amenity_id: Uuid) -> Result<Place> {
        self.get_place(place_id).await?;
        self.get_amenity(amenity_id).await?;

        if self.places.link_amenity(place_id, amenity_id).await? {
            info!(place_id = %place_id, amenity_id = %amenity_id, "Amenity linked to place");
        }
        self.get_place(place_id).await
    }

    // --------------------------------------------------------- reviews

    pub async fn create_review(&self, author_id: Uuid, input: NewReview) -> Result<Review> {
        let Some(place) = self.places.get(input.place_id).await? else {
            return Err(ValidationError::new("place_id", "place not found").into());
        };
        if self.users.get(author_id).await?.is_none() {
            return Err(ValidationError::new("user_id", "user not found").into());
        }

        let duplicate = self
            .reviews
            .get_by_attribute(&ReviewAttribute::AuthorAndPlace {
                user_id: author_id,
                place_id: place.id(),
            })
            .await?;
        if duplicate.is_some() {
            return Err(HbnbError::conflict("You have already reviewed this place"));
        }

        let review = Review::new(&input.text, input.rating, &place, author_id)?;
        let review = self.reviews.add(review).await?;
        self.add_review_to_place(place.id(), review.id()).await?;

        info!(review_id = %review.id(), place_id = %place.id(), "Review created");
        Ok(review)
    }

    /// Record `review_id` on the place's review list.
    pub async fn add_review_to_place(&self, place_id: Uuid, review_id: Uuid) -> Result<()> {
        self.get_place(place_id).await?;
        self.places.link_review(place_id, review_id).await
    }

    pub async fn get_review(&self, id: Uuid) -> Result<Review> {
        self.reviews
            .get(id)
            .await?
            .ok_or_else(|| HbnbError::not_found(Review::NAME, id))
    }

    pub async fn get_all_reviews(&self) -> Result<Vec<Review>> {
        self.reviews.get_all().await
    }

    pub async fn get_reviews_by_place(&self, place_id: Uuid) -> Result<Vec<Review>> {
        self.get_place(place_id).await?;
        self.reviews
            .find_all_by_attribute(&ReviewAttribute::Place(place_id))
            .await
    }

    pub async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> Result<Review> {
        self.reviews
            .update(id, patch)
            .await?
            .ok_or_else(|| HbnbError::not_found(Review::NAME, id))
    }

    pub async fn delete_review(&self, id: Uuid) -> Result<()> {
        let review = self.get_review(id).await?;
        self.reviews.delete(id).await?;

        self.places.unlink_review(review.place_id(), id).await?;
        info!(review_id = %id, "Review deleted");
        Ok(())
    }

    // ------------------------------------------------------------ auth

    /// Unknown email and wrong password fail identically, and both pay for
    /// one argon2 verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = self.get_user_by_email(email).await?;
        let stored_hash = user.as_ref().map_or(dummy_hash(), |u| u.password_hash());
        let verified = verify_password(password, stored_hash);

        match user {
            Some(user) if verified => {
                info!(user_id = %user.id(), "User logged in");
                self.jwt_service.generate_token(&user)
            }
            _ => {
                warn!("Failed login attempt");
                Err(HbnbError::unauthenticated("Invalid credentials"))
            }
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.jwt_service.verify_token(token)
    }

    pub async fn storage_ready(&self) -> Result<()> {
        self.users.ping().await
    }
}
