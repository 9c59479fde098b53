use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{PlaceRepository, Repository};
use crate::domain::{
    Amenity, AmenityAttribute, Entity, Place, PlaceAttribute, Review, ReviewAttribute, Timestamps,
    User, UserAttribute, ValidationError,
};
use crate::error::{HbnbError, Result};

/// Embedded schema migrations, applied at startup and by the CLI.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

fn unique_violation(err: sqlx::Error, on_conflict: impl FnOnce() -> HbnbError) -> HbnbError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => on_conflict(),
        _ => HbnbError::Storage(err),
    }
}

fn ensure_found(rows_affected: u64, entity: &'static str, id: Uuid) -> Result<()> {
    if rows_affected == 0 {
        return Err(HbnbError::not_found(entity, id));
    }
    Ok(())
}

async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

// ---------------------------------------------------------------- users

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
            timestamps: Timestamps {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const USER_SELECT: &str = "SELECT id, first_name, last_name, email, password_hash, is_admin, created_at, updated_at FROM users";

fn duplicate_email() -> HbnbError {
    ValidationError::new("email", "email already registered").into()
}

pub struct PgUserRepository {
    pub pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<User> for PgUserRepository {
    async fn add(&self, user: User) -> Result<User> {
        sqlx::query(
            r#"INSERT INTO users (id, first_name, last_name, email, password_hash, is_admin, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.timestamps.created_at)
        .bind(user.timestamps.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, duplicate_email))?;
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn save(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"UPDATE users
               SET first_name = $2, last_name = $3, email = $4, password_hash = $5, is_admin = $6, updated_at = $7
               WHERE id = $1"#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.timestamps.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, duplicate_email))?;
        ensure_found(result.rows_affected(), User::NAME, user.id)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_by_attribute(&self, attribute: &UserAttribute) -> Result<Option<User>> {
        Ok(self.find_all_by_attribute(attribute).await?.into_iter().next())
    }

    async fn find_all_by_attribute(&self, attribute: &UserAttribute) -> Result<Vec<User>> {
        let rows = match attribute {
            UserAttribute::Email(email) => {
                sqlx::query_as::<_, UserRow>(&format!(
                    "{USER_SELECT} WHERE lower(email) = lower($1) ORDER BY created_at, id"
                ))
                .bind(email.trim())
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn ping(&self) -> Result<()> {
        ping(&self.pool).await
    }
}

// ------------------------------------------------------------ amenities

#[derive(sqlx::FromRow)]
struct AmenityRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AmenityRow> for Amenity {
    fn from(row: AmenityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            timestamps: Timestamps {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const AMENITY_SELECT: &str = "SELECT id, name, created_at, updated_at FROM amenities";

fn duplicate_amenity() -> HbnbError {
    ValidationError::new("name", "amenity name already exists").into()
}

pub struct PgAmenityRepository {
    pub pool: PgPool,
}

impl PgAmenityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Amenity> for PgAmenityRepository {
    async fn add(&self, amenity: Amenity) -> Result<Amenity> {
        sqlx::query(
            "INSERT INTO amenities (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(amenity.id)
        .bind(&amenity.name)
        .bind(amenity.timestamps.created_at)
        .bind(amenity.timestamps.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, duplicate_amenity))?;
        Ok(amenity)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Amenity>> {
        let row = sqlx::query_as::<_, AmenityRow>(&format!("{AMENITY_SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Amenity::from))
    }

    async fn get_all(&self) -> Result<Vec<Amenity>> {
        let rows =
            sqlx::query_as::<_, AmenityRow>(&format!("{AMENITY_SELECT} ORDER BY created_at, id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Amenity::from).collect())
    }

    async fn save(&self, amenity: &Amenity) -> Result<()> {
        let result = sqlx::query("UPDATE amenities SET name = $2, updated_at = $3 WHERE id = $1")
            .bind(amenity.id)
            .bind(&amenity.name)
            .bind(amenity.timestamps.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_violation(e, duplicate_amenity))?;
        ensure_found(result.rows_affected(), Amenity::NAME, amenity.id)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM amenities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_by_attribute(&self, attribute: &AmenityAttribute) -> Result<Option<Amenity>> {
        Ok(self.find_all_by_attribute(attribute).await?.into_iter().next())
    }

    async fn find_all_by_attribute(&self, attribute: &AmenityAttribute) -> Result<Vec<Amenity>> {
        let rows = match attribute {
            AmenityAttribute::Name(name) => {
                sqlx::query_as::<_, AmenityRow>(&format!(
                    "{AMENITY_SELECT} WHERE lower(name) = lower($1) ORDER BY created_at, id"
                ))
                .bind(name.trim())
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(Amenity::from).collect())
    }

    async fn ping(&self) -> Result<()> {
        ping(&self.pool).await
    }
}

// --------------------------------------------------------------- places

#[derive(sqlx::FromRow)]
struct PlaceRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    price: f64,
    latitude: f64,
    longitude: f64,
    owner_id: Uuid,
    amenities: Vec<Uuid>,
    reviews: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            latitude: row.latitude,
            longitude: row.longitude,
            owner_id: row.owner_id,
            amenities: row.amenities,
            reviews: row.reviews,
            timestamps: Timestamps {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

// Amenity links and review ids are folded into the row so one query loads a whole place.
const PLACE_SELECT: &str = r#"
    SELECT p.id, p.title, p.description, p.price, p.latitude, p.longitude, p.owner_id,
           ARRAY(SELECT pa.amenity_id FROM place_amenity pa
                 WHERE pa.place_id = p.id ORDER BY pa.position) AS amenities,
           ARRAY(SELECT r.id FROM reviews r
                 WHERE r.place_id = p.id ORDER BY r.created_at, r.id) AS reviews,
           p.created_at, p.updated_at
    FROM places p"#;

async fn replace_amenity_links(
    tx: &mut Transaction<'_, Postgres>,
    place_id: Uuid,
    amenities: &[Uuid],
) -> Result<()> {
    sqlx::query("DELETE FROM place_amenity WHERE place_id = $1")
        .bind(place_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query(
        r#"INSERT INTO place_amenity (place_id, amenity_id, position)
           SELECT $1, link.amenity_id, link.ord::int
           FROM UNNEST($2::uuid[]) WITH ORDINALITY AS link(amenity_id, ord)"#,
    )
    .bind(place_id)
    .bind(amenities)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub struct PgPlaceRepository {
    pub pool: PgPool,
}

impl PgPlaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Place> for PgPlaceRepository {
    async fn add(&self, place: Place) -> Result<Place> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"INSERT INTO places (id, title, description, price, latitude, longitude, owner_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(place.id)
        .bind(&place.title)
        .bind(&place.description)
        .bind(place.price)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(place.owner_id)
        .bind(place.timestamps.created_at)
        .bind(place.timestamps.updated_at)
        .execute(&mut *tx)
        .await?;
        replace_amenity_links(&mut tx, place.id, &place.amenities).await?;
        tx.commit().await?;
        Ok(place)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Place>> {
        let row = sqlx::query_as::<_, PlaceRow>(&format!("{PLACE_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Place::from))
    }

    async fn get_all(&self) -> Result<Vec<Place>> {
        let rows =
            sqlx::query_as::<_, PlaceRow>(&format!("{PLACE_SELECT} ORDER BY p.created_at, p.id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Place::from).collect())
    }

    /// The review list is derived from the reviews table and is not written here.
    async fn save(&self, place: &Place) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"UPDATE places
               SET title = $2, description = $3, price = $4, latitude = $5, longitude = $6, updated_at = $7
               WHERE id = $1"#,
        )
        .bind(place.id)
        .bind(&place.title)
        .bind(&place.description)
        .bind(place.price)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(place.timestamps.updated_at)
        .execute(&mut *tx)
        .await?;
        ensure_found(result.rows_affected(), Place::NAME, place.id)?;
        replace_amenity_links(&mut tx, place.id, &place.amenities).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_by_attribute(&self, attribute: &PlaceAttribute) -> Result<Option<Place>> {
        Ok(self.find_all_by_attribute(attribute).await?.into_iter().next())
    }

    async fn find_all_by_attribute(&self, attribute: &PlaceAttribute) -> Result<Vec<Place>> {
        let (clause, value) = match attribute {
            PlaceAttribute::Owner(owner_id) => ("p.owner_id = $1", *owner_id),
            PlaceAttribute::Amenity(amenity_id) => (
                "EXISTS (SELECT 1 FROM place_amenity pa WHERE pa.place_id = p.id AND pa.amenity_id = $1)",
                *amenity_id,
            ),
        };
        let rows = sqlx::query_as::<_, PlaceRow>(&format!(
            "{PLACE_SELECT} WHERE {clause} ORDER BY p.created_at, p.id"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Place::from).collect())
    }

    async fn ping(&self) -> Result<()> {
        ping(&self.pool).await
    }
}

#[async_trait]
impl PlaceRepository for PgPlaceRepository {
    /// Review ids are read from the reviews table, so there is nothing to record.
    async fn link_review(&self, _place_id: Uuid, _review_id: Uuid) -> Result<()> {
        Ok(())
    }

    async fn unlink_review(&self, _place_id: Uuid, _review_id: Uuid) -> Result<()> {
        Ok(())
    }

    async fn link_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            r#"INSERT INTO place_amenity (place_id, amenity_id, position)
               SELECT $1, $2, COALESCE(MAX(position), 0) + 1
               FROM place_amenity WHERE place_id = $1
               ON CONFLICT DO NOTHING"#,
        )
        .bind(place_id)
        .bind(amenity_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            let result = sqlx::query(
                r#"UPDATE places
                   SET updated_at = GREATEST(date_trunc('microseconds', clock_timestamp()),
                                             updated_at + interval '1 microsecond')
                   WHERE id = $1"#,
            )
            .bind(place_id)
            .execute(&mut *tx)
            .await?;
            ensure_found(result.rows_affected(), Place::NAME, place_id)?;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn unlink_amenity(&self, amenity_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM place_amenity WHERE amenity_id = $1")
            .bind(amenity_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// -------------------------------------------------------------- reviews

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    text: String,
    rating: i32,
    place_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            rating: row.rating,
            place_id: row.place_id,
            user_id: row.user_id,
            timestamps: Timestamps {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const REVIEW_SELECT: &str =
    "SELECT id, text, rating, place_id, user_id, created_at, updated_at FROM reviews";

pub struct PgReviewRepository {
    pub pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Review> for PgReviewRepository {
    async fn add(&self, review: Review) -> Result<Review> {
        sqlx::query(
            r#"INSERT INTO reviews (id, text, rating, place_id, user_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(review.id)
        .bind(&review.text)
        .bind(review.rating)
        .bind(review.place_id)
        .bind(review.user_id)
        .bind(review.timestamps.created_at)
        .bind(review.timestamps.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            unique_violation(e, || {
                HbnbError::conflict("You have already reviewed this place")
            })
        })?;
        Ok(review)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!("{REVIEW_SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Review::from))
    }

    async fn get_all(&self) -> Result<Vec<Review>> {
        let rows =
            sqlx::query_as::<_, ReviewRow>(&format!("{REVIEW_SELECT} ORDER BY created_at, id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn save(&self, review: &Review) -> Result<()> {
        let result =
            sqlx::query("UPDATE reviews SET text = $2, rating = $3, updated_at = $4 WHERE id = $1")
                .bind(review.id)
                .bind(&review.text)
                .bind(review.rating)
                .bind(review.timestamps.updated_at)
                .execute(&self.pool)
                .await?;
        ensure_found(result.rows_affected(), Review::NAME, review.id)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_by_attribute(&self, attribute: &ReviewAttribute) -> Result<Option<Review>> {
        Ok(self.find_all_by_attribute(attribute).await?.into_iter().next())
    }

    async fn find_all_by_attribute(&self, attribute: &ReviewAttribute) -> Result<Vec<Review>> {
        let (clause, values) = match attribute {
            ReviewAttribute::Author(user_id) => ("user_id = $1", vec![*user_id]),
            ReviewAttribute::Place(place_id) => ("place_id = $1", vec![*place_id]),
            ReviewAttribute::AuthorAndPlace { user_id, place_id } => {
                ("user_id = $1 AND place_id = $2", vec![*user_id, *place_id])
            }
        };
        let sql = format!("{REVIEW_SELECT} WHERE {clause} ORDER BY created_at, id");
        let mut query = sqlx::query_as::<_, ReviewRow>(&sql);
        for value in values {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn ping(&self) -> Result<()> {
        ping(&self.pool).await
    }
}
