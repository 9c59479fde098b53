use tracing::info;
use uuid::Uuid;

use crate::domain::{Amenity, Entity, User};
use crate::error::Result;
use crate::services::HbnbFacade;
use crate::services::facade::{NewAmenity, NewPlace, NewReview, NewUser};

const AMENITIES: [&str; 8] = [
    "WiFi",
    "Air Conditioning",
    "Swimming Pool",
    "Parking",
    "Kitchen",
    "TV",
    "Heating",
    "Balcony",
];

const USERS: [(&str, &str, &str); 3] = [
    ("John", "Doe", "john@example.com"),
    ("Jane", "Smith", "jane@example.com"),
    ("Bob", "Johnson", "bob@example.com"),
];

struct SamplePlace {
    title: &'static str,
    description: &'static str,
    price: f64,
    latitude: f64,
    longitude: f64,
    owner: usize,
    amenities: &'static [&'static str],
}

const PLACES: [SamplePlace; 3] = [
    SamplePlace {
        title: "Cozy Downtown Apartment",
        description: "A beautiful 2-bedroom apartment in the heart of the city with modern amenities.",
        price: 120.50,
        latitude: 40.7589,
        longitude: -73.9851,
        owner: 0,
        amenities: &["WiFi", "Air Conditioning", "Parking", "Kitchen", "TV"],
    },
    SamplePlace {
        title: "Beachfront Villa",
        description: "Stunning oceanview villa with private beach access and luxury furnishings.",
        price: 450.00,
        latitude: 25.7617,
        longitude: -80.1918,
        owner: 1,
        amenities: &[
            "WiFi",
            "Air Conditioning",
            "Swimming Pool",
            "Parking",
            "Kitchen",
            "TV",
            "Balcony",
        ],
    },
    SamplePlace {
        title: "Mountain Cabin Retreat",
        description: "Peaceful cabin in the mountains, perfect for nature lovers and hiking enthusiasts.",
        price: 85.75,
        latitude: 39.7392,
        longitude: -104.9903,
        owner: 0,
        amenities: &["WiFi", "Kitchen", "Heating"],
    },
];

// (text, rating, author index, place index)
const REVIEWS: [(&str, i32, usize, usize); 3] = [
    (
        "Amazing place! The location was perfect and the apartment was exactly as described.",
        5,
        1,
        0,
    ),
    (
        "Beautiful villa with incredible ocean views. Would definitely stay again!",
        5,
        2,
        1,
    ),
    (
        "The cabin was cozy and peaceful. Great for a weekend getaway from the city.",
        4,
        2,
        2,
    ),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub amenities: usize,
    pub places: usize,
    pub reviews: usize,
}

/// Populate an empty store with an administrator and sample data.
///
/// Sample users share `sample_password`. Refuses to run twice: the admin
/// email is unique.
pub async fn seed(
    facade: &HbnbFacade,
    admin_email: &str,
    admin_password: &str,
    sample_password: &str,
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    facade
        .create_user(NewUser {
            first_name: "System".into(),
            last_name: "Administrator".into(),
            email: admin_email.into(),
            password: admin_password.into(),
            is_admin: true,
        })
        .await?;
    summary.users += 1;

    let mut amenities: Vec<Amenity> = Vec::with_capacity(AMENITIES.len());
    for name in AMENITIES {
        amenities.push(facade.create_amenity(NewAmenity { name: name.into() }).await?);
    }
    summary.amenities = amenities.len();

    let mut users: Vec<User> = Vec::with_capacity(USERS.len());
    for (first_name, last_name, email) in USERS {
        let user = facade
            .create_user(NewUser {
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: email.into(),
                password: sample_password.into(),
                is_admin: false,
            })
            .await?;
        users.push(user);
    }
    summary.users += users.len();

    let mut place_ids: Vec<Uuid> = Vec::with_capacity(PLACES.len());
    for sample in &PLACES {
        let amenity_ids = sample
            .amenities
            .iter()
            .filter_map(|name| amenities.iter().find(|a| a.name() == *name))
            .map(|a| a.id())
            .collect();
        let place = facade
            .create_place(
                users[sample.owner].id(),
                NewPlace {
                    title: sample.title.into(),
                    description: Some(sample.description.into()),
                    price: sample.price,
                    latitude: sample.latitude,
                    longitude: sample.longitude,
                    owner_id: None,
                    amenities: amenity_ids,
                },
            )
            .await?;
        place_ids.push(place.id());
    }
    summary.places = place_ids.len();

    for (text, rating, author, place) in REVIEWS {
        facade
            .create_review(
                users[author].id(),
                NewReview {
                    text: text.into(),
                    rating,
                    place_id: place_ids[place],
                },
            )
            .await?;
        summary.reviews += 1;
    }

    info!(?summary, "Sample data seeded");
    Ok(summary)
}
