#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use hbnb::api;
use hbnb::domain::Entity;
use hbnb::services::facade::NewUser;
use hbnb::services::{HbnbFacade, jwt_service::JwtService};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "test_secret";
pub const PASSWORD: &str = "password123";

/// Router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub facade: Arc<HbnbFacade>,
}

impl TestApp {
    pub fn new() -> Self {
        let facade = Arc::new(HbnbFacade::in_memory(Arc::new(JwtService::new(SECRET))));
        Self {
            router: api::router(facade.clone()),
            facade,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None, None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Register through the open endpoint and log in.
    pub async fn user(&self, first_name: &str, email: &str) -> (Uuid, String) {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "first_name": first_name,
                    "last_name": "Tester",
                    "email": email,
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let id = body["id"].as_str().unwrap().parse().unwrap();
        (id, self.login(email, PASSWORD).await)
    }

    /// Administrators cannot self-register, so go through the facade.
    pub async fn admin(&self) -> (Uuid, String) {
        let admin = self
            .facade
            .create_user(NewUser {
                first_name: "System".into(),
                last_name: "Administrator".into(),
                email: "admin@hbnb.com".into(),
                password: "admin123".into(),
                is_admin: true,
            })
            .await
            .unwrap();
        (admin.id(), self.login("admin@hbnb.com", "admin123").await)
    }

    pub async fn create_place(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/places/",
                Some(token),
                Some(json!({
                    "title": title,
                    "description": "Somewhere nice",
                    "price": 100.0,
                    "latitude": 37.77,
                    "longitude": -122.42,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "place creation failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_amenity(&self, admin_token: &str, name: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/amenities/",
                Some(admin_token),
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "amenity creation failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }
}
