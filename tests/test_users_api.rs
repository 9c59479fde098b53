mod common;

use axum::http::StatusCode;
use common::{PASSWORD, TestApp};
use rstest::*;
use serde_json::{Value, json};
use test_case::test_case;

#[fixture]
fn app() -> TestApp {
    TestApp::new()
}

fn new_user_body(email: &str) -> Value {
    json!({
        "first_name": "Grace",
        "last_name": "Hopper",
        "email": email,
        "password": "cobol-rules",
    })
}

#[rstest]
#[tokio::test]
async fn test_create_user_is_admin_only(app: TestApp) {
    let (_, admin) = app.admin().await;
    let (_, regular) = app.user("Reg", "reg@example.com").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/users/",
            Some(&regular),
            Some(new_user_body("grace@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request("POST", "/api/v1/users/", None, Some(new_user_body("grace@example.com")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/users/",
            Some(&admin),
            Some(new_user_body("grace@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "grace@example.com");
    assert_eq!(body["is_admin"], false);
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
    assert!(body["created_at"].is_string());
}

#[rstest]
#[tokio::test]
async fn test_list_and_get_users_are_public(app: TestApp) {
    let (id, _) = app.user("Pub", "pub@example.com").await;

    let (status, body) = app.get("/api/v1/users/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.get(&format!("/api/v1/users/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Pub");

    let (status, body) = app
        .get(&format!("/api/v1/users/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, _) = app.get("/api/v1/users/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_self_update_names(app: TestApp) {
    let (id, token) = app.user("Sam", "sam@example.com").await;
    let uri = format!("/api/v1/users/{id}");
    let (_, before) = app.get(&uri).await;

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "first_name": "Samuel", "id": "ignored" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Samuel");
    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["created_at"], before["created_at"]);
    assert_ne!(body["updated_at"], before["updated_at"]);
}

#[test_case(json!({ "email": "new@example.com" }) ; "email")]
#[test_case(json!({ "password": "new-password" }) ; "password")]
#[test_case(json!({ "is_admin": true }) ; "admin flag")]
#[tokio::test]
async fn test_self_update_of_credentials_forbidden(payload: Value) {
    let app = TestApp::new();
    let (id, token) = app.user("Sam", "sam@example.com").await;

    let (status, _) = app
        .request("PUT", &format!("/api/v1/users/{id}"), Some(&token), Some(payload))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let user = app.facade.get_user(id).await.unwrap();
    assert_eq!(user.email(), "sam@example.com");
    assert!(!user.is_admin());
}

#[rstest]
#[tokio::test]
async fn test_cannot_update_someone_else(app: TestApp) {
    let (victim, _) = app.user("Vic", "vic@example.com").await;
    let (_, attacker) = app.user("Ann", "ann@example.com").await;

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/v1/users/{victim}"),
            Some(&attacker),
            Some(json!({ "first_name": "Pwned" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test]
async fn test_admin_updates_credentials(app: TestApp) {
    let (_, admin) = app.admin().await;
    let (id, _) = app.user("Sam", "sam@example.com").await;
    let uri = format!("/api/v1/users/{id}");

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            Some(&admin),
            Some(json!({ "email": "samuel@example.com", "password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "samuel@example.com");

    app.login("samuel@example.com", "brand-new-pass").await;
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "samuel@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("PUT", &uri, Some(&admin), Some(json!({ "email": "broken" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn test_admin_cannot_steal_an_email(app: TestApp) {
    let (_, admin) = app.admin().await;
    app.user("Taken", "taken@example.com").await;
    let (id, _) = app.user("Other", "other@example.com").await;

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/v1/users/{id}"),
            Some(&admin),
            Some(json!({ "email": "Taken@Example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn test_delete_user_cascades(app: TestApp) {
    let (_, admin) = app.admin().await;
    let (host_id, host) = app.user("Host", "host@example.com").await;
    let (_, guest) = app.user("Guest", "guest@example.com").await;
    let place_id = app.create_place(&host, "Doomed Cottage").await;
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/reviews/",
            Some(&guest),
            Some(json!({ "text": "Lovely", "rating": 5, "place_id": place_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/v1/users/{host_id}");
    let (status, _) = app.request("DELETE", &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.request("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/v1/places/{place_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, reviews) = app.get("/api/v1/reviews/").await;
    assert!(reviews.as_array().unwrap().is_empty());

    let (status, _) = app.request("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
