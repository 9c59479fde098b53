mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{PASSWORD, SECRET, TestApp};
use hbnb::services::jwt_service::JwtService;
use rstest::*;
use serde_json::json;
use test_case::test_case;

#[fixture]
fn app() -> TestApp {
    TestApp::new()
}

#[rstest]
#[tokio::test]
async fn test_register_and_login(app: TestApp) {
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "password": "analytical",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "ada@example.com");
    assert!(body["id"].is_string());
    assert!(body.get("password").is_none());

    let token = app.login("ada@example.com", "analytical").await;
    assert!(!token.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_register_cannot_grant_admin(app: TestApp) {
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "first_name": "Mallory",
                "last_name": "Sneaky",
                "email": "mallory@example.com",
                "password": PASSWORD,
                "is_admin": true,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let user = app
        .facade
        .get_user(body["id"].as_str().unwrap().parse().unwrap())
        .await
        .unwrap();
    assert!(!user.is_admin());
}

#[test_case("not-an-email", "password123" ; "bad email")]
#[test_case("short@example.com", "12345" ; "short password")]
#[test_case("", "password123" ; "empty email")]
#[tokio::test]
async fn test_register_validation(email: &str, password: &str) {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "first_name": "Test",
                "last_name": "User",
                "email": email,
                "password": password,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status_code"], 400);
}

#[rstest]
#[tokio::test]
async fn test_duplicate_email_rejected_case_insensitively(app: TestApp) {
    app.user("First", "dup@example.com").await;
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "first_name": "Second",
                "last_name": "User",
                "email": "DUP@example.com",
                "password": PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("email"));
}

#[rstest]
#[tokio::test]
async fn test_bad_credentials_are_indistinguishable(app: TestApp) {
    app.user("Known", "known@example.com").await;

    let (wrong_status, wrong_body) = app
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "known@example.com", "password": "not-it" })),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": PASSWORD })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["message"], unknown_body["message"]);
    assert_eq!(wrong_body["message"], "Invalid credentials");
}

#[rstest]
#[tokio::test]
async fn test_protected_endpoint(app: TestApp) {
    let (id, token) = app.user("Pat", "pat@example.com").await;

    let (status, body) = app
        .request("GET", "/api/v1/auth/protected", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], id.to_string());
    assert_eq!(body["is_admin"], false);

    let (status, body) = app.get("/api/v1/auth/protected").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing authorization header");

    let (status, body) = app
        .request("GET", "/api/v1/auth/protected", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[rstest]
#[tokio::test]
async fn test_expired_token_rejected(app: TestApp) {
    let (id, _) = app.user("Old", "old@example.com").await;
    let user = app.facade.get_user(id).await.unwrap();
    let expired = JwtService::with_ttl(SECRET, Duration::seconds(-120))
        .generate_token(&user)
        .unwrap();

    let (status, _) = app
        .request("GET", "/api/v1/auth/protected", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn test_token_signed_elsewhere_rejected(app: TestApp) {
    let (id, _) = app.user("Eve", "eve@example.com").await;
    let user = app.facade.get_user(id).await.unwrap();
    let forged = JwtService::new("another_secret")
        .generate_token(&user)
        .unwrap();

    let (status, _) = app
        .request("GET", "/api/v1/auth/protected", Some(&forged), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn test_admin_only_endpoint(app: TestApp) {
    let (_, admin) = app.admin().await;
    let (_, regular) = app.user("Reg", "reg@example.com").await;

    let (status, _) = app
        .request("GET", "/api/v1/auth/admin-only", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request("GET", "/api/v1/auth/admin-only", Some(&regular), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status_code"], 403);

    let (status, _) = app.get("/api/v1/auth/admin-only").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
