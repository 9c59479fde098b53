use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::domain::User;
use crate::domain::user::Password;
use crate::services::HbnbFacade;
use crate::services::jwt_service::JwtService;
use crate::services::password::{hash_password, verify_password};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub storage: StorageHealth,
    pub services: ServicesHealth,
}

#[derive(Serialize)]
pub struct StorageHealth {
    pub status: String,
    pub response_time_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct ServicesHealth {
    pub jwt_service: String,
    pub password_hashing: String,
}

static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

pub fn init_health_check() {
    START_TIME.set(SystemTime::now()).ok();
}

fn status_str(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

// GET /api/health
pub async fn health_check(Extension(facade): Extension<Arc<HbnbFacade>>) -> impl IntoResponse {
    let start_time = START_TIME.get().copied().unwrap_or_else(SystemTime::now);
    let uptime = SystemTime::now()
        .duration_since(start_time)
        .unwrap_or_default()
        .as_secs();

    let storage = check_storage_health(&facade).await;
    let services = check_services_health(&facade.jwt_service());

    let healthy = storage.status == "healthy"
        && services.jwt_service == "healthy"
        && services.password_hashing == "healthy";

    let response = HealthResponse {
        status: status_str(healthy),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        storage,
        services,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

// GET /api/health/ready
pub async fn readiness_check(Extension(facade): Extension<Arc<HbnbFacade>>) -> impl IntoResponse {
    match facade.storage_ready().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "timestamp": Utc::now().to_rfc3339()
            })),
        ),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "timestamp": Utc::now().to_rfc3339(),
                    "error": "storage_unavailable"
                })),
            )
        }
    }
}

// GET /api/health/live
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "alive",
            "timestamp": Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

async fn check_storage_health(facade: &HbnbFacade) -> StorageHealth {
    let start = Instant::now();
    let result = facade.storage_ready().await;
    let response_time = start.elapsed().as_millis() as u64;

    if let Err(e) = &result {
        tracing::warn!("Storage health check failed: {}", e);
    }
    StorageHealth {
        status: status_str(result.is_ok()),
        response_time_ms: Some(response_time),
    }
}

fn check_services_health(jwt_service: &JwtService) -> ServicesHealth {
    ServicesHealth {
        jwt_service: status_str(jwt_round_trip(jwt_service)),
        password_hashing: status_str(password_round_trip()),
    }
}

fn jwt_round_trip(jwt_service: &JwtService) -> bool {
    let Ok(sample) = User::new("Health", "Check", "health-check@hbnb.local", String::new(), false) else {
        return false;
    };
    jwt_service
        .generate_token(&sample)
        .and_then(|token| jwt_service.verify_token(&token))
        .is_ok()
}

fn password_round_trip() -> bool {
    let Ok(password) = Password::try_from("health-check") else {
        return false;
    };
    hash_password(&password)
        .map(|hash| verify_password("health-check", &hash))
        .unwrap_or(false)
}
