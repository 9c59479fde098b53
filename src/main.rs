use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use hbnb::api;
use hbnb::config::{Settings, StorageKind};
use hbnb::handler::logging::init_logging;
use hbnb::repository::sqlx_impl::MIGRATOR;
use hbnb::services::{HbnbFacade, jwt_service::JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    init_logging(settings.log_level);
    if settings.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    // Initialize health check
    api::health::init_health_check();

    let jwt_service = Arc::new(JwtService::with_ttl(
        &settings.jwt_secret,
        chrono::Duration::seconds(settings.jwt_expires_secs),
    ));

    let facade = match settings.storage {
        StorageKind::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(settings.database_max_connections)
                .connect(&settings.database_url)
                .await
                .context("failed to connect to the database")?;
            MIGRATOR
                .run(&pool)
                .await
                .context("failed to run database migrations")?;
            HbnbFacade::postgres(pool, jwt_service)
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            HbnbFacade::in_memory(jwt_service)
        }
    };

    let app = api::router(Arc::new(facade));

    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    tracing::info!("HBnB server starting on http://{}", settings.bind_addr);
    tracing::info!("  • Health: /api/health, /api/health/ready, /api/health/live");
    tracing::info!("  • Auth: /api/v1/auth/login, /api/v1/auth/register, /api/v1/auth/protected");
    tracing::info!("  • Resources: /api/v1/users, /api/v1/amenities, /api/v1/places, /api/v1/reviews");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
