use anyhow::Context;
use clap::{Parser, Subcommand};
use hbnb::config::Settings;
use hbnb::domain::Entity;
use hbnb::handler::logging::{LogLevel, init_logging};
use hbnb::repository::sqlx_impl::MIGRATOR;
use hbnb::services::facade::NewUser;
use hbnb::services::jwt_service::JwtService;
use hbnb::services::{HbnbFacade, seed};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Parser)]
#[clap(name = "HBnB CLI", about = "Administrative tasks against the HBnB database")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user directly, optionally as an administrator
    CreateUser {
        #[clap(long)]
        first_name: String,
        #[clap(long)]
        last_name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        admin: bool,
    },
    /// Create the administrator plus sample amenities, users, places and reviews
    Seed {
        #[clap(long, default_value = "admin@hbnb.com")]
        admin_email: String,
        #[clap(long, default_value = "admin123")]
        admin_password: String,
        #[clap(long, default_value = "password123")]
        sample_password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging(LogLevel::Error);
    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    let pool = PgPool::connect(&settings.database_url)
        .await
        .context("failed to connect to the database")?;
    MIGRATOR
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    // Tokens are never issued here, so the secret is irrelevant.
    let jwt_service = Arc::new(JwtService::new("hbnb-cli"));
    let facade = HbnbFacade::postgres(pool, jwt_service);

    match cli.command {
        Commands::CreateUser {
            first_name,
            last_name,
            email,
            password,
            admin,
        } => {
            let req = NewUser {
                first_name,
                last_name,
                email,
                password,
                is_admin: admin,
            };
            match facade.create_user(req).await {
                Ok(u) => println!(
                    "Created user {} <{}> (admin={})",
                    u.id(),
                    u.email(),
                    u.is_admin()
                ),
                Err(e) => eprintln!("Error creating user: {}", e),
            }
        }
        Commands::Seed {
            admin_email,
            admin_password,
            sample_password,
        } => match seed::seed(&facade, &admin_email, &admin_password, &sample_password).await {
            Ok(summary) => println!(
                "Seeded {} users, {} amenities, {} places, {} reviews",
                summary.users, summary.amenities, summary.places, summary.reviews
            ),
            Err(e) => eprintln!("Seeding failed: {}", e),
        },
    }

    Ok(())
}
