use std::sync::Arc;

use clients::ModelRegistry;
use config::Config;
use repositories::PostgresRepo;
use routes::create_routes;
use services::{
    auth::AuthService, content::ContentService, events::EventsService, image::ImageService,
    posts::PostsService,
};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use self::errors::{Error, Result};

mod clients;
mod config;
mod errors;
mod handlers;
mod ingest;
mod models;
mod repositories;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

#[derive(Clone)]
pub struct AppState {
    pub posts_service: PostsService,
    pub auth_service: AuthService,
    pub events_service: EventsService,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        error!("Server failed to start: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::init()?;

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| Error::Config(format!("failed to run migrations: {}", e)))?;

    let registry = ModelRegistry::from_config(&config)?;
    let repo = Arc::new(PostgresRepo::new(pool));

    let app_state = AppState {
        posts_service: PostsService::new(
            repo,
            ContentService::new(registry.chat.clone()),
            ImageService::new(
                registry.images.clone(),
                registry.storage.clone(),
                config.image_dir.clone(),
                config.public_base_url.clone(),
            ),
            config.image_count,
        ),
        auth_service: AuthService::new(registry.identity.clone()),
        events_service: EventsService::new(
            registry.calendar.clone(),
            config.calendar.time_zone.clone(),
        ),
    };

    tokio::fs::create_dir_all(&config.image_dir).await?;
    let app = create_routes(Arc::new(app_state), &config.image_dir);

    let listener = tokio::net::TcpListener::bind(format!("[::]:{}", config.port)).await?;
    info!(port = config.port, "Listening");
    axum::serve(listener, app).await?;
    Ok(())
}
