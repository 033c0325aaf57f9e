use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sweetshop_backend::config::AppConfig;
use sweetshop_backend::database::{Database, DatabaseConfig};
use sweetshop_backend::handlers;
use sweetshop_backend::middleware::AuthMiddleware;
use sweetshop_backend::repositories::{MemoryStore, PgStore, Store};
use sweetshop_backend::services::Services;
use sweetshop_backend::utils::jwt::JwtService;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    info!("Starting sweet shop backend on {}:{}", config.host, config.port);

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let database = Database::connect(&DatabaseConfig::new(url, config.database_max_connections))
                .await
                .context("failed to connect to PostgreSQL")?;
            database.migrate().await.context("failed to run migrations")?;
            Arc::new(PgStore::new(database.pool().clone()))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store, data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let jwt_service = JwtService::new(&config.jwt_secret).context("invalid JWT configuration")?;
    let services = Services::new(store, jwt_service.clone());
    let cors_origin = config.cors_allowed_origin.clone();

    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
            None => Cors::permissive(),
        };

        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(handlers::configure_app(services.clone()))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    Ok(())
}
