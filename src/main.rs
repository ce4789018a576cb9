//! Inversia Auth
//!
//! User authentication and AI usage quota API using Rust + Actix-Web.
//! Registration, login, token refresh, password reset, and per-user AI
//! quota accounting over PostgreSQL.

use actix_web::{middleware, web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;

mod api;
mod auth;
mod config;
mod db;

use crate::api::middleware::RequireAuth;
use crate::auth::TokenIssuer;
use crate::config::Settings;
use crate::db::DbPool;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub pool: DbPool,
    pub tokens: TokenIssuer,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("inversia_auth=info".parse().unwrap())
                .add_directive("actix_web=info".parse().unwrap()),
        )
        .json()
        .init();

    // Load configuration
    let settings = Settings::load().expect("Failed to load configuration");
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!(
        "Starting Inversia Auth v{} on {} ({:?})",
        env!("CARGO_PKG_VERSION"),
        bind_addr,
        settings.environment
    );

    // An auth API cannot serve anything without its store; fail fast on a
    // bad URL, but let a slow-starting database come up behind the pool.
    let pool = DbPool::new(&settings.database).expect("Failed to create database pool");
    if let Err(e) = pool.test_connection().await {
        tracing::warn!("Database connection test failed: {}. Pool will retry lazily.", e);
    }

    let tokens = TokenIssuer::new(&settings.auth).expect("JWT secret must be configured");

    let workers = settings
        .server
        .workers
        .unwrap_or_else(|| num_cpus::get() * 2);

    // Create shared application state
    let app_state = web::Data::new(AppState {
        settings: settings.clone(),
        pool: pool.clone(),
        tokens: tokens.clone(),
    });

    // Configure and start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "inversia-auth"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION"))),
            )
            .configure(|cfg| {
                api::configure_routes(cfg, RequireAuth::new(pool.clone(), tokens.clone()))
            })
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
