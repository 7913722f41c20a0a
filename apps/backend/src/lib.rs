pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use verse_core::{get_scheduler, study_day, CardScheduler, Clock, SystemClock};

use crate::config::Config;
use crate::db::Database;
use crate::store::Store;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub scheduler: Arc<dyn CardScheduler>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current study day, shifted by the configured reset hour.
    pub fn today(&self) -> NaiveDate {
        study_day(self.now(), self.config.daily_reset_hour)
    }
}

/// Build the HTTP router over the given state.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Account
        .route("/api/account/status", get(routes::account::status))
        // Library
        .route("/api/library", get(routes::library::load))
        // Verses
        .route("/api/verses", get(routes::verses::list).post(routes::verses::create))
        .route("/api/verses/:id/star", put(routes::verses::star))
        .route("/api/verses/:id", delete(routes::verses::remove))
        // Collections
        .route(
            "/api/collections",
            get(routes::collections::list).post(routes::collections::create),
        )
        .route("/api/collections/:id", delete(routes::collections::remove))
        .route("/api/collections/:id/drip", put(routes::collections::update_drip))
        // Review
        .route("/api/review/queue", post(routes::review::queue))
        .route("/api/review/grade", post(routes::review::grade))
        // Profile
        .route("/api/profile", get(routes::profile::get))
        .route("/api/profile/level-up/ack", post(routes::profile::acknowledge_level_up))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/account/register", post(routes::account::register))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    logging::init_tracing(&config.log_level);

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let scheduler = get_scheduler(&config.scheduler)
        .ok_or_else(|| anyhow::anyhow!("unknown scheduler: {}", config.scheduler))?;

    let addr = config.bind_addr();
    let state = AppState {
        store: Arc::new(db),
        scheduler: Arc::from(scheduler),
        clock: Arc::new(SystemClock),
        config: Arc::new(config),
    };

    tracing::info!(
        scheduler = state.scheduler.name(),
        reset_hour = state.config.daily_reset_hour,
        "Starting server on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
