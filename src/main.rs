mod config;
mod core;
mod models;
mod routes;
mod services;

use crate::config::Settings;
use crate::core::SearchEngine;
use crate::routes::{AppState, SearchLimits};
use crate::services::{PreferenceCache, RatingAggregator, Store};
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Rives search service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize the PostgreSQL store (runs migrations on startup)
    let store = Arc::new(
        Store::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
        )
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        }),
    );

    info!(
        "Store initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    // Preference cache in front of the store
    let cache_capacity = settings.cache.capacity.unwrap_or(1000);
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let preferences = Arc::new(PreferenceCache::new(cache_capacity, cache_ttl));

    info!(
        "Preference cache initialized ({} entries, TTL: {}s)",
        cache_capacity, cache_ttl
    );

    // Rating aggregator for the review-recorded side effect
    let aggregator = Arc::new(RatingAggregator::new(store.clone()));

    let limits = SearchLimits {
        default_limit: settings.search.default_limit.unwrap_or(10),
        max_limit: settings.search.max_limit.unwrap_or(100),
        max_candidates: settings.search.max_candidates.unwrap_or(2000),
        default_radius_km: settings.search.default_radius_km.unwrap_or(10.0),
    };

    info!("Search limits: {:?}", limits);

    // Build application state
    let app_state = AppState {
        store,
        preferences,
        aggregator,
        engine: SearchEngine::new(),
        limits,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
