use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use foodshare_algo::config::Settings;
use foodshare_algo::core::{ProximityMatcher, WastageEstimator};
use foodshare_algo::routes::{self, AppState};
use foodshare_algo::services::{CacheManager, CatalogClient, NominatimGeocoder, PostgresClient};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration comes first so logging can follow it; LOG_LEVEL/LOG_FORMAT still win
    let settings = Settings::load();
    let (log_level, log_format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(log_format);
    init_tracing(&log_level, &log_format);

    info!("Starting FoodShare Algo service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        io_error("Configuration error", e)
    })?;

    info!("Configuration loaded successfully");

    // Initialize cache manager (Redis is optional, in-process cache always works)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(86_400);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s, Redis)", l1_cache_size, cache_ttl);
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };
    let cache = Arc::new(cache);

    let catalog = Arc::new(
        CatalogClient::from_settings(&settings.catalog)
            .map_err(|e| io_error("Catalog client error", e))?,
    );

    info!("Catalog client initialized");

    let geocoder = Arc::new(
        NominatimGeocoder::from_settings(&settings.geocoding)
            .map_err(|e| io_error("Geocoder error", e))?
            .with_cache(cache),
    );

    info!("Geocoder initialized ({})", settings.geocoding.endpoint);

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            io_error("PostgreSQL connection error", e)
        })?,
    );

    info!(
        "PostgreSQL client initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let estimator = WastageEstimator::new(settings.wastage.clone())
        .map_err(|e| io_error("Invalid wastage rates", e))?;

    let matcher = match settings.matching.max_results_per_category {
        Some(limit) => ProximityMatcher::with_limit(limit),
        None => ProximityMatcher::new(),
    };

    info!(
        "Matcher initialized (default radius: {}km, max radius: {}km, fallback: {})",
        settings.matching.default_radius_km,
        settings.matching.max_radius_km,
        settings.matching.fallback_to_defaults
    );

    let app_state = AppState {
        catalog,
        geocoder,
        postgres,
        estimator,
        matcher,
        matching: settings.matching.clone(),
        default_country: settings.geocoding.default_country.clone(),
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
            .configure(routes::configure_payloads)
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
