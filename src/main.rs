use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use festival_match::config::Settings;
use festival_match::core::Matcher;
use festival_match::models::ScoringWeights;
use festival_match::routes::{self, festivals::AppState, handle_json_payload_error};
use festival_match::services::load_catalog;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match format {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    // Initialize logging, falling back to defaults if configuration is broken
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);
    init_tracing(&logging.level, &log_format);

    info!("Starting Festival Match recommendation service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    // Catalog is loaded once and shared read-only by every worker
    let catalog = load_catalog(&settings.catalog.path).await.map_err(|e| {
        error!("Failed to load catalog from {}: {}", settings.catalog.path, e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;

    if catalog.is_empty() {
        error!("Catalog at {} contains no usable festivals", settings.catalog.path);
    }

    let weights = ScoringWeights::from(&settings.scoring.weights);
    let matcher = Matcher::new(weights, settings.recommendation.tier_thresholds());

    info!("Matcher initialized with weights: {:?}", weights);

    let app_state = AppState {
        catalog: Arc::new(catalog),
        matcher,
        default_limit: settings.recommendation.default_limit,
        max_limit: settings.recommendation.max_limit,
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
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
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
