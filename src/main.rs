use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use listing_search::config::{LogFormat, Settings};
use listing_search::core::FilterPipeline;
use listing_search::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use listing_search::services::{ListingCache, ListingsClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT")
        .map(|format| LogFormat::parse(&format))
        .unwrap_or_else(|_| settings.logging.log_format());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Compact => subscriber.compact().init(),
    }

    info!("Starting listing search service...");

    // Initialize backend client
    let client = match ListingsClient::from_settings(&settings.backend) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create backend client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    info!("Backend client initialized for {}", client.listings_url());

    let cache = ListingCache::new(settings.cache.capacity, settings.cache.ttl_secs);

    info!(
        "Listing cache initialized (capacity: {}, TTL: {}s)",
        settings.cache.capacity, settings.cache.ttl_secs
    );

    // Warm the snapshot; the service still starts if the backend is down
    match cache.get_or_fetch(&client).await {
        Ok(listings) => info!("Loaded {} listings", listings.len()),
        Err(e) => error!("Initial listing fetch failed, will retry on first request: {}", e),
    }

    let pipeline = FilterPipeline::with_new_listing_days(settings.filters.new_listing_days);

    info!(
        "Filter pipeline initialized (new listing window: {} days)",
        pipeline.new_listing_window().num_days()
    );

    // Build application state
    let app_state = AppState {
        client,
        cache,
        pipeline,
        default_currency: settings.filters.default_currency.to_ascii_uppercase(),
        max_limit: settings.filters.max_limit,
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
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
