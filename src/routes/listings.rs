use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::Validate;
use crate::core::{nearby, FilterPipeline};
use crate::models::{
    CountRequest, CountResponse, HealthResponse, NearbyRequest, NearbyResponse, RefreshResponse,
    SearchRequest, SearchResponse,
};
use crate::routes::error::ApiError;
use crate::services::{ListingCache, ListingsClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ListingsClient>,
    pub cache: ListingCache,
    pub pipeline: FilterPipeline,
    pub default_currency: String,
    pub max_limit: u16,
}

impl AppState {
    fn currency(&self, requested: Option<&str>) -> String {
        requested
            .unwrap_or(&self.default_currency)
            .to_ascii_uppercase()
    }
}

/// Configure all listing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/listings/search", web::post().to(search_listings))
        .route("/listings/count", web::post().to(count_listings))
        .route("/listings/nearby", web::post().to(nearby_listings))
        .route("/listings/refresh", web::post().to(refresh_listings));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let cached_listings = state.cache.peek(&state.client).await.map(|l| l.len());
    let cache = state.cache.stats().await;

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        cached_listings,
        cache,
    })
}

/// Search listings endpoint
///
/// POST /api/v1/listings/search
///
/// Request body:
/// ```json
/// {
///   "criteria": { "listingType": "For Sale", "minPrice": 50000 },
///   "currency": "USD",
///   "limit": 50
/// }
/// ```
async fn search_listings(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let listings = state.cache.get_or_fetch(&state.client).await?;
    let currency = state.currency(req.currency.as_deref());

    let mut matches = state.pipeline.apply_filters(&listings, &req.criteria, &currency);
    let total = matches.len();

    let limit = req.limit.unwrap_or(state.max_limit).min(state.max_limit) as usize;
    matches.truncate(limit);

    tracing::info!(
        "Search returned {} of {} matches (from {} listings, currency {})",
        matches.len(),
        total,
        listings.len(),
        currency
    );

    Ok(HttpResponse::Ok().json(SearchResponse {
        listings: matches,
        total,
    }))
}

/// Count listings endpoint
///
/// POST /api/v1/listings/count
async fn count_listings(
    state: web::Data<AppState>,
    req: web::Json<CountRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let listings = state.cache.get_or_fetch(&state.client).await?;
    let currency = state.currency(req.currency.as_deref());
    let count = state.pipeline.count_matches(&listings, &req.criteria, &currency);

    tracing::debug!("Counted {} matches", count);

    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// Listings around a point, nearest first
///
/// POST /api/v1/listings/nearby
///
/// Request body:
/// ```json
/// { "latitude": 41.03, "longitude": 28.98, "radiusKm": 5 }
/// ```
async fn nearby_listings(
    state: web::Data<AppState>,
    req: web::Json<NearbyRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let listings = state.cache.get_or_fetch(&state.client).await?;
    let found = nearby(&listings, req.latitude, req.longitude, req.radius_km);

    tracing::info!(
        "Found {} listings within {}km of ({}, {})",
        found.len(),
        req.radius_km,
        req.latitude,
        req.longitude
    );

    Ok(HttpResponse::Ok().json(NearbyResponse {
        total: found.len(),
        listings: found,
    }))
}

/// Drop the cached snapshot and fetch it again
///
/// POST /api/v1/listings/refresh
async fn refresh_listings(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    state.cache.invalidate();
    let listings = state.cache.get_or_fetch(&state.client).await?;

    tracing::info!("Refreshed listing snapshot: {} listings", listings.len());

    Ok(HttpResponse::Ok().json(RefreshResponse {
        cached_listings: listings.len(),
    }))
}
