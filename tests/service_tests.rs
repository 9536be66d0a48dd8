// Service tests: backend client, snapshot cache and HTTP routes

use actix_web::{http::StatusCode, test, web, App};
use listing_search::core::FilterPipeline;
use listing_search::models::{CountResponse, ErrorResponse, HealthResponse, NearbyResponse, RefreshResponse, SearchResponse};
use listing_search::routes::{configure_routes, handle_json_payload_error, AppState};
use listing_search::services::{ListingCache, ListingsClient, ListingsError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn hotels_body() -> String {
    json!({
        "data": [
            {
                "_id": "1",
                "listingType": {"tr": "Satılık", "en": "For Sale"},
                "price": [{"amount": 200000, "currency": "USD"}, {"amount": 6000000, "currency": "TRY"}],
                "location": {"type": "Point", "coordinates": [29.0050, 41.0430]},
                "featureIds": ["f1", "f2"],
                "roomAsText": "2+1"
            },
            {
                "_id": "2",
                "listingType": {"tr": "Kiralık", "en": "For Rent"},
                "price": [{"amount": 1500, "currency": "USD"}],
                "location": {"type": "Point", "coordinates": [28.9900, 41.0400]},
                "featureIds": ["f1"]
            },
            {
                "_id": "3",
                "listingType": {"tr": "Satılık", "en": "For Sale"},
                "price": [{"amount": 250000, "currency": "USD"}],
                "location": {"type": "Point", "coordinates": [32.8541, 39.9208]}
            },
            {
                "title": "no id",
                "roomCount": "many"
            },
            {
                "_id": "4",
                "listingType": {"tr": "Satılık", "en": "For Sale"},
                "price": [{"amount": 180000, "currency": "USD"}],
                "location": {"type": "Point", "coordinates": [28.9784, 41.0082]}
            }
        ]
    })
    .to_string()
}

fn create_state(base_url: String) -> AppState {
    AppState {
        client: Arc::new(ListingsClient::new(base_url, None, Duration::from_secs(5)).unwrap()),
        cache: ListingCache::new(4, 60),
        pipeline: FilterPipeline::default(),
        default_currency: "USD".to_string(),
        max_limit: 2,
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_client_fetches_with_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/hotels")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(hotels_body())
        .create_async()
        .await;

    let client = ListingsClient::new(server.url(), Some("secret".to_string()), Duration::from_secs(5)).unwrap();
    let listings = client.fetch_listings().await.unwrap();

    // The malformed entry is skipped
    assert_eq!(listings.len(), 4);
    assert_eq!(listings[3].id, "4");
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_loosely_typed_listings_survive_to_results() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/hotels")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"_id": "a", "id": "a", "price": null},
                {"_id": "b", "roomCount": 3.0, "listingType": {"tr": "Satılık", "en": null}}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let app = init_app!(create_state(server.url()));

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/count")
        .set_json(json!({}))
        .to_request();
    let count: CountResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(count.count, 2);

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/count")
        .set_json(json!({"criteria": {"roomCount": 3, "listingType": "Satılık"}}))
        .to_request();
    let count: CountResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(count.count, 2);
}

#[actix_web::test]
async fn test_client_reports_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/hotels")
        .with_status(503)
        .create_async()
        .await;

    let client = ListingsClient::new(server.url(), None, Duration::from_secs(5)).unwrap();
    let err = client.fetch_listings().await.unwrap_err();

    assert!(matches!(err, ListingsError::ApiError(_)), "got {:?}", err);
}

#[actix_web::test]
async fn test_search_filters_and_limits() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/hotels")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(hotels_body())
        .create_async()
        .await;

    let app = init_app!(create_state(server.url()));

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/search")
        .set_json(json!({
            "criteria": {
                "listingType": "For Sale",
                "location": {"coordinates": [28.9850, 41.0370], "radius": 10},
                "minPrice": 100000,
                "maxPrice": 300000
            }
        }))
        .to_request();
    let resp: SearchResponse = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<&str> = resp.listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
    assert_eq!(resp.total, 2);

    // Unfiltered search is capped at max_limit but reports the full total
    let req = test::TestRequest::post()
        .uri("/api/v1/listings/search")
        .set_json(json!({}))
        .to_request();
    let resp: SearchResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.listings.len(), 2);
    assert_eq!(resp.total, 4);
}

#[actix_web::test]
async fn test_count_matches_search_total_and_uses_cache() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/hotels")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(hotels_body())
        .expect(1)
        .create_async()
        .await;

    let app = init_app!(create_state(server.url()));
    let criteria = json!({"listingType": "Satılık", "quickFilterIds": ["f2"]});

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/search")
        .set_json(json!({"criteria": criteria.clone()}))
        .to_request();
    let search: SearchResponse = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/count")
        .set_json(json!({"criteria": criteria}))
        .to_request();
    let count: CountResponse = test::call_and_read_body_json(&app, req).await;

    // Listings 3 and 4 have no featureIds at all and pass the quick filter
    assert_eq!(search.total, 3);
    assert_eq!(count.count, search.total);
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_currency_from_request() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/hotels")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(hotels_body())
        .create_async()
        .await;

    let app = init_app!(create_state(server.url()));

    // Only listing 1 has a TRY price; everything else passes the price stage
    let req = test::TestRequest::post()
        .uri("/api/v1/listings/count")
        .set_json(json!({"criteria": {"maxPrice": 1000}, "currency": "try"}))
        .to_request();
    let count: CountResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(count.count, 3);
}

#[actix_web::test]
async fn test_inverted_price_range_rejected() {
    let app = init_app!(create_state("http://127.0.0.1:9".to_string()));

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/search")
        .set_json(json!({"criteria": {"minPrice": 500, "maxPrice": 100}}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "validation_failed");
    assert_eq!(body.status_code, 400);
}

#[actix_web::test]
async fn test_malformed_json_rejected() {
    let app = init_app!(create_state("http://127.0.0.1:9".to_string()));

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/count")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_json");
}

#[actix_web::test]
async fn test_backend_failure_is_bad_gateway() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/hotels")
        .with_status(500)
        .create_async()
        .await;

    let app = init_app!(create_state(server.url()));

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/count")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn test_nearby_sorted_by_distance() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/hotels")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(hotels_body())
        .create_async()
        .await;

    let app = init_app!(create_state(server.url()));

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/nearby")
        .set_json(json!({"latitude": 41.0370, "longitude": 28.9850, "radiusKm": 10}))
        .to_request();
    let resp: NearbyResponse = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<&str> = resp.listings.iter().map(|n| n.listing.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1", "4"]);
    assert_eq!(resp.total, 3);
    assert!(resp.listings[0].distance_km < resp.listings[1].distance_km);
}

#[actix_web::test]
async fn test_health_and_refresh() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/hotels")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(hotels_body())
        .expect(1)
        .create_async()
        .await;

    let app = init_app!(create_state(server.url()));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let health: HealthResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.cached_listings, None);

    let req = test::TestRequest::post().uri("/api/v1/listings/refresh").to_request();
    let refresh: RefreshResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(refresh.cached_listings, 4);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let health: HealthResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(health.cached_listings, Some(4));
    assert_eq!(health.cache.entries, 1);
    assert_eq!(health.cache.ttl_secs, 60);

    mock.assert_async().await;
}
