//! Integration tests for `ListingApiClient` using wiremock HTTP mocks.

use rentscout_core::{GeoPoint, PriceFilter};
use rentscout_search::{ListingApiClient, ListingLookup, ListingRequest, LookupError};
use rust_decimal::Decimal;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ListingApiClient {
    ListingApiClient::new(base_url, None, 30, "rentscout-test/0.1")
        .expect("client construction should not fail")
        .with_retry_policy(1, 0)
}

fn request(price: PriceFilter) -> ListingRequest {
    ListingRequest {
        center: GeoPoint::new(35.001, 139.002),
        radius_meters: 320.0,
        price,
    }
}

#[tokio::test]
async fn find_listings_returns_parsed_listings() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "listings": [
            { "id": "l1", "title": "Sunny 1LDK", "lat": 35.0012, "lng": 139.0021,
              "price": "1850.00", "bedrooms": 1, "url": "https://rent.example.com/l1" },
            { "id": "l2", "lat": 35.0009, "lng": 139.0018, "price": 2100 }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("lat", "35.001"))
        .and(query_param("lng", "139.002"))
        .and(query_param("radius", "320"))
        .and(query_param("price_min", "1500"))
        .and(query_param("price_max", "2500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let listings = client
        .find_listings(request(PriceFilter {
            min: Some(Decimal::new(1500, 0)),
            max: Some(Decimal::new(2500, 0)),
        }))
        .await
        .expect("should parse listings");

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].title, "Sunny 1LDK");
    assert_eq!(listings[0].price, Decimal::new(185_000, 2));
    assert_eq!(listings[0].bedrooms, Some(1));
    assert_eq!(listings[1].title, "l2");
    assert_eq!(listings[1].price, Decimal::new(2100, 0));
}

#[tokio::test]
async fn empty_body_means_no_listings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let listings = client.find_listings(request(PriceFilter::default())).await.unwrap();
    assert!(listings.is_empty());
}

#[tokio::test]
async fn server_error_is_retried_once_then_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .find_listings(request(PriceFilter::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Http(_)));
}
