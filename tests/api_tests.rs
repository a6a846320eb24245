use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use shopbot_api::{
    api::{create_router, AppState},
    config::Config,
    db::MemoryInteractionStore,
    models::Interaction,
    services::{
        scraper::{FetchOutcome, PageFetcher},
        CannedResponder,
    },
};

/// Serves one eBay listing and fails every other marketplace
struct EbayOnlyFetcher;

#[async_trait::async_trait]
impl PageFetcher for EbayOnlyFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        if url.starts_with("https://www.ebay.com") {
            FetchOutcome::Page(
                r#"<ul><li class="s-item">
                     <a class="s-item__link" href="/itm/42"><span class="s-item__title">Steel Kettle</span></a>
                     <img class="s-item__image-img" src="https://i.ebayimg.com/42.jpg">
                     <span class="s-item__price">$21.00</span>
                     <div class="b-starrating">4.7</div>
                   </li></ul>"#
                    .to_string(),
            )
        } else {
            FetchOutcome::failed("HTTP error: 503 Service Unavailable")
        }
    }
}

fn test_config() -> Config {
    Config {
        throttle_min_ms: 0,
        throttle_max_ms: 0,
        ..Config::default()
    }
}

fn create_test_server(store: MemoryInteractionStore) -> TestServer {
    let state = AppState::new(
        &test_config(),
        Arc::new(store),
        Arc::new(EbayOnlyFetcher),
        Arc::new(CannedResponder),
    )
    .unwrap();
    TestServer::new(create_router(state)).unwrap()
}

fn shared_history() -> MemoryInteractionStore {
    MemoryInteractionStore::with_interactions(vec![
        Interaction::new(1, "Steel Kettle", 5.0),
        Interaction::new(2, "Steel Kettle", 4.0),
        Interaction::new(2, "Toaster", 3.0),
    ])
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(MemoryInteractionStore::new());
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_scrape_returns_surviving_sources() {
    let server = create_test_server(MemoryInteractionStore::new());

    let response = server
        .get("/api/scrape")
        .add_query_param("product_name", "steel kettle")
        .await;

    response.assert_status_ok();
    let listings: Vec<serde_json::Value> = response.json();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["name"], "Steel Kettle");
    assert_eq!(listings[0]["link"], "https://www.ebay.com/itm/42");
    assert_eq!(listings[0]["rating"], "4.7");
}

#[tokio::test]
async fn test_scrape_rejects_blank_query() {
    let server = create_test_server(MemoryInteractionStore::new());

    let response = server
        .get("/api/scrape")
        .add_query_param("product_name", "   ")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_based_recommendations() {
    let server = create_test_server(shared_history());

    let response = server.get("/api/recommendations/user_based/1").await;

    response.assert_status_ok();
    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["title"], "Toaster");
    assert_eq!(recs[0]["score"], 0.0);
}

#[tokio::test]
async fn test_item_based_recommendations() {
    let server = create_test_server(shared_history());

    let response = server.get("/api/recommendations/item_based/1").await;

    response.assert_status_ok();
    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs[0]["title"], "Toaster");
}

#[tokio::test]
async fn test_unknown_user_gets_not_found() {
    let server = create_test_server(shared_history());

    let response = server.get("/api/recommendations/user_based/99").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logged_interaction_feeds_recommendations() {
    let server = create_test_server(shared_history());

    let response = server
        .post("/api/interactions")
        .json(&json!({
            "user_id": 3,
            "item_title": "Toaster",
            "rating": 4.5
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server.get("/api/recommendations/user_based/3").await;
    response.assert_status_ok();
    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs[0]["title"], "Steel Kettle");
}

#[tokio::test]
async fn test_chat_search_uses_aggregator() {
    let store = MemoryInteractionStore::new();
    let server = create_test_server(store.clone());

    let response = server
        .post("/api/chat")
        .json(&json!({
            "user_id": 5,
            "message": "search kettle"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["response"], "I found these products for you: Steel Kettle.");
    assert_eq!(store.searches_for(5).await.len(), 1);
}
