//! Boundary behavior over a real listener, engine mocked underneath.

mod common;

use common::{fast_config, Fixture, MockBrowser, RegionFixture};
use ferreprecio::browser::Browser;
use ferreprecio::engine::PriceEngine;
use ferreprecio::region::Region;
use ferreprecio::rest::{router, BoundaryState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

async fn spawn_boundary(fixture: Fixture, deadline_ms: u64) -> (String, Arc<MockBrowser>) {
    let browser = Arc::new(MockBrowser::new(fixture));
    let engine = Arc::new(PriceEngine::with_config(
        Arc::clone(&browser) as Arc<dyn Browser>,
        fast_config(),
    ));
    let app = router(Arc::new(BoundaryState::with_deadline(engine, deadline_ms)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), browser)
}

#[tokio::test]
async fn health_works_without_engine() {
    let (base, _browser) = spawn_boundary(Fixture::default(), 5_000).await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({ "ok": true }));
}

#[tokio::test]
async fn missing_query_is_client_error_and_engine_untouched() {
    let (base, browser) = spawn_boundary(Fixture::default(), 5_000).await;

    let resp = reqwest::get(format!("{base}/search")).await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Falta id o q");
    assert_eq!(browser.opened_count(), 0);

    let resp = reqwest::get(format!("{base}/search?q=%20%20")).await.unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(browser.opened_count(), 0);
}

#[tokio::test]
async fn search_returns_flat_price_body() {
    let fixture = Fixture::product("Taladro percutor 1/2")
        .with_region(Region::Rm, RegionFixture::rows(&[("12990", true), ("15990", true)]))
        .with_region(Region::Valparaiso, RegionFixture::Empty)
        .with_region(Region::OHiggins, RegionFixture::Loading);
    let (base, _browser) = spawn_boundary(fixture, 10_000).await;

    let resp = reqwest::get(format!("{base}/search?q=2144208")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], "2144208");
    assert_eq!(body["nombre"], "Taladro percutor 1/2");
    assert_eq!(body["moneda"], "CLP");
    assert_eq!(body["fuente"], "mercadopublico");
    assert_eq!(body["RM"], 12990.0);
    assert!(body["VALPO"].is_null());
    assert!(body["OHIGGINS"].is_null());
}

#[tokio::test]
async fn id_param_wins_over_q() {
    let fixture = Fixture::product("Martillo");
    let (base, _browser) = spawn_boundary(fixture, 10_000).await;

    let resp = reqwest::get(format!("{base}/search?q=ignored&id=42")).await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], "42");
}

#[tokio::test]
async fn scrape_failure_maps_to_server_error() {
    let mut fixture = Fixture::default();
    fixture.no_results = true;
    let (base, _browser) = spawn_boundary(fixture, 10_000).await;

    let resp = reqwest::get(format!("{base}/search?q=zzz")).await.unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Scrape failed");
    assert!(body["details"].as_str().unwrap().contains("no results"));
}

#[tokio::test]
async fn deadline_reports_timeout_and_session_is_still_released() {
    // The search input never appears, so the run outlives the 50ms
    // boundary deadline but finishes (and closes its session) on its own
    // 200ms search-input deadline.
    let mut fixture = Fixture::default();
    fixture.search_missing = true;
    let (base, browser) = spawn_boundary(fixture, 50).await;

    let resp = reqwest::get(format!("{base}/search?q=2144208")).await.unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Timeout");
    assert_ne!(body["error"], "Scrape failed");

    // The spawned run keeps going past the deadline; give it room to hit
    // its own timeout and release the session.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(browser.opened_count(), 1);
    assert_eq!(browser.closed_count(), 1);
}
