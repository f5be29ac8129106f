//! Navigation controller — from the catalog root to a single product
//! detail page.

use crate::browser::PageSession;
use crate::engine::wait;
use crate::engine::{js, DiscoveryError, EngineConfig};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Resolve `query` to a product detail page and return its title.
///
/// Load the catalog root, wait for the search box, submit the query, then
/// keep trying the product-link candidates until one is clickable. The
/// result list renders asynchronously, so three outcomes are possible on
/// every iteration: a link appeared (proceed), the explicit no-results
/// marker appeared (`NoResults`), or neither yet. Loop expiry without
/// either is a `NavigationTimeout`.
pub async fn resolve_product(
    page: &mut dyn PageSession,
    query: &str,
    config: &EngineConfig,
) -> Result<String, DiscoveryError> {
    let interval = Duration::from_millis(config.poll_ms);

    page.goto(&config.catalog_url, config.page_load_ms)
        .await
        .map_err(DiscoveryError::Browser)?;

    let ready = wait::poll_until(
        page,
        js::SEARCH_INPUT_READY,
        Duration::from_millis(config.search_input_ms),
        interval,
    )
    .await
    .map_err(DiscoveryError::Browser)?;
    if !ready {
        return Err(DiscoveryError::NavigationTimeout("search input"));
    }

    let submitted = page
        .evaluate(&js::submit_search(query))
        .await
        .map_err(DiscoveryError::Browser)?;
    if !submitted.as_bool().unwrap_or(false) {
        // The input was there a poll ago; losing it now is a page problem.
        return Err(DiscoveryError::NavigationTimeout("search input"));
    }

    click_first_product(page, config).await?;

    read_title(page, config).await
}

async fn click_first_product(
    page: &dyn PageSession,
    config: &EngineConfig,
) -> Result<(), DiscoveryError> {
    let start = Instant::now();
    loop {
        // Clicking may tear down the document mid-evaluation; inside the
        // deadline that counts as "not yet", not as a failure.
        match page.evaluate(js::CLICK_PRODUCT_LINK).await {
            Ok(outcome) => {
                if flag(&outcome, "clicked") {
                    return Ok(());
                }
                if flag(&outcome, "noResults") {
                    return Err(DiscoveryError::NoResults);
                }
            }
            Err(e) => debug!(error = %e, "product link probe failed, retrying"),
        }
        if start.elapsed() >= Duration::from_millis(config.product_link_ms) {
            return Err(DiscoveryError::NavigationTimeout("product link"));
        }
        tokio::time::sleep(Duration::from_millis(config.poll_ms)).await;
    }
}

async fn read_title(
    page: &dyn PageSession,
    config: &EngineConfig,
) -> Result<String, DiscoveryError> {
    let start = Instant::now();
    loop {
        match page.evaluate(js::PRODUCT_TITLE).await {
            Ok(value) => {
                if let Some(title) = value.as_str() {
                    let title = title.trim();
                    if !title.is_empty() {
                        return Ok(title.to_string());
                    }
                }
            }
            Err(e) => debug!(error = %e, "title probe failed, retrying"),
        }
        if start.elapsed() >= Duration::from_millis(config.title_ms) {
            return Err(DiscoveryError::NavigationTimeout("product title"));
        }
        tokio::time::sleep(Duration::from_millis(config.poll_ms)).await;
    }
}

fn flag(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}
