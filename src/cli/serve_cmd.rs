//! `ferreprecio serve` — run the HTTP boundary.

use crate::browser::chromium::ChromiumBrowser;
use crate::engine::PriceEngine;
use crate::rest;
use anyhow::Result;
use std::sync::Arc;

/// Start the server. Chromium is resolved lazily per request, so the
/// server (and its `/health` endpoint) comes up even on a box without a
/// browser installed.
pub async fn run(port: Option<u16>) -> Result<()> {
    let port = port
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.trim().parse().ok()))
        .unwrap_or(rest::DEFAULT_PORT);

    let engine = Arc::new(PriceEngine::new(Arc::new(ChromiumBrowser::new())));
    rest::serve(port, engine).await
}
