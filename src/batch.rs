//! Batch collaborator — a newline-delimited query file in, semicolon CSV
//! out. One soft retry per query, plus a jitter pause between queries to
//! stay under the site's rate limits.

use crate::engine::{DiscoveryResult, PriceEngine};
use crate::region::Region;
use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// CSV header, semicolon-delimited like the downstream spreadsheet expects.
pub const CSV_HEADER: &str = "ts;id;title;RM;VALPO;OHIGGINS;ok;error";

/// Pauses between engine calls. Zeroed out in tests.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Pause before the soft retry of a failed query.
    pub retry_pause_ms: u64,
    /// Fixed part of the inter-query pause.
    pub pause_base_ms: u64,
    /// Random extra added to the inter-query pause.
    pub pause_jitter_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            retry_pause_ms: 1_200,
            pause_base_ms: 800,
            pause_jitter_ms: 900,
        }
    }
}

/// Run every query in `input` and append one CSV row per query to
/// `output`. A failed run gets one soft retry; the second outcome is
/// recorded either way, so the batch always finishes.
pub async fn run(
    engine: &PriceEngine,
    input: &Path,
    output: &Path,
    config: &BatchConfig,
) -> Result<()> {
    let contents = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read query file {}", input.display()))?;
    let queries: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut out = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    writeln!(out, "{CSV_HEADER}")?;

    let total = queries.len();
    for (i, query) in queries.iter().enumerate() {
        info!("({}/{total}) {query}", i + 1);

        let mut result = run_one(engine, query).await;
        if !result.is_success() {
            tokio::time::sleep(Duration::from_millis(config.retry_pause_ms)).await;
            result = run_one(engine, query).await;
        }

        writeln!(out, "{}", csv_line(&result, &Utc::now().to_rfc3339()))?;
        info!(
            "  -> {} | RM={:?} VALPO={:?} OH={:?}",
            if result.is_success() { "OK" } else { "FAIL" },
            result.price_for(Region::Rm),
            result.price_for(Region::Valparaiso),
            result.price_for(Region::OHiggins),
        );

        if i + 1 < total {
            let jitter = rand::thread_rng().gen_range(0..=config.pause_jitter_ms);
            tokio::time::sleep(Duration::from_millis(config.pause_base_ms + jitter)).await;
        }
    }

    info!("batch done: {}", output.display());
    Ok(())
}

async fn run_one(engine: &PriceEngine, query: &str) -> DiscoveryResult {
    match engine.discover(query).await {
        Ok(result) => result,
        Err(e) => DiscoveryResult::failed(query, e.to_string()),
    }
}

/// One CSV row, every field double-quoted with embedded quotes doubled.
pub fn csv_line(result: &DiscoveryResult, ts: &str) -> String {
    let price = |region| {
        result
            .price_for(region)
            .map(format_price)
            .unwrap_or_default()
    };
    let fields = [
        ts.to_string(),
        result.id.clone(),
        result.nombre.clone(),
        price(Region::Rm),
        price(Region::Valparaiso),
        price(Region::OHiggins),
        if result.is_success() { "1" } else { "0" }.to_string(),
        result.error.clone().unwrap_or_default(),
    ];
    fields
        .iter()
        .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(";")
}

/// Catalog prices are whole pesos; keep them integral in the CSV when
/// they are.
fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        price.to_string()
    }
}
