//! `ferreprecio batch <input>` — process a query file into CSV.

use crate::batch::{self, BatchConfig};
use crate::browser::chromium::ChromiumBrowser;
use crate::engine::PriceEngine;
use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let output = output
        .unwrap_or_else(|| PathBuf::from(format!("prices_{}.csv", Utc::now().format("%Y-%m-%d"))));

    let engine = PriceEngine::new(Arc::new(ChromiumBrowser::new()));
    batch::run(&engine, &input, &output, &BatchConfig::default()).await?;

    println!("Listo: {}", output.display());
    Ok(())
}
