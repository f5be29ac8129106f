//! `ferreprecio search <query>` — one discovery run, printed.

use crate::browser::chromium::ChromiumBrowser;
use crate::engine::PriceEngine;
use crate::region::Region;
use anyhow::Result;
use std::sync::Arc;

pub async fn run(query: &str, json: bool) -> Result<()> {
    let engine = PriceEngine::new(Arc::new(ChromiumBrowser::new()));
    let result = engine.discover(query).await?;

    if json {
        println!("{}", result.to_json());
        return Ok(());
    }

    println!("{} — {}", result.id, result.nombre);
    for region in Region::ALL {
        match result.price_for(region) {
            Some(price) => println!("  {:<9} {} {}", region.key(), price, result.moneda),
            None => println!("  {:<9} sin precio", region.key()),
        }
    }
    Ok(())
}
