//! Region price probe — select a region, wait for the supplier table,
//! extract the minimum valid price.

use crate::browser::PageSession;
use crate::engine::wait::{self, TableState};
use crate::engine::{js, EngineConfig};
use crate::region::Region;
use anyhow::{bail, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// One supplier row as observed on the page: the raw `data-base` price
/// attribute (if the price cell exists at all) and whether the row is
/// currently visible.
#[derive(Debug, Clone, Deserialize)]
pub struct RowSnapshot {
    pub base: Option<String>,
    pub visible: bool,
}

/// Probe one region's minimum price on the current product detail page.
///
/// Returns `None` both when the region legitimately has no suppliers and
/// when anything goes wrong along the way (selector missing, evaluation
/// error, table never settling). The two cases are indistinguishable on
/// this site, so they fold into the same observation; the run continues
/// with the remaining regions either way.
pub async fn probe_region(
    page: &dyn PageSession,
    region: Region,
    config: &EngineConfig,
) -> Option<f64> {
    match try_probe(page, region, config).await {
        Ok(price) => price,
        Err(e) => {
            warn!(region = region.key(), error = %e, "region probe failed");
            None
        }
    }
}

async fn try_probe(
    page: &dyn PageSession,
    region: Region,
    config: &EngineConfig,
) -> Result<Option<f64>> {
    let interval = Duration::from_millis(config.poll_ms);

    let ready = wait::poll_until(
        page,
        js::REGION_SELECT_READY,
        Duration::from_millis(config.region_select_ms),
        interval,
    )
    .await?;
    if !ready {
        bail!("region selector never appeared");
    }

    let selected = page.evaluate(&js::select_region(region.selector_value())).await?;
    if !selected.as_bool().unwrap_or(false) {
        bail!("could not select region {}", region.key());
    }

    // Give the change handler a moment to fire the reload request.
    tokio::time::sleep(Duration::from_millis(config.settle_ms)).await;

    // Optional UI affordances; their absence must not fail the probe.
    match page.evaluate(js::REVEAL_SUPPLIERS).await {
        Ok(acted) => debug!(region = region.key(), ?acted, "reveal suppliers"),
        Err(e) => debug!(region = region.key(), error = %e, "reveal suppliers skipped"),
    }

    let state = wait_for_table(page, config).await?;
    match state {
        TableState::Rows => {
            let rows: Vec<RowSnapshot> =
                serde_json::from_value(page.evaluate(js::SUPPLIER_ROWS).await?)?;
            Ok(min_valid_price(&rows))
        }
        TableState::Empty | TableState::Timeout => {
            debug!(region = region.key(), ?state, "no supplier rows");
            Ok(None)
        }
    }
}

async fn wait_for_table(page: &dyn PageSession, config: &EngineConfig) -> Result<TableState> {
    wait::wait_for_suppliers(
        page,
        Duration::from_millis(config.table_ms),
        Duration::from_millis(config.poll_ms),
    )
    .await
}

/// The smallest strictly-positive price among visible rows, or `None`
/// when no row qualifies. Rows without a parseable positive `data-base`
/// and rows hidden by the current filter are excluded.
pub fn min_valid_price(rows: &[RowSnapshot]) -> Option<f64> {
    rows.iter()
        .filter(|row| row.visible)
        .filter_map(|row| row.base.as_deref())
        .filter_map(|base| base.trim().parse::<f64>().ok())
        .filter(|price| price.is_finite() && *price > 0.0)
        .fold(None, |min, price| match min {
            Some(current) if current <= price => Some(current),
            _ => Some(price),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(base: Option<&str>, visible: bool) -> RowSnapshot {
        RowSnapshot {
            base: base.map(String::from),
            visible,
        }
    }

    #[test]
    fn min_skips_zero_negative_and_hidden() {
        let rows = vec![
            row(Some("1500"), true),
            row(Some("0"), true),
            row(Some("3200"), true),
            row(Some("-5"), true),
            row(Some("2100"), false),
        ];
        assert_eq!(min_valid_price(&rows), Some(1500.0));
    }

    #[test]
    fn min_of_nothing_is_none() {
        assert_eq!(min_valid_price(&[]), None);
        let rows = vec![row(Some("0"), true), row(None, true), row(Some("99"), false)];
        assert_eq!(min_valid_price(&rows), None);
    }

    #[test]
    fn min_ignores_unparseable_bases() {
        let rows = vec![
            row(Some("abc"), true),
            row(Some(" 2990 "), true),
            row(Some("NaN"), true),
        ];
        assert_eq!(min_valid_price(&rows), Some(2990.0));
    }
}
