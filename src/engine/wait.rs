//! Supplier-table wait state machine.
//!
//! The catalog gives no DOM event or spinner that reliably signals the
//! AJAX reload has finished, so the only option is to poll. Dual exit
//! conditions (rows present vs. an explicit "no suppliers" marker) avoid
//! both premature empty reads and indefinite blocking; a deadline bounds
//! the worst case. Observation only — nothing here mutates the page.

use crate::browser::PageSession;
use crate::engine::js;
use anyhow::Result;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Terminal states of the wait machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// At least one visible supplier row is present.
    Rows,
    /// The page explicitly says there are no suppliers.
    Empty,
    /// Neither condition was met before the deadline.
    Timeout,
}

#[derive(Debug, Deserialize)]
struct TableProbe {
    visible: u32,
    empty: bool,
}

/// Poll the supplier table until it settles or `deadline` elapses.
pub async fn wait_for_suppliers(
    page: &dyn PageSession,
    deadline: Duration,
    interval: Duration,
) -> Result<TableState> {
    let start = Instant::now();
    loop {
        let probe: TableProbe = serde_json::from_value(page.evaluate(js::TABLE_STATE).await?)?;
        if probe.visible > 0 {
            return Ok(TableState::Rows);
        }
        if probe.empty {
            return Ok(TableState::Empty);
        }
        if start.elapsed() >= deadline {
            return Ok(TableState::Timeout);
        }
        tokio::time::sleep(interval).await;
    }
}

/// Poll a boolean probe script until it returns true or `deadline`
/// elapses. Evaluates at least once, so a zero deadline still observes
/// the current page state.
pub async fn poll_until(
    page: &dyn PageSession,
    script: &str,
    deadline: Duration,
    interval: Duration,
) -> Result<bool> {
    let start = Instant::now();
    loop {
        if page.evaluate(script).await?.as_bool().unwrap_or(false) {
            return Ok(true);
        }
        if start.elapsed() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(interval).await;
    }
}
