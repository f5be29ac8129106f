//! Scripted in-memory browser for engine and boundary tests.
//!
//! The mock answers the exact probe scripts the engine evaluates, driven
//! by a per-test [`Fixture`] describing what the catalog "page" contains.
//! Every evaluated script is logged so tests can assert what was (not)
//! queried, and session open/close counts surface resource handling.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use ferreprecio::browser::{Browser, PageSession};
use ferreprecio::engine::{js, EngineConfig};
use ferreprecio::region::Region;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What one region's supplier table does after being selected.
#[derive(Debug, Clone)]
pub enum RegionFixture {
    /// Rows render: (data-base attribute, visible) pairs.
    Rows(Vec<(Option<String>, bool)>),
    /// The explicit "sin proveedores" marker renders.
    Empty,
    /// Nothing ever renders; the wait machine must time out.
    Loading,
}

impl RegionFixture {
    pub fn rows(bases: &[(&str, bool)]) -> Self {
        RegionFixture::Rows(
            bases
                .iter()
                .map(|(base, visible)| (Some(base.to_string()), *visible))
                .collect(),
        )
    }
}

/// The catalog page a test run sees.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    /// Detail-page title; `None` means no product link ever appears.
    pub title: Option<String>,
    /// Render the explicit no-results marker instead of a product link.
    pub no_results: bool,
    /// The search input never appears.
    pub search_missing: bool,
    /// The region `<select>` never appears on the detail page.
    pub region_select_missing: bool,
    /// Supplier tables keyed by region selector code.
    pub regions: HashMap<String, RegionFixture>,
}

impl Fixture {
    pub fn product(title: &str) -> Self {
        Fixture {
            title: Some(title.to_string()),
            ..Fixture::default()
        }
    }

    pub fn with_region(mut self, region: Region, table: RegionFixture) -> Self {
        self.regions.insert(region.selector_value().to_string(), table);
        self
    }
}

/// Engine deadlines shrunk so mock runs finish in tens of milliseconds.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        catalog_url: "mock://catalog".to_string(),
        page_load_ms: 1_000,
        search_input_ms: 200,
        product_link_ms: 200,
        title_ms: 200,
        region_select_ms: 100,
        table_ms: 120,
        settle_ms: 1,
        poll_ms: 20,
    }
}

pub struct MockBrowser {
    fixture: Fixture,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub script_log: Arc<Mutex<Vec<String>>>,
}

impl MockBrowser {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
            script_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn opened_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// True if any evaluated script touched the given needle.
    pub fn evaluated(&self, needle: &str) -> bool {
        self.script_log
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.contains(needle))
    }
}

#[async_trait]
impl Browser for MockBrowser {
    async fn open_session(&self) -> Result<Box<dyn PageSession>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPage {
            fixture: self.fixture.clone(),
            selected: Mutex::new(None),
            log: Arc::clone(&self.script_log),
            closed: Arc::clone(&self.closed),
        }))
    }
}

pub struct MockPage {
    fixture: Fixture,
    selected: Mutex<Option<String>>,
    log: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl PageSession for MockPage {
    async fn goto(&mut self, _url: &str, _timeout_ms: u64) -> Result<()> {
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        self.log.lock().unwrap().push(script.to_string());

        if script == js::SEARCH_INPUT_READY {
            return Ok(json!(!self.fixture.search_missing));
        }
        // The submit snippet is the only one dispatching an input event.
        if script.contains("new Event(\"input\"") {
            return Ok(json!(!self.fixture.search_missing));
        }
        if script == js::CLICK_PRODUCT_LINK {
            if self.fixture.no_results {
                return Ok(json!({ "clicked": false, "noResults": true }));
            }
            if self.fixture.title.is_some() {
                return Ok(json!({ "clicked": true, "noResults": false }));
            }
            return Ok(json!({ "clicked": false, "noResults": false }));
        }
        if script == js::PRODUCT_TITLE {
            return Ok(json!(self.fixture.title));
        }
        if script == js::REGION_SELECT_READY {
            return Ok(json!(!self.fixture.region_select_missing));
        }
        for region in Region::ALL {
            if script == js::select_region(region.selector_value()) {
                if self.fixture.region_select_missing {
                    return Ok(json!(false));
                }
                *self.selected.lock().unwrap() = Some(region.selector_value().to_string());
                return Ok(json!(true));
            }
        }
        if script == js::REVEAL_SUPPLIERS {
            return Ok(json!(true));
        }
        if script == js::TABLE_STATE {
            return Ok(match self.current_region() {
                Some(RegionFixture::Rows(rows)) => {
                    let visible = rows.iter().filter(|(_, v)| *v).count();
                    json!({ "visible": visible, "empty": false })
                }
                Some(RegionFixture::Empty) => json!({ "visible": 0, "empty": true }),
                Some(RegionFixture::Loading) | None => json!({ "visible": 0, "empty": false }),
            });
        }
        if script == js::SUPPLIER_ROWS {
            let rows = match self.current_region() {
                Some(RegionFixture::Rows(rows)) => rows,
                _ => Vec::new(),
            };
            let snapshots: Vec<Value> = rows
                .iter()
                .map(|(base, visible)| json!({ "base": base, "visible": visible }))
                .collect();
            return Ok(json!(snapshots));
        }

        bail!("mock page got unexpected script: {script}");
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl MockPage {
    fn current_region(&self) -> Option<RegionFixture> {
        let selected = self.selected.lock().unwrap().clone()?;
        self.fixture.regions.get(&selected).cloned()
    }
}
