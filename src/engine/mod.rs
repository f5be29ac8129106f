//! Price discovery engine.
//!
//! One run: open a fresh browser session, resolve the query to a product
//! detail page, probe every registered region for its minimum supplier
//! price, release the session. Region probes never abort the run; only
//! navigation failures do.

pub mod js;
pub mod navigate;
pub mod probe;
pub mod wait;

use crate::browser::{Browser, PageSession};
use crate::region::Region;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Currency every catalog price is quoted in.
pub const CURRENCY: &str = "CLP";

/// Source identifier stamped on every result.
pub const SOURCE: &str = "mercadopublico";

/// Default catalog root (the hardware framework agreement storefront).
pub const DEFAULT_CATALOG_URL: &str =
    "https://conveniomarco2.mercadopublico.cl/ferreteria2/productos-de-ferreteria";

/// Run-level failures. Region-level trouble never surfaces here — it is
/// absorbed into a `None` observation by the probe.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The query was empty or whitespace; no browser work was started.
    #[error("query is empty")]
    EmptyQuery,
    /// The search yielded no navigable product.
    #[error("no results for the search query")]
    NoResults,
    /// A required page element never appeared within its deadline.
    #[error("timed out waiting for {0}")]
    NavigationTimeout(&'static str),
    /// Browser-level failure (launch, navigation, evaluation).
    #[error("browser failure: {0}")]
    Browser(anyhow::Error),
}

/// All deadlines and intervals, in milliseconds. Defaults mirror what the
/// live site needs; tests shrink them to keep mock runs fast.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub catalog_url: String,
    pub page_load_ms: u64,
    pub search_input_ms: u64,
    pub product_link_ms: u64,
    pub title_ms: u64,
    pub region_select_ms: u64,
    pub table_ms: u64,
    pub settle_ms: u64,
    pub poll_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            page_load_ms: 60_000,
            search_input_ms: 20_000,
            product_link_ms: 30_000,
            title_ms: 30_000,
            region_select_ms: 15_000,
            table_ms: 9_000,
            settle_ms: 350,
            poll_ms: 250,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `FERREPRECIO_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            catalog_url: std::env::var("FERREPRECIO_CATALOG_URL")
                .unwrap_or(defaults.catalog_url),
            page_load_ms: env_ms("FERREPRECIO_PAGE_LOAD_MS", defaults.page_load_ms),
            search_input_ms: env_ms("FERREPRECIO_SEARCH_INPUT_MS", defaults.search_input_ms),
            product_link_ms: env_ms("FERREPRECIO_PRODUCT_LINK_MS", defaults.product_link_ms),
            title_ms: env_ms("FERREPRECIO_TITLE_MS", defaults.title_ms),
            region_select_ms: env_ms("FERREPRECIO_REGION_SELECT_MS", defaults.region_select_ms),
            table_ms: env_ms("FERREPRECIO_TABLE_MS", defaults.table_ms),
            settle_ms: env_ms("FERREPRECIO_SETTLE_MS", defaults.settle_ms),
            poll_ms: env_ms("FERREPRECIO_POLL_MS", defaults.poll_ms),
        }
    }
}

fn env_ms(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// A region paired with its observed minimum price. `None` means "no
/// price available" — genuinely supplier-less and failed-to-load regions
/// both map here (see `probe_region`).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PriceObservation {
    pub region: Region,
    pub price: Option<f64>,
}

/// The complete output of one discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    pub id: String,
    pub nombre: String,
    pub moneda: &'static str,
    pub fuente: &'static str,
    pub observations: Vec<PriceObservation>,
    pub error: Option<String>,
}

impl DiscoveryResult {
    /// A successful run: product resolved, one observation per region.
    pub fn resolved(id: &str, nombre: String, observations: Vec<PriceObservation>) -> Self {
        Self {
            id: id.to_string(),
            nombre,
            moneda: CURRENCY,
            fuente: SOURCE,
            observations,
            error: None,
        }
    }

    /// A failed run: no product context, no region data.
    pub fn failed(id: &str, error: String) -> Self {
        Self {
            id: id.to_string(),
            nombre: String::new(),
            moneda: CURRENCY,
            fuente: SOURCE,
            observations: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The observed price for a region, flattened (`None` covers both
    /// "not probed" and "no price available").
    pub fn price_for(&self, region: Region) -> Option<f64> {
        self.observations
            .iter()
            .find(|o| o.region == region)
            .and_then(|o| o.price)
    }

    /// The flat wire shape consumed by the HTTP boundary and dashboard:
    /// `{ id, nombre, moneda, fuente, RM, VALPO, OHIGGINS }` on success,
    /// `{ id, error }` on failure.
    pub fn to_json(&self) -> Value {
        if let Some(error) = &self.error {
            return json!({ "id": self.id, "error": error });
        }
        let mut body = serde_json::Map::new();
        body.insert("id".into(), json!(self.id));
        body.insert("nombre".into(), json!(self.nombre));
        body.insert("moneda".into(), json!(self.moneda));
        body.insert("fuente".into(), json!(self.fuente));
        for region in Region::ALL {
            body.insert(region.key().into(), json!(self.price_for(region)));
        }
        Value::Object(body)
    }
}

/// The orchestrator. Owns the browser dependency; stateless across runs.
pub struct PriceEngine {
    browser: Arc<dyn Browser>,
    config: EngineConfig,
}

impl PriceEngine {
    pub fn new(browser: Arc<dyn Browser>) -> Self {
        Self::with_config(browser, EngineConfig::from_env())
    }

    pub fn with_config(browser: Arc<dyn Browser>, config: EngineConfig) -> Self {
        Self { browser, config }
    }

    /// Run one full price discovery for `query`.
    ///
    /// The session is released on every exit path; a probe can only
    /// produce an observation, never an early return past the close.
    pub async fn discover(&self, query: &str) -> Result<DiscoveryResult, DiscoveryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DiscoveryError::EmptyQuery);
        }

        let mut page = self
            .browser
            .open_session()
            .await
            .map_err(DiscoveryError::Browser)?;

        let outcome = self.run(page.as_mut(), query).await;

        if let Err(e) = page.close().await {
            warn!(error = %e, "browser session close failed");
        }

        outcome
    }

    async fn run(
        &self,
        page: &mut dyn PageSession,
        query: &str,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let title = navigate::resolve_product(page, query, &self.config).await?;
        info!(query, title = %title, "product resolved");

        let mut observations = Vec::with_capacity(Region::ALL.len());
        for region in Region::ALL {
            let price = probe::probe_region(&*page, region, &self.config).await;
            debug!(region = region.key(), ?price, "region probed");
            observations.push(PriceObservation { region, price });
        }

        Ok(DiscoveryResult::resolved(query, title, observations))
    }
}
