//! Chromium-based browser using chromiumoxide.

use super::{Browser, PageSession};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as Chromium, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;

/// Desktop user agent sent with every session. The catalog serves a
/// degraded page to obviously-headless agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. FERREPRECIO_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("FERREPRECIO_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 3. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-backed [`Browser`].
///
/// Holds no live browser process itself: every [`open_session`] call
/// launches a fresh headless Chromium that lives for exactly one discovery
/// run. The full startup cost per run is an accepted trade-off; it keeps
/// runs isolated from each other.
///
/// [`open_session`]: Browser::open_session
#[derive(Debug, Default)]
pub struct ChromiumBrowser;

impl ChromiumBrowser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn open_session(&self) -> Result<Box<dyn PageSession>> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set FERREPRECIO_CHROMIUM_PATH or install google-chrome.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Chromium::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drain CDP events for the lifetime of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to create page")?;
        page.set_user_agent(USER_AGENT)
            .await
            .context("failed to set user agent")?;

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
        }))
    }
}

/// One headless Chromium process plus the single tab a run drives.
pub struct ChromiumSession {
    browser: Chromium,
    page: Page,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn goto(&mut self, url: &str, timeout_ms: u64) -> Result<()> {
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        match result {
            Ok(Ok(_)) => {
                // Best-effort settle; the catalog keeps loading pieces via
                // AJAX long after the navigation event anyway.
                let _ = self.page.wait_for_navigation().await;
                Ok(())
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS evaluation failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        let _ = self.page.close().await;
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }
}
