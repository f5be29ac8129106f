//! Browser abstraction for driving the catalog UI.
//!
//! Defines the `Browser` and `PageSession` traits that abstract over the
//! browser engine (currently Chromium via chromiumoxide). Tests substitute
//! a scripted in-memory page.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// A browser engine that can open page sessions.
///
/// Each call launches an isolated session: one browser process, one tab,
/// owned by exactly one discovery run and released at the end of it.
/// Sessions are never shared or pooled.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a fresh session on a blank page.
    async fn open_session(&self) -> Result<Box<dyn PageSession>>;
}

/// A single browser page used for one discovery run.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate the page to a URL with a timeout.
    async fn goto(&mut self, url: &str, timeout_ms: u64) -> Result<()>;

    /// Execute JavaScript in the page context and return the result.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Close the page and release the underlying browser.
    async fn close(self: Box<Self>) -> Result<()>;
}
