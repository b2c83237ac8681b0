// src/browser.rs
//
// Thin ownership layer over headless_chrome. One browser, one tab, acquired
// for the whole run and released by drop on every exit path. Everything the
// scraper does to the page goes through `eval_json`: element references are
// worthless across postbacks, so we never hold any.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use tracing::debug;

use crate::config::options::ScrapeOptions;
use crate::error::{Result, ScrapeError};

pub struct Session {
    // Held so the browser process outlives the tab; closed on drop.
    _browser: Browser,
    tab: Arc<Tab>,
    grace: Duration,
}

impl Session {
    pub fn launch(opts: &ScrapeOptions) -> Result<Self> {
        let launch = LaunchOptions::default_builder()
            .headless(opts.headless)
            .build()
            .map_err(|e| ScrapeError::Fatal(format!("launch options: {e}")))?;
        let browser =
            Browser::new(launch).map_err(|e| ScrapeError::Fatal(format!("launch browser: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::Fatal(format!("open tab: {e}")))?;
        tab.set_default_timeout(opts.settle_timeout);

        Ok(Self { _browser: browser, tab, grace: opts.grace })
    }

    /// Navigate to the landing page and wait until the tree widget's root
    /// container is present. The traversal must not start before that.
    pub fn open(&self, url: &str, tree_marker: &str) -> Result<()> {
        debug!(url, "navigating");
        self.tab
            .navigate_to(url)
            .map_err(|e| ScrapeError::Fatal(format!("navigate: {e}")))?;
        let _ = self.tab.wait_until_navigated();

        self.tab
            .wait_for_element(&format!("div[id*='{tree_marker}']"))
            .map_err(|e| ScrapeError::Fatal(format!("tree widget not found: {e}")))?;
        Ok(())
    }

    /// Run a JS statement body (must `return` a JSON-serialisable value) and
    /// parse the result. The body is wrapped in an IIFE and stringified on
    /// the page side so object results survive the protocol unchanged.
    ///
    /// Protocol hiccups (evaluate timing out against a slow postback, a
    /// garbled result) are `EvalFailed`: node-local, retried by the action
    /// primitives. `Fatal` stays reserved for losing the tab itself.
    pub fn eval_json(&self, body: &str) -> Result<Value> {
        let wrapped = format!("JSON.stringify((() => {{ {body} }})())");
        let obj = self
            .tab
            .evaluate(&wrapped, false)
            .map_err(|e| ScrapeError::EvalFailed(format!("evaluate: {e}")))?;
        match obj.value {
            Some(Value::String(s)) => serde_json::from_str(&s)
                .map_err(|e| ScrapeError::EvalFailed(format!("unparseable result: {e}"))),
            // JSON.stringify(undefined) comes back with no value at all
            _ => Ok(Value::Null),
        }
    }

    /// Wait for the postback triggered by the last interaction to settle.
    /// Not every postback produces an observable navigation, so a timed-out
    /// wait falls back to a fixed grace pause instead of failing.
    pub fn settle(&self) {
        if self.tab.wait_until_navigated().is_err() {
            debug!("no navigation signal, grace pause");
            thread::sleep(self.grace);
        }
    }

    pub fn pause(&self, d: Duration) {
        thread::sleep(d);
    }
}
