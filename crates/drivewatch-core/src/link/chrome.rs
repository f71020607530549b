//! Headless Chromium page fetcher (DevTools protocol via `headless_chrome`).
//!
//! A fresh browser process is launched for every call and owned by a local
//! `Browser` value, so it is shut down when the call returns, whichever way.

use super::fetcher::{FetchError, PageFetcher};
use crate::config::BrowserConfig;
use headless_chrome::util::{Timeout, Wait};
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::time::{Duration, Instant};

/// Browser processes with no DevTools traffic for this long are torn down by the library.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Default)]
pub struct ChromePageFetcher {
    browser: BrowserConfig,
}

impl ChromePageFetcher {
    pub fn new(browser: BrowserConfig) -> Self {
        Self { browser }
    }

    fn launch(&self) -> Result<Browser, FetchError> {
        let args: Vec<&OsStr> = self.browser.args.iter().map(OsStr::new).collect();
        let options = LaunchOptions::default_builder()
            .headless(self.browser.headless)
            .sandbox(self.browser.sandbox)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(args)
            .build()
            .map_err(|e| FetchError::Browser(format!("launch options: {}", e)))?;
        Browser::new(options).map_err(|e| FetchError::Browser(format!("launch: {:#}", e)))
    }
}

/// CSS selector for an anchor whose href contains `pattern`.
pub(crate) fn anchor_selector(pattern: &str) -> String {
    let escaped = pattern.replace('\\', "\\\\").replace('"', "\\\"");
    format!("a[href*=\"{}\"]", escaped)
}

fn map_browser_error(err: anyhow::Error, waited: Duration) -> FetchError {
    if err.downcast_ref::<Timeout>().is_some() {
        FetchError::Timeout { waited }
    } else {
        FetchError::Browser(format!("{:#}", err))
    }
}

impl PageFetcher for ChromePageFetcher {
    fn find_link_href(
        &self,
        page_url: &str,
        href_pattern: &str,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        let browser = self.launch()?;
        let tab = browser
            .new_tab()
            .map_err(|e| FetchError::Browser(format!("new tab: {:#}", e)))?;

        let started = Instant::now();
        tab.navigate_to(page_url)
            .map_err(|e| FetchError::Browser(format!("navigate: {:#}", e)))?;
        tracing::debug!(url = page_url, "page navigation started");

        let selector = anchor_selector(href_pattern);
        let element = tab
            .wait_for_element_with_custom_timeout(&selector, timeout)
            .map_err(|e| map_browser_error(e, timeout))?;

        // Clickable means laid out with a non-empty box; share the same deadline.
        let remaining = timeout.saturating_sub(started.elapsed());
        Wait::with_timeout(remaining)
            .until(|| element.get_midpoint().ok())
            .map_err(|_| FetchError::Timeout { waited: timeout })?;

        element
            .scroll_into_view()
            .map_err(|e| FetchError::Browser(format!("scroll into view: {:#}", e)))?;

        let href = element
            .get_attribute_value("href")
            .map_err(|e| FetchError::Browser(format!("read href: {:#}", e)))?
            .ok_or(FetchError::MissingHref)?;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "link element ready"
        );
        Ok(href)
    }
}
