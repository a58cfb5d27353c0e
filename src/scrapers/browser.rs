use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Fetches pages with a headless Chrome launched per fetch.
///
/// The `Browser` owns the Chrome child process and kills it on drop, so the
/// process is torn down on every return path of [`PageFetcher::fetch`],
/// including errors.
#[derive(Debug, Default)]
pub struct BrowserFetcher;

impl BrowserFetcher {
    pub fn new() -> Self {
        Self
    }

    fn launch() -> Result<Browser> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        Browser::new(options).context("Failed to launch Chrome browser")
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, settle_delay: Duration) -> Result<String> {
        let browser = Self::launch()?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        info!("Opening {}", url);
        tab.navigate_to(url)
            .with_context(|| format!("Failed to navigate to {}", url))?;
        tab.wait_until_navigated()
            .context("Page did not finish navigating")?;

        // Let client-side rendering fill in the listings
        debug!("Waiting {:?} for page to settle", settle_delay);
        thread::sleep(settle_delay);

        let html = tab.get_content().context("Failed to read page HTML")?;
        info!("Captured {} bytes of HTML", html.len());

        let _ = tab.close(true);
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "headless-chrome"
    }
}
