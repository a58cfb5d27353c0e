use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Downloads the rendered markup of a listing page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Load `url`, wait `settle_delay` for client-side rendering, return the HTML.
    async fn fetch(&self, url: &str, settle_delay: Duration) -> Result<String>;

    /// Get the name of the fetcher, for logs
    fn name(&self) -> &'static str;
}
