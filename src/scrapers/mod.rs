pub mod browser;
pub mod http;
pub mod sssb;
pub mod traits;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use traits::PageFetcher;

use crate::config::FetchMode;
use anyhow::Result;

/// Builds the fetcher selected by configuration.
pub fn fetcher_for(mode: FetchMode) -> Result<Box<dyn PageFetcher>> {
    Ok(match mode {
        FetchMode::Browser => Box::new(BrowserFetcher::new()),
        FetchMode::Http => Box::new(HttpFetcher::new()?),
    })
}
