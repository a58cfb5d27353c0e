mod config;
mod error;
mod filters;
mod models;
mod notify;
mod scrapers;
mod store;
mod watcher;

use chrono::Utc;
use config::Config;
use notify::SmtpNotifier;
use store::SnapshotStore;
use tracing::info;
use tracing_subscriber::EnvFilter;
use watcher::{report_failure, Watcher};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 SSSB Watch");

    // Without config and an SMTP client there is nobody to report to,
    // so these two errors always propagate.
    let config = Config::from_env()?;
    let notifier = SmtpNotifier::new(&config.mail)?;
    let started_at = Utc::now();

    let fetcher = match scrapers::fetcher_for(config.fetch_mode) {
        Ok(fetcher) => fetcher,
        Err(e) => return report_failure(config.error_policy, &notifier, e, started_at).await,
    };

    let watcher = Watcher {
        fetcher,
        notifier: Box::new(notifier),
        store: SnapshotStore::new(config.snapshot_path.clone()),
        relevance: config.relevance,
        save_policy: config.save_policy,
        listings_url: config.listings_url.clone(),
        settle_delay: config.settle_delay,
    };
    info!("Snapshot file: {}", watcher.store.path().display());

    match watcher.run_cycle(started_at).await {
        Ok(report) => {
            info!(
                "✅ Done: {} scraped, {} previously known, {} new, {}/{} relevant notified, {} in snapshot",
                report.scraped,
                report.previous,
                report.new,
                report.notified,
                report.relevant,
                report.snapshot_size
            );
            Ok(())
        }
        Err(e) => report_failure(config.error_policy, watcher.notifier.as_ref(), e, started_at).await,
    }
}
