//! One fetch → parse → diff → notify → save cycle.

use crate::config::{ErrorPolicy, SavePolicy};
use crate::filters::Relevance;
use crate::models::Listing;
use crate::notify::{error_email, listing_email, Notifier};
use crate::scrapers::{sssb, PageFetcher};
use crate::store::SnapshotStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{error, info};

/// Outcome of comparing a fresh scrape with the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    /// Scraped listings not present in the snapshot.
    pub new: BTreeSet<Listing>,
    /// `current ∪ previous`, the next snapshot.
    pub all: BTreeSet<Listing>,
}

pub fn diff(current: &BTreeSet<Listing>, previous: &BTreeSet<Listing>) -> Diff {
    Diff {
        new: current.difference(previous).cloned().collect(),
        all: current.union(previous).cloned().collect(),
    }
}

/// Counts from one successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub scraped: usize,
    pub previous: usize,
    pub new: usize,
    pub relevant: usize,
    pub notified: usize,
    pub snapshot_size: usize,
}

pub struct Watcher<R> {
    pub fetcher: Box<dyn PageFetcher>,
    pub notifier: Box<dyn Notifier>,
    pub store: SnapshotStore,
    pub relevance: R,
    pub save_policy: SavePolicy,
    pub listings_url: String,
    pub settle_delay: Duration,
}

impl<R: Relevance> Watcher<R> {
    pub async fn run_cycle(&self, started_at: DateTime<Utc>) -> Result<CycleReport> {
        info!("Fetching {} with {}", self.listings_url, self.fetcher.name());
        let html = self
            .fetcher
            .fetch(&self.listings_url, self.settle_delay)
            .await
            .context("Failed to fetch listings page")?;

        let current: BTreeSet<Listing> = sssb::parse_listings(&html)
            .context("Failed to parse listings")?
            .into_iter()
            .collect();
        let previous = self.store.load().await;

        let Diff { new, all } = diff(&current, &previous);
        let relevant: Vec<&Listing> = new
            .iter()
            .filter(|listing| self.relevance.is_relevant(listing))
            .collect();
        info!(
            "Found {} listings, {} new, {} new relevant",
            current.len(),
            new.len(),
            relevant.len()
        );

        // Under `Always` every relevant listing must be attempted before the
        // snapshot archives it.
        let mut notified = 0;
        let mut failures = Vec::new();
        for listing in &relevant {
            let (subject, body) = listing_email(listing);
            match self.notifier.send(&subject, &body).await {
                Ok(()) => {
                    info!(" - {} @ {}", listing.apartment_type, listing.adress);
                    notified += 1;
                }
                Err(e) => {
                    error!("Notification failed for {}: {:#}", subject, e);
                    failures.push(e.context(format!("Failed to notify about {}", subject)));
                    if self.save_policy == SavePolicy::AfterNotify {
                        break;
                    }
                }
            }
        }

        let failed = failures.len();
        if let Some(first) = failures.into_iter().next() {
            match self.save_policy {
                SavePolicy::Always => self.store.save(&all).await?,
                SavePolicy::AfterNotify => {
                    info!("Snapshot left unchanged so unsent listings are retried");
                }
            }
            return Err(first.context(format!(
                "{} of {} notifications failed",
                failed,
                relevant.len()
            )));
        }
        self.store.save(&all).await?;

        Ok(CycleReport {
            started_at,
            scraped: current.len(),
            previous: previous.len(),
            new: new.len(),
            relevant: relevant.len(),
            notified,
            snapshot_size: all.len(),
        })
    }
}

/// Applies the error policy to a failed cycle.
///
/// Under [`ErrorPolicy::Email`] the error is mailed and swallowed; only a
/// failure to send that mail is returned.
pub async fn report_failure(
    policy: ErrorPolicy,
    notifier: &dyn Notifier,
    err: anyhow::Error,
    started_at: DateTime<Utc>,
) -> Result<()> {
    match policy {
        ErrorPolicy::Propagate => Err(err),
        ErrorPolicy::Email => {
            error!("Cycle failed: {:#}", err);
            let (subject, body) = error_email(&err, started_at);
            notifier
                .send(&subject, &body)
                .await
                .map_err(|mail_err| mail_err.context(format!("Also failed to report: {:#}", err)))
        }
    }
}
