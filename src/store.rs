//! The snapshot: every listing ever seen, as a pretty-printed JSON array.

use crate::error::SnapshotError;
use crate::models::Listing;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot, reporting why it could not be used.
    pub async fn try_load(&self) -> Result<BTreeSet<Listing>, SnapshotError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: self.path.clone(),
                source,
            })?;

        let listings: Vec<Listing> =
            serde_json::from_str(&text).map_err(|source| SnapshotError::Schema {
                path: self.path.clone(),
                source,
            })?;

        Ok(listings.into_iter().collect())
    }

    /// Reads the snapshot, treating any failure as "nothing seen yet".
    pub async fn load(&self) -> BTreeSet<Listing> {
        match self.try_load().await {
            Ok(listings) => {
                info!("Loaded {} known listings from {}", listings.len(), self.path.display());
                listings
            }
            Err(SnapshotError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                info!("No snapshot at {}, starting empty", self.path.display());
                BTreeSet::new()
            }
            Err(e) => {
                warn!("Ignoring unusable snapshot: {}", e);
                BTreeSet::new()
            }
        }
    }

    /// Overwrites the snapshot with `listings`.
    ///
    /// Writes a sibling `.tmp` file first and renames it over the target, so
    /// an interrupted save leaves the previous snapshot intact.
    pub async fn save(&self, listings: &BTreeSet<Listing>) -> Result<()> {
        let mut json = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        listings
            .serialize(&mut serializer)
            .context("Failed to serialize snapshot")?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        info!("💾 Saved {} listings to {}", listings.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("sssb-watch-{}", std::process::id()))
        .join(format!("{}.json", name))
}
