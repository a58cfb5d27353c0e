//! Typed failures for the parts of a cycle that callers may want to match on.
//!
//! Everything else travels as `anyhow::Error` with context attached.

use std::path::PathBuf;

/// A listing block on the page did not have the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// An element the listing needs was not found inside its block.
    #[error("listing #{index}: no element matching `{selector}`")]
    MissingElement {
        /// Position of the listing block in document order.
        index: usize,
        /// CSS selector that matched nothing.
        selector: &'static str,
    },

    /// The title element had no link to the listing page.
    #[error("listing #{index}: title has no link")]
    MissingLink {
        /// Position of the listing block in document order.
        index: usize,
    },

    /// The address field was not of the form `street / unit`.
    #[error("listing #{index}: cannot split address {text:?} on '/'")]
    MalformedAddress {
        /// Position of the listing block in document order.
        index: usize,
        /// Raw address text.
        text: String,
    },
}

/// Environment configuration could not be turned into a [`crate::config::Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Reading the snapshot file failed.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {path} does not match the listing schema: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
