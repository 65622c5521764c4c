//! Persisting the table only when it materially changed.
//!
//! A [`Store`] is a flat key/value blob store. [`publish_if_changed`] loads
//! the previous version under the same key, asks a [`TableComparer`] whether
//! anything besides the ignored columns differs, and writes only then.

mod compare;
mod local;
mod s3;

pub use compare::TableComparer;
pub use local::LocalStore;
pub use s3::S3Store;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

/// Blob storage keyed by logical filename.
#[async_trait]
pub trait Store: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// Returns the stored payload, or `None` if nothing is stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<Bytes>>;

    async fn save(&self, key: &str, body: Bytes) -> Result<()>;
}

/// What [`publish_if_changed`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Stored version matches apart from ignored columns; nothing written.
    Unchanged,
    Written { bytes: usize },
}

/// Writes `body` under `key` unless the stored version is materially equal.
#[tracing::instrument(skip(store, body, comparer), fields(store = %store.describe()))]
pub async fn publish_if_changed<S: Store + ?Sized>(
    store: &S,
    key: &str,
    body: Bytes,
    comparer: &TableComparer,
) -> Result<PublishOutcome> {
    let previous = store
        .load(key)
        .await
        .with_context(|| format!("failed to load previous version of '{key}'"))?;

    let changed = match &previous {
        Some(prev) => comparer.differs(prev, &body)?,
        None => {
            info!("No previous version stored");
            true
        }
    };

    if !changed {
        info!(ignored = ?comparer.ignored(), "Table unchanged, skipping upload");
        return Ok(PublishOutcome::Unchanged);
    }

    let bytes = body.len();
    store
        .save(key, body)
        .await
        .with_context(|| format!("failed to store '{key}'"))?;
    info!(bytes, "Table published");

    Ok(PublishOutcome::Written { bytes })
}
