//! The fetch, transform and publish stages wired together.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::{AggregateRule, IGNORE_COLUMNS, OUTPUT_FILENAME};
use crate::error::Result;
use crate::fetch::{CachedFetch, Source};
use crate::output::to_csv_bytes;
use crate::parser::parse_table;
use crate::publish::{PublishOutcome, Store, TableComparer, publish_if_changed};
use crate::record::DistrictRecord;
use crate::transform::transform;

/// Fetches the feed (memoized) and returns the corrected table.
///
/// `clock` is read once, after the payload has been fetched and parsed, so
/// `Stand` reflects the transform and not the start of the download.
#[tracing::instrument(skip(source, rule, clock), fields(source = %source.source().location()))]
pub async fn build_table<S, F>(
    source: &CachedFetch<S>,
    rule: &AggregateRule,
    clock: F,
) -> Result<Vec<DistrictRecord>>
where
    S: Source,
    F: Fn() -> DateTime<Utc>,
{
    let raw = source.get().await?;
    let records = parse_table(&raw)?;
    let table = transform(records, rule, clock())?;
    info!(rows = table.len(), "District table built");
    Ok(table)
}

/// Comparer that ignores the `Stand` column.
pub fn stand_insensitive_comparer() -> TableComparer {
    TableComparer::ignoring(IGNORE_COLUMNS.iter().copied())
}

/// Builds the table and stores it as `rki_ndr_districts.csv` if it
/// materially changed.
///
/// Nothing is written unless the whole table was built successfully.
pub async fn write_districts<S, T, F>(
    source: &CachedFetch<S>,
    store: &T,
    rule: &AggregateRule,
    clock: F,
) -> anyhow::Result<PublishOutcome>
where
    S: Source,
    T: Store + ?Sized,
    F: Fn() -> DateTime<Utc>,
{
    let table = build_table(source, rule, clock).await?;
    let body = Bytes::from(to_csv_bytes(&table)?);
    publish_if_changed(store, OUTPUT_FILENAME, body, &stand_insensitive_comparer()).await
}
