//! Corrections applied to the feed before publishing.
//!
//! The feed lists Berlin by borough. [`transform`] folds those rows into a
//! single recomputed Berlin row, sorts the table by district id, renames the
//! key column and stamps every row with the run date.

mod aggregate;
mod stamp;

pub use aggregate::{aggregate_region, per_100k};
pub use stamp::stand_for;

use crate::config::AggregateRule;
use crate::error::TransformError;
use crate::record::{CaseRecord, DistrictRecord};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Produces the published table from the parsed feed.
///
/// `now` is the moment of the transform and determines the `Stand` column.
///
/// # Errors
///
/// Fails if the aggregate group is empty, a sum overflows, or the result
/// would contain the same id twice.
#[tracing::instrument(skip(records, rule), fields(rows = records.len(), parent = %rule.parent_name))]
pub fn transform(
    records: Vec<CaseRecord>,
    rule: &AggregateRule,
    now: DateTime<Utc>,
) -> Result<Vec<DistrictRecord>, TransformError> {
    let aggregate = aggregate_region(&records, rule)?;
    debug!(
        id = aggregate.id,
        cases = aggregate.cases,
        incidence_7d = ?aggregate.incidence_7d,
        "Aggregate row computed"
    );

    let before = records.len();
    let mut table: Vec<CaseRecord> = records
        .into_iter()
        .filter(|r| r.state != rule.parent_name)
        .collect();
    debug!(dropped = before - table.len(), "Constituent rows removed");

    table.push(aggregate);
    table.sort_by_key(|r| r.id);

    if let Some(pair) = table.windows(2).find(|w| w[0].id == w[1].id) {
        return Err(TransformError::DuplicateId(pair[0].id));
    }

    let stand = stand_for(now);
    Ok(table
        .into_iter()
        .map(|r| DistrictRecord::from_case(r, &stand))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(id: i64, state: &str, cases: i64) -> CaseRecord {
        CaseRecord {
            id,
            state: state.to_string(),
            state_id: id / 1000,
            district: format!("District {id}"),
            cases,
            cases_delta: 0,
            deaths: 0,
            deaths_delta: 0,
            recovered: 0,
            recovered_delta: 0,
            population: 100_000,
            incidence: Some(cases as f64),
            death_rate: None,
            new_cases_7d: 0,
            incidence_7d: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_berlin_rows_replaced_by_one_sorted_row() {
        let records = vec![
            row(12001, "Brandenburg", 7),
            row(11002, "Berlin", 250),
            row(11000, "Berlin", 99_999),
            row(1001, "Schleswig-Holstein", 3),
            row(11001, "Berlin", 100),
        ];
        let table = transform(records, &AggregateRule::default(), now()).unwrap();

        let ids: Vec<i64> = table.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1001, 11000, 12001]);

        let berlin = &table[1];
        assert_eq!(berlin.cases, 350);
        assert_eq!(berlin.district, "Berlin");
        assert!(table.iter().all(|r| r.stand == "19.10.26 0:00 Uhr"));
    }

    #[test]
    fn test_duplicate_id_outside_group_is_rejected() {
        let records = vec![
            row(1001, "Schleswig-Holstein", 3),
            row(1001, "Schleswig-Holstein", 4),
            row(11001, "Berlin", 100),
        ];
        let err = transform(records, &AggregateRule::default(), now()).unwrap_err();
        assert!(matches!(err, TransformError::DuplicateId(1001)));
    }

    #[test]
    fn test_aggregate_id_clash_outside_group_is_rejected() {
        // A row carrying the aggregate id under another parent would survive
        // the drop and collide with the synthetic row.
        let records = vec![row(11000, "Brandenburg", 1), row(11001, "Berlin", 100)];
        let err = transform(records, &AggregateRule::default(), now()).unwrap_err();
        assert!(matches!(err, TransformError::DuplicateId(11000)));
    }

    #[test]
    fn test_missing_group_fails_instead_of_zero_row() {
        let records = vec![row(1001, "Schleswig-Holstein", 3)];
        assert!(matches!(
            transform(records, &AggregateRule::default(), now()),
            Err(TransformError::EmptyAggregateGroup(_))
        ));
    }
}
