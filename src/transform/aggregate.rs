use crate::config::AggregateRule;
use crate::error::TransformError;
use crate::record::CaseRecord;

/// Rate per 100,000 inhabitants.
pub fn per_100k(count: i64, population: i64) -> f64 {
    count as f64 / population as f64 * 100_000.0
}

/// Builds the synthetic aggregate row for `rule` from its constituent rows.
///
/// Constituents are the rows whose parent name matches `rule.parent_name`,
/// minus the administrative duplicate keyed `rule.region_id`. Counts are
/// summed; rates are recomputed against the fixed `rule.population`.
pub fn aggregate_region(
    records: &[CaseRecord],
    rule: &AggregateRule,
) -> Result<CaseRecord, TransformError> {
    let group: Vec<&CaseRecord> = records
        .iter()
        .filter(|r| r.id != rule.region_id && r.state == rule.parent_name)
        .collect();

    if group.is_empty() {
        return Err(TransformError::EmptyAggregateGroup(rule.parent_name.clone()));
    }

    let sum = |column: &'static str, field: fn(&CaseRecord) -> i64| {
        group
            .iter()
            .try_fold(0i64, |acc, r| acc.checked_add(field(r)))
            .ok_or(TransformError::Overflow(column))
    };

    let cases = sum("Faelle", |r: &CaseRecord| r.cases)?;
    let deaths = sum("Todesfaelle", |r: &CaseRecord| r.deaths)?;
    let new_cases_7d = sum("NeueFaelleLetzte7Tage", |r: &CaseRecord| r.new_cases_7d)?;

    Ok(CaseRecord {
        id: rule.region_id,
        state: rule.parent_name.clone(),
        state_id: rule.parent_id,
        district: rule.region_name.clone(),
        cases,
        cases_delta: sum("FaelleDelta", |r: &CaseRecord| r.cases_delta)?,
        deaths,
        deaths_delta: sum("TodesfaelleDelta", |r: &CaseRecord| r.deaths_delta)?,
        recovered: sum("Genesen", |r: &CaseRecord| r.recovered)?,
        recovered_delta: sum("GenesenDelta", |r: &CaseRecord| r.recovered_delta)?,
        population: rule.population,
        incidence: Some(per_100k(cases, rule.population)),
        death_rate: Some(per_100k(deaths, rule.population)),
        new_cases_7d,
        incidence_7d: Some(per_100k(new_cases_7d, rule.population)),
    })
}
