//! Row types for the district table, as read from the feed and as published.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// One district row as delivered by the source feed.
///
/// Rate columns are only passed through, never summed, so an empty rate cell
/// is kept as `None` instead of failing the run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaseRecord {
    #[serde(rename = "IdLandkreis", deserialize_with = "de_count")]
    pub id: i64,
    #[serde(rename = "Bundesland")]
    pub state: String,
    #[serde(rename = "IdBundesland", deserialize_with = "de_count")]
    pub state_id: i64,
    #[serde(rename = "Landkreis")]
    pub district: String,

    #[serde(rename = "Faelle", deserialize_with = "de_count")]
    pub cases: i64,
    #[serde(rename = "FaelleDelta", deserialize_with = "de_count")]
    pub cases_delta: i64,
    #[serde(rename = "Todesfaelle", deserialize_with = "de_count")]
    pub deaths: i64,
    #[serde(rename = "TodesfaelleDelta", deserialize_with = "de_count")]
    pub deaths_delta: i64,
    #[serde(rename = "Genesen", deserialize_with = "de_count")]
    pub recovered: i64,
    #[serde(rename = "GenesenDelta", deserialize_with = "de_count")]
    pub recovered_delta: i64,

    #[serde(rename = "population", deserialize_with = "de_count")]
    pub population: i64,
    #[serde(rename = "Inzidenz")]
    pub incidence: Option<f64>,
    #[serde(rename = "Todesrate")]
    pub death_rate: Option<f64>,
    #[serde(rename = "NeueFaelleLetzte7Tage", deserialize_with = "de_count")]
    pub new_cases_7d: i64,
    #[serde(rename = "InzidenzLetzte7Tage")]
    pub incidence_7d: Option<f64>,
}

/// Feed columns a [`CaseRecord`] is built from. Extra columns are ignored.
pub const SOURCE_COLUMNS: &[&str] = &[
    "IdLandkreis",
    "Bundesland",
    "IdBundesland",
    "Landkreis",
    "Faelle",
    "FaelleDelta",
    "Todesfaelle",
    "TodesfaelleDelta",
    "Genesen",
    "GenesenDelta",
    "population",
    "Inzidenz",
    "Todesrate",
    "NeueFaelleLetzte7Tage",
    "InzidenzLetzte7Tage",
];

/// One row of the published table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictRecord {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Bundesland")]
    pub state: String,
    #[serde(rename = "IdBundesland")]
    pub state_id: i64,
    #[serde(rename = "Landkreis")]
    pub district: String,
    #[serde(rename = "Faelle")]
    pub cases: i64,
    #[serde(rename = "FaelleDelta")]
    pub cases_delta: i64,
    #[serde(rename = "Todesfaelle")]
    pub deaths: i64,
    #[serde(rename = "TodesfaelleDelta")]
    pub deaths_delta: i64,
    #[serde(rename = "Genesen")]
    pub recovered: i64,
    #[serde(rename = "GenesenDelta")]
    pub recovered_delta: i64,
    pub population: i64,
    #[serde(rename = "Inzidenz")]
    pub incidence: Option<f64>,
    #[serde(rename = "Todesrate")]
    pub death_rate: Option<f64>,
    #[serde(rename = "NeueFaelleLetzte7Tage")]
    pub new_cases_7d: i64,
    #[serde(rename = "InzidenzLetzte7Tage")]
    pub incidence_7d: Option<f64>,
    #[serde(rename = "Stand")]
    pub stand: String,
}

/// Published column names, in order.
pub const OUTPUT_COLUMNS: &[&str] = &[
    "ID",
    "Bundesland",
    "IdBundesland",
    "Landkreis",
    "Faelle",
    "FaelleDelta",
    "Todesfaelle",
    "TodesfaelleDelta",
    "Genesen",
    "GenesenDelta",
    "population",
    "Inzidenz",
    "Todesrate",
    "NeueFaelleLetzte7Tage",
    "InzidenzLetzte7Tage",
    "Stand",
];

impl DistrictRecord {
    /// Renames the key column and attaches the run-wide `stand`.
    pub fn from_case(record: CaseRecord, stand: &str) -> Self {
        Self {
            id: record.id,
            state: record.state,
            state_id: record.state_id,
            district: record.district,
            cases: record.cases,
            cases_delta: record.cases_delta,
            deaths: record.deaths,
            deaths_delta: record.deaths_delta,
            recovered: record.recovered,
            recovered_delta: record.recovered_delta,
            population: record.population,
            incidence: record.incidence,
            death_rate: record.death_rate,
            new_cases_7d: record.new_cases_7d,
            incidence_7d: record.incidence_7d,
            stand: stand.to_string(),
        }
    }
}

/// Accepts integral cells written either as `42` or as `42.0`.
fn de_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_count(&raw).ok_or_else(|| D::Error::custom(format!("expected an integer, got '{raw}'")))
}

// f64 is exact for integers up to 2^53
const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

pub(crate) fn parse_count(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT_F64 {
        Some(v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_accepts_integral_renderings() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count("-7"), Some(-7));
        assert_eq!(parse_count("42.0"), Some(42));
        assert_eq!(parse_count(" 3 "), Some(3));
    }

    #[test]
    fn test_parse_count_rejects_fractions_and_junk() {
        assert_eq!(parse_count("42.5"), None);
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count("abc"), None);
    }

    #[test]
    fn test_output_columns_match_field_order() {
        let mut wtr = csv::Writer::from_writer(vec![]);
        let record = DistrictRecord {
            id: 1001,
            state: "Schleswig-Holstein".to_string(),
            state_id: 1,
            district: "SK Flensburg".to_string(),
            cases: 10,
            cases_delta: 1,
            deaths: 0,
            deaths_delta: 0,
            recovered: 9,
            recovered_delta: 1,
            population: 90164,
            incidence: Some(11.0),
            death_rate: None,
            new_cases_7d: 2,
            incidence_7d: Some(2.2),
            stand: "19.10.26 0:00 Uhr".to_string(),
        };
        wtr.serialize(&record).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next().unwrap(), OUTPUT_COLUMNS.join(","));
        // a missing rate stays an empty cell
        assert_eq!(
            lines.next().unwrap(),
            "1001,Schleswig-Holstein,1,SK Flensburg,10,1,0,0,9,1,90164,11.0,,2,2.2,19.10.26 0:00 Uhr"
        );
    }
}
