//! Fixed dataset parameters: where the feed lives, how Berlin is rebuilt,
//! and where the result is published.

use chrono_tz::Tz;

/// Source CSV with current case counts per district.
pub const SOURCE_URL: &str =
    "https://ndrdata-corona-datastore.storage.googleapis.com/rki_api/current_cases_regions.csv";

/// Logical filename of the published table.
pub const OUTPUT_FILENAME: &str = "rki_ndr_districts.csv";

/// Columns that never count as a material change when comparing versions.
pub const IGNORE_COLUMNS: &[&str] = &["Stand"];

/// Time zone the `Stand` column is rendered in.
pub const STAND_TIMEZONE: Tz = chrono_tz::Europe::Berlin;

/// Date-only stamp; the hour is always rendered as midnight.
pub const STAND_FORMAT: &str = "%d.%m.%y 0:00 Uhr";

/// Request timeout for the source fetch, in seconds.
pub const FETCH_TIMEOUT_SECS: u64 = 30;
pub const FETCH_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Describes which rows get folded into one synthetic aggregate row.
///
/// The feed reports Berlin as twelve boroughs plus a redundant city-level
/// row. The boroughs are summed (skipping the city row) and replaced by a
/// single row keyed with the city id.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRule {
    /// Parent-region name whose rows are folded together.
    pub parent_name: String,
    /// Key of the administrative duplicate, excluded from sums. The synthetic
    /// row reuses it.
    pub region_id: i64,
    pub parent_id: i64,
    pub region_name: String,
    /// Fixed population for the rates; not the sum of the constituents.
    pub population: i64,
}

impl Default for AggregateRule {
    fn default() -> Self {
        Self {
            parent_name: "Berlin".to_string(),
            region_id: 11000,
            parent_id: 11,
            region_name: "Berlin".to_string(),
            population: 3_644_826,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule_is_berlin() {
        let rule = AggregateRule::default();
        assert_eq!(rule.parent_name, "Berlin");
        assert_eq!(rule.region_id, 11000);
        assert_eq!(rule.parent_id, 11);
        assert_eq!(rule.population, 3_644_826);
    }
}
