use crate::config::{STAND_FORMAT, STAND_TIMEZONE};
use chrono::{DateTime, Utc};

/// Renders the `Stand` value for a run started at `now`.
///
/// The date is taken in Berlin local time; the time of day is always
/// printed as midnight.
pub fn stand_for(now: DateTime<Utc>) -> String {
    now.with_timezone(&STAND_TIMEZONE)
        .format(STAND_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stand_uses_berlin_date_in_summer() {
        // 22:30 UTC is already the next day in CEST
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 22, 30, 0).unwrap();
        assert_eq!(stand_for(now), "19.10.26 0:00 Uhr");
    }

    #[test]
    fn test_stand_uses_berlin_date_in_winter() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 22, 59, 0).unwrap();
        assert_eq!(stand_for(now), "01.01.26 0:00 Uhr");

        let now = Utc.with_ymd_and_hms(2026, 1, 1, 23, 0, 0).unwrap();
        assert_eq!(stand_for(now), "02.01.26 0:00 Uhr");
    }
}
