//! Interpretation of the ISO-8601 `start`/`end` strings carried by tasks.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Parses a task timestamp into an instant.
///
/// Strings with an explicit offset (`Z`, `+02:00`) are taken as-is. Strings
/// without one are wall-clock times in `local`, and a bare date means local
/// midnight. Anything else yields `None`.
#[must_use]
pub fn parse_instant(raw: &str, local: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    local.from_local_datetime(&naive).single()
}

/// The `YYYY-MM-DD` key of the calendar day containing `now` in `local`.
#[must_use]
pub fn day_key<Tz: TimeZone>(now: &DateTime<Tz>, local: FixedOffset) -> String {
    now.with_timezone(&local).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn parses_minute_precision_local_time() {
        let dt = parse_instant("2024-01-01T08:00", utc()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T08:00:00+00:00");
    }

    #[test]
    fn honours_explicit_offset() {
        let dt = parse_instant("2024-01-01T08:00:00+02:00", utc()).unwrap();
        assert_eq!(dt.with_timezone(&Utc).to_rfc3339(), "2024-01-01T06:00:00+00:00");
    }

    #[test]
    fn bare_date_is_local_midnight() {
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        let dt = parse_instant("2024-03-10", plus_one).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-10T00:00:00+01:00");
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_instant("next tuesday", utc()).is_none());
        assert!(parse_instant("", utc()).is_none());
    }

    #[test]
    fn day_key_uses_local_offset() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        assert_eq!(day_key(&now, utc()), "2024-01-01");
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(day_key(&now, plus_one), "2024-01-02");
    }
}
