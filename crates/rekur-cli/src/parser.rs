use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;

/// Parses an absolute or relative due date ("tomorrow 9am", "next friday")
/// on the calendar of `timezone`.
pub fn parse_due_date(date_str: &str, timezone: Tz) -> Result<DateTime<Utc>> {
    let now = Utc::now().with_timezone(&timezone);
    parse_date_string(date_str, now, Dialect::Us)
        .map(|due| due.with_timezone(&Utc))
        .map_err(|e| anyhow::anyhow!("Failed to parse due date '{}': {}", date_str, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_absolute_date_uses_configured_timezone() {
        let due = parse_due_date("2025-03-01 18:00", chrono_tz::Europe::Istanbul).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_relative_date_is_in_the_future() {
        let due = parse_due_date("tomorrow", Tz::UTC).unwrap();
        assert!(due > Utc::now());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_due_date("not a date", Tz::UTC).is_err());
    }
}
