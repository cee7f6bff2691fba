//! Lenient date/time parsing for textual cells.
//! Accepts the layouts spreadsheet exports commonly produce; anything else is not a date.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;

/// Date-time layouts tried in order after RFC 3339.
const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted at midnight.
const DATE_FORMATS: [&str; 11] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

/// Parses a textual date or date-time into a naive timestamp.
/// Values carrying an offset are normalised to UTC.
pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    #[test]
    fn parse_iso_dates() {
        assert_eq!(parse_datetime("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_datetime(" 2024/03/05 "), Some(ymd(2024, 3, 5)));
        assert_eq!(
            parse_datetime("2024-03-05T10:30:00"),
            NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|date| date.and_hms_opt(10, 30, 0))
        );
        assert_eq!(
            parse_datetime("2024-03-05T10:30:00+02:00"),
            NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|date| date.and_hms_opt(8, 30, 0))
        );
    }

    #[test]
    fn parse_human_dates() {
        assert_eq!(parse_datetime("03/05/2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_datetime("5 Mar 2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_datetime("March 5, 2024"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn reject_non_dates() {
        assert_eq!(parse_datetime("hello world"), None);
        assert_eq!(parse_datetime("2024-13-40"), None);
        assert_eq!(parse_datetime("12345678"), None);
    }
}
