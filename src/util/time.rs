use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

// Backend timestamps are ISO-8601, with or without offset and fractional seconds.
// Offset-aware values are shown in local time; naive ones are shown as-is.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Human display of a server timestamp; unparseable input is echoed back.
pub fn display_timestamp(s: &str) -> String {
    match parse_timestamp(s) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => s.to_string(),
    }
}

// YYYYMMDD stamp used in export filenames
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
