use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Layouts accepted for timestamps without an offset; these are read as UTC.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the timestamp formats found in Claude logs.
pub struct TimestampParser;

impl TimestampParser {
    /// RFC 3339 with `Z` or an offset, or a naive date-time taken as UTC.
    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }

        NAIVE_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
            .map(|naive| naive.and_utc())
    }

    /// Parse a JSON field; only strings can hold a timestamp.
    pub fn parse_value(value: &Value) -> Option<DateTime<Utc>> {
        value.as_str().and_then(Self::parse)
    }
}
