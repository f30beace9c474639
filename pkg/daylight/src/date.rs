use anyhow::{Context, Result};
use chrono::NaiveDateTime;

/// The only timestamp shape the daylight service is trusted to return.
const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// Parse a `YYYY-MM-DDTHH:MM:SS+00:00` string into a naive UTC instant.
///
/// This is an exact match, not an ISO-8601 parser: any other offset is
/// rejected rather than converted.
pub fn parse_date(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, UTC_FORMAT)
        .with_context(|| format!("'{}' does not match YYYY-MM-DDTHH:MM:SS+00:00", value))
}
