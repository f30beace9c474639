use anyhow::Result;
use chrono::NaiveDateTime;
use pkg_types::daylight::DarkInterval;
use tracing::debug;

use crate::client::DaylightSource;

/// Dark iff `reference` is before the morning boundary or after the evening
/// one. Not valid where the sun does not rise or set for days.
pub fn is_dark(reference: NaiveDateTime, interval: &DarkInterval) -> bool {
    interval.contains(reference)
}

/// Fetch today's dark interval for the location and classify `reference`.
/// Every call performs a fresh lookup.
pub async fn check_darkness(
    source: &dyn DaylightSource,
    reference: NaiveDateTime,
    latitude: f64,
    longitude: f64,
) -> Result<bool> {
    let interval = source.dark_interval(latitude, longitude).await?;
    let dark = is_dark(reference, &interval);
    debug!(
        "Darkness at {}: {} (dark until {}, dark from {})",
        reference, dark, interval.dark_end, interval.dark_begin
    );
    Ok(dark)
}
