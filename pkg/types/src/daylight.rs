use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Today's dark window for a location, in naive UTC.
///
/// Night wraps around midnight: it is dark before `dark_end` (morning)
/// and after `dark_begin` (evening).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DarkInterval {
    /// Evening nautical twilight end, darkness starts.
    pub dark_begin: NaiveDateTime,
    /// Morning nautical twilight begin, darkness ends.
    pub dark_end: NaiveDateTime,
}

impl DarkInterval {
    /// Whether `at` falls inside the dark part of the day.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at < self.dark_end || at > self.dark_begin
    }
}

// --- sunrise-sunset.org wire format ---

/// Response body of the daylight lookup (`formatted=0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaylightResponse {
    pub results: TwilightResults,
    /// "OK" on success; absent in some mirrors of the API.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilightResults {
    /// Morning: sun reaches 12° below the horizon, end of darkness.
    pub nautical_twilight_begin: String,
    /// Evening: sun sinks past 12° below the horizon, start of darkness.
    pub nautical_twilight_end: String,
}
