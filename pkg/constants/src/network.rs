//! Network-related constants.

/// Default sunrise/sunset lookup endpoint.
pub const DEFAULT_DAYLIGHT_API: &str = "http://api.sunrise-sunset.org/json";

/// Request timeout for outbound HTTP calls (daylight lookup, light gateway).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
