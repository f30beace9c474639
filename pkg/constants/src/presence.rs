//! Presence detection / control loop constants.

/// Seconds between two control loop ticks.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 5;

/// A lease transaction younger than this counts as "just arrived".
pub const DEFAULT_ARRIVAL_WINDOW_MINUTES: i64 = 5;
