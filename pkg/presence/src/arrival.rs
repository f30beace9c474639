use chrono::{NaiveDateTime, TimeDelta};
use pkg_constants::presence::DEFAULT_ARRIVAL_WINDOW_MINUTES;
use pkg_types::lease::LeaseEntry;

/// The default "just arrived" window.
pub fn default_window() -> TimeDelta {
    TimeDelta::minutes(DEFAULT_ARRIVAL_WINDOW_MINUTES)
}

/// Did any device transact within `window` before `reference`?
///
/// Only looks backward: a transaction time after `reference` (clock skew
/// between the DHCP server and this host) does not count.
pub fn recently_arrived(
    reference: NaiveDateTime,
    entries: &[LeaseEntry],
    window: TimeDelta,
) -> bool {
    entries.iter().any(|entry| {
        let age = reference - entry.last_transaction_time;
        age >= TimeDelta::zero() && age <= window
    })
}
