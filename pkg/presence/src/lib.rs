//! Presence evidence from the DHCP server: lease log parsing and the
//! "just arrived" predicate.

pub mod arrival;
pub mod leases;

pub use arrival::{default_window, recently_arrived};
pub use leases::{parse_leases, read_leases};
