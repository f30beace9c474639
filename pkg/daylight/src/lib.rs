//! Darkness oracle: today's nautical twilight boundaries for a location,
//! fetched from a sunrise/sunset web service, and the dark/not-dark rule.

pub mod client;
pub mod date;
pub mod oracle;

pub use client::{DaylightSource, SunriseSunsetClient};
pub use date::parse_date;
pub use oracle::{check_darkness, is_dark};
