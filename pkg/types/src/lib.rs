//! Shared data types for the porch controller.

pub mod config;
pub mod daylight;
pub mod lease;
pub mod light;
pub mod occupancy;
pub mod validate;
