//! Centralized constants for the porch controller.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod lights;
pub mod network;
pub mod paths;
pub mod presence;
