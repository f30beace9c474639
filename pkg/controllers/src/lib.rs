pub mod occupancy;

pub use occupancy::{OccupancyConfig, OccupancyController};
