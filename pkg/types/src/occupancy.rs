use serde::{Deserialize, Serialize};

/// Whether somebody is considered to be at home.
/// Starts as `Unoccupied` on every process start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OccupancyState {
    #[default]
    Unoccupied,
    Occupied,
}

impl OccupancyState {
    pub fn is_occupied(self) -> bool {
        self == OccupancyState::Occupied
    }

    /// Whether a transition out of this state depends on darkness, given the
    /// arrival signal. Only these ticks pay for a daylight lookup.
    pub fn needs_darkness(self, arrived: bool) -> bool {
        if self.is_occupied() {
            !arrived
        } else {
            arrived
        }
    }
}

impl std::fmt::Display for OccupancyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OccupancyState::Unoccupied => write!(f, "Unoccupied"),
            OccupancyState::Occupied => write!(f, "Occupied"),
        }
    }
}

/// Inputs to one occupancy transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    /// A tracked device transacted within the arrival window.
    pub arrived: bool,
    /// Darkness at the tick instant; `None` when it was not looked up.
    pub dark: Option<bool>,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    LightOn,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::LightOn => write!(f, "LightOn"),
        }
    }
}
