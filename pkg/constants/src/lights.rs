//! Light actuation constants.

/// Dimmer level sent for "on".
pub const DEFAULT_ON_LEVEL: u8 = 100;

/// Dimmer level sent for "off".
pub const OFF_LEVEL: u8 = 0;
