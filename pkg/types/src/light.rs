use serde::{Deserialize, Serialize};

// --- Lighting gateway wire format ---

/// A device as listed by the lighting gateway (`GET /devices`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayDevice {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Only devices with light control can be dimmed.
    #[serde(default)]
    pub has_light_control: bool,
    /// Last reported dimmer level, when the gateway knows it.
    #[serde(default)]
    pub dimmer: Option<u8>,
}

/// Body of `PUT /devices/<id>/light`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DimmerCommand {
    pub dimmer: u8,
}
