use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One DHCP lease block from the lease log.
/// Rebuilt from the log on every tick, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseEntry {
    /// Link-layer address, as written in the log (e.g. "a4:5e:60:d2:11:0b")
    pub hardware_id: String,
    /// Address assigned by the lease (informational only)
    pub address: String,
    /// Client last transaction time (`cltt`), naive UTC
    pub last_transaction_time: NaiveDateTime,
}

impl LeaseEntry {
    pub fn new(
        hardware_id: impl Into<String>,
        address: impl Into<String>,
        last_transaction_time: NaiveDateTime,
    ) -> Self {
        Self {
            hardware_id: hardware_id.into(),
            address: address.into(),
            last_transaction_time,
        }
    }
}
