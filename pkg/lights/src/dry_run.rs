use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::LightSwitch;

/// Backend that only logs. Used when no gateway is configured.
#[derive(Debug, Default)]
pub struct DryRunLight {
    on: AtomicBool,
}

impl DryRunLight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last state this backend was asked for.
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LightSwitch for DryRunLight {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn turn_on(&self) -> Result<()> {
        if self.is_on() {
            info!("[dry-run] light on (already on)");
        } else {
            info!("[dry-run] light on");
        }
        self.on.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn turn_off(&self) -> Result<()> {
        self.on.store(false, Ordering::Relaxed);
        info!("[dry-run] light off");
        Ok(())
    }
}
