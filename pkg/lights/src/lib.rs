//! Light actuation backends.
//!
//! The controller only decides *when* to switch the porch light; the
//! [`LightSwitch`] implementations here decide how the command reaches it.

pub mod dry_run;
pub mod gateway;

use anyhow::Result;
use async_trait::async_trait;

pub use dry_run::DryRunLight;
pub use gateway::GatewayLight;

/// Pluggable light backend.
/// Implementations: dry run (log only), REST lighting gateway.
#[async_trait]
pub trait LightSwitch: Send + Sync {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;

    /// Switch the light(s) to full brightness.
    async fn turn_on(&self) -> Result<()>;

    /// Switch the light(s) off.
    async fn turn_off(&self) -> Result<()>;
}
