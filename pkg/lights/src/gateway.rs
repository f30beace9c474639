use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use pkg_constants::lights::OFF_LEVEL;
use pkg_types::light::{DimmerCommand, GatewayDevice};
use std::time::Duration;
use tracing::{debug, info};

use crate::LightSwitch;

/// Backend for a REST lighting gateway.
///
/// - `GET  {base}/devices`            → `[GatewayDevice]`
/// - `PUT  {base}/devices/{id}/light` ← `{"dimmer": level}`
/// - `GET  {base}/devices/{id}`       → `GatewayDevice` (observation only)
pub struct GatewayLight {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    /// Device ids to switch. Empty means every light-capable device.
    lights: Vec<String>,
    on_level: u8,
}

impl GatewayLight {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        lights: Vec<String>,
        on_level: u8,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            lights,
            on_level,
        })
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Devices the gateway reports as dimmable lights.
    pub async fn list_lights(&self) -> Result<Vec<GatewayDevice>> {
        let url = format!("{}/devices", self.base_url);
        let resp = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .with_context(|| format!("failed to list devices at {}", url))?;
        if !resp.status().is_success() {
            bail!("listing devices at {} failed: {}", url, resp.status());
        }
        let devices: Vec<GatewayDevice> = resp
            .json()
            .await
            .with_context(|| format!("unexpected device list from {}", url))?;
        Ok(devices.into_iter().filter(|d| d.has_light_control).collect())
    }

    async fn targets(&self) -> Result<Vec<String>> {
        if !self.lights.is_empty() {
            return Ok(self.lights.clone());
        }
        let ids: Vec<String> = self.list_lights().await?.into_iter().map(|d| d.id).collect();
        if ids.is_empty() {
            bail!("gateway {} reports no light-capable devices", self.base_url);
        }
        Ok(ids)
    }

    /// Send the dimmer level to every target light.
    pub async fn set_dimmer(&self, level: u8) -> Result<()> {
        for id in self.targets().await? {
            let url = format!("{}/devices/{}/light", self.base_url, id);
            let resp = self
                .authorized(self.client.put(&url))
                .json(&DimmerCommand { dimmer: level })
                .send()
                .await
                .with_context(|| format!("failed to send dimmer command to {}", url))?;
            if !resp.status().is_success() {
                bail!("dimmer command to light {} failed: {}", id, resp.status());
            }
            info!("Light {}: dimmer set to {}", id, level);
            self.observe(&id);
        }
        Ok(())
    }

    /// Best-effort read-back of the device state, logged only.
    fn observe(&self, id: &str) {
        let url = format!("{}/devices/{}", self.base_url, id);
        let req = self.authorized(self.client.get(&url));
        let id = id.to_string();
        tokio::spawn(async move {
            match req.send().await {
                Ok(resp) => match resp.json::<GatewayDevice>().await {
                    Ok(device) => debug!(
                        "Light {} ({}) reports dimmer {:?}",
                        id, device.name, device.dimmer
                    ),
                    Err(e) => debug!("Light {}: unreadable state: {}", id, e),
                },
                Err(e) => debug!("Light {}: observation failed: {}", id, e),
            }
        });
    }
}

#[async_trait]
impl LightSwitch for GatewayLight {
    fn name(&self) -> &str {
        "gateway"
    }

    async fn turn_on(&self) -> Result<()> {
        self.set_dimmer(self.on_level).await
    }

    async fn turn_off(&self) -> Result<()> {
        self.set_dimmer(OFF_LEVEL).await
    }
}
