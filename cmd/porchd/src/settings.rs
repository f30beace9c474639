use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use pkg_constants::lights::DEFAULT_ON_LEVEL;
use pkg_constants::network::{DEFAULT_DAYLIGHT_API, DEFAULT_HTTP_TIMEOUT_SECS};
use pkg_constants::paths::DEFAULT_LEASES_FILE;
use pkg_constants::presence::{DEFAULT_ARRIVAL_WINDOW_MINUTES, DEFAULT_CHECK_INTERVAL_SECS};
use pkg_controllers::OccupancyConfig;
use pkg_types::config::PorchConfigFile;
use pkg_types::validate::{validate_coordinates, validate_hardware_id};
use std::time::Duration;

use crate::Cli;

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub leases_file: String,
    pub macs: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub interval_secs: u64,
    pub arrival_window: TimeDelta,
    pub daylight_api: String,
    pub http_timeout_secs: u64,
    /// `None` runs the light in dry-run mode.
    pub gateway: Option<String>,
    pub gateway_token: Option<String>,
    pub lights: Vec<String>,
    pub on_level: u8,
}

impl Settings {
    /// Merge: CLI args > config file > defaults, then validate.
    pub fn resolve(cli: &Cli, file: PorchConfigFile) -> Result<Self> {
        let latitude = cli
            .latitude
            .or(file.latitude)
            .context("latitude is not configured")?;
        let longitude = cli
            .longitude
            .or(file.longitude)
            .context("longitude is not configured")?;

        let gateway = if cli.dry_run {
            None
        } else {
            cli.gateway.clone().or(file.gateway)
        };

        let settings = Self {
            leases_file: cli
                .leases_file
                .clone()
                .or(file.leases_file)
                .unwrap_or_else(|| DEFAULT_LEASES_FILE.to_string()),
            macs: file.macs,
            latitude,
            longitude,
            interval_secs: cli
                .interval_secs
                .or(file.interval_secs)
                .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS),
            arrival_window: arrival_window(
                file.arrival_window_minutes.unwrap_or(DEFAULT_ARRIVAL_WINDOW_MINUTES),
            )?,
            daylight_api: file
                .daylight_api
                .unwrap_or_else(|| DEFAULT_DAYLIGHT_API.to_string()),
            http_timeout_secs: file.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            gateway,
            gateway_token: file.gateway_token,
            lights: file.lights,
            on_level: file.on_level.unwrap_or(DEFAULT_ON_LEVEL),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.leases_file.is_empty() {
            bail!("leases file must not be empty");
        }
        validate_coordinates(self.latitude, self.longitude)?;
        for mac in &self.macs {
            validate_hardware_id(mac)?;
        }
        if self.interval_secs == 0 {
            bail!("interval must be at least 1 second");
        }
        if self.http_timeout_secs == 0 {
            bail!("HTTP timeout must be at least 1 second");
        }
        if self.on_level == 0 {
            bail!("on-level 0 would never switch the light on");
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn occupancy_config(&self) -> OccupancyConfig {
        let mut config = OccupancyConfig::new(
            &self.leases_file,
            self.macs.clone(),
            self.latitude,
            self.longitude,
        );
        config.arrival_window = self.arrival_window;
        config.check_interval = Duration::from_secs(self.interval_secs);
        config
    }
}

/// Arrival window from a configured number of minutes.
fn arrival_window(minutes: i64) -> Result<TimeDelta> {
    if minutes <= 0 {
        bail!("arrival window must be positive (got {} minutes)", minutes);
    }
    TimeDelta::try_minutes(minutes)
        .with_context(|| format!("arrival window of {} minutes is out of range", minutes))
}
