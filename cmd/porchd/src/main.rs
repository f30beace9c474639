mod settings;

use clap::Parser;
use pkg_constants::paths::DEFAULT_CONFIG;
use pkg_controllers::OccupancyController;
use pkg_daylight::SunriseSunsetClient;
use pkg_lights::{DryRunLight, GatewayLight, LightSwitch};
use pkg_types::config::{PorchConfigFile, load_config_file};
use settings::Settings;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "porchd", about = "Porch light controller (DHCP presence + darkness)")]
pub struct Cli {
    /// Path to YAML (or JSON) config file
    #[arg(long, short, default_value = DEFAULT_CONFIG)]
    config: String,

    /// ISC dhcpd lease log to watch
    #[arg(long)]
    leases_file: Option<String>,

    /// Location latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Location longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Seconds between checks
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Base URL of the lighting gateway
    #[arg(long)]
    gateway: Option<String>,

    /// Log light commands instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: PorchConfigFile = load_config_file(&cli.config)?;
    info!("Config file: {}", cli.config);
    let settings = Settings::resolve(&cli, file_cfg)?;

    info!("Starting porchd");
    info!("  Leases:    {}", settings.leases_file);
    info!("  Tracking:  {} device(s)", settings.macs.len());
    info!("  Location:  {}, {}", settings.latitude, settings.longitude);
    info!("  Interval:  {}s", settings.interval_secs);
    info!("  Daylight:  {}", settings.daylight_api);

    let daylight = Arc::new(SunriseSunsetClient::new(
        settings.daylight_api.clone(),
        settings.http_timeout(),
    )?);

    let light: Arc<dyn LightSwitch> = match &settings.gateway {
        Some(gateway) => {
            info!("  Gateway:   {}", gateway);
            Arc::new(GatewayLight::new(
                gateway,
                settings.gateway_token.clone(),
                settings.lights.clone(),
                settings.on_level,
                settings.http_timeout(),
            )?)
        }
        None => {
            info!("  Gateway:   none (dry run)");
            Arc::new(DryRunLight::new())
        }
    };

    let handle =
        OccupancyController::new(settings.occupancy_config(), daylight, light).start();

    // Block until Ctrl-C
    info!("porchd is running. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down porchd");
    handle.abort();

    Ok(())
}
