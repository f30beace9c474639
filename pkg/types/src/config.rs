use serde::{Deserialize, Serialize};

/// Controller configuration file (YAML; a JSON `settings.json` also parses).
///
/// Example `config.yaml`:
/// ```yaml
/// leases-file: /var/lib/dhcp/dhcpd.leases
/// macs:
///   - a4:5e:60:d2:11:0b
/// latitude: 60.1699
/// longitude: 24.9384
/// interval-secs: 5
/// gateway: http://10.0.0.2:8080
/// lights: ["65537"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PorchConfigFile {
    #[serde(default, alias = "leases-file")]
    pub leases_file: Option<String>,
    /// Tracked hardware identifiers; empty tracks every device.
    #[serde(default)]
    pub macs: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, alias = "interval-secs")]
    pub interval_secs: Option<u64>,
    #[serde(default, alias = "arrival-window-minutes")]
    pub arrival_window_minutes: Option<i64>,
    #[serde(default, alias = "daylight-api")]
    pub daylight_api: Option<String>,
    #[serde(default, alias = "http-timeout-secs")]
    pub http_timeout_secs: Option<u64>,
    /// Base URL of the lighting gateway; no gateway means dry-run.
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default, alias = "gateway-token")]
    pub gateway_token: Option<String>,
    /// Gateway device ids to switch; empty switches every light.
    #[serde(default)]
    pub lights: Vec<String>,
    #[serde(default, alias = "on-level")]
    pub on_level: Option<u8>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("invalid config file {}: {}", path, e))?;
    Ok(config)
}
