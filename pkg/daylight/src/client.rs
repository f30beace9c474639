use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use pkg_types::daylight::{DarkInterval, DaylightResponse};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

use crate::date::parse_date;

/// Provider of today's dark interval for a location.
#[async_trait]
pub trait DaylightSource: Send + Sync {
    async fn dark_interval(&self, latitude: f64, longitude: f64) -> Result<DarkInterval>;
}

/// Client for a sunrise-sunset.org compatible JSON API.
pub struct SunriseSunsetClient {
    client: reqwest::Client,
    api_url: String,
}

impl SunriseSunsetClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    fn request_url(&self, latitude: f64, longitude: f64) -> Result<Url> {
        Url::parse_with_params(
            &self.api_url,
            &[
                ("lat", latitude.to_string()),
                ("lng", longitude.to_string()),
                ("formatted", "0".to_string()),
            ],
        )
        .with_context(|| format!("invalid daylight API url {}", self.api_url))
    }
}

#[async_trait]
impl DaylightSource for SunriseSunsetClient {
    async fn dark_interval(&self, latitude: f64, longitude: f64) -> Result<DarkInterval> {
        let url = self.request_url(latitude, longitude)?;
        debug!("Daylight lookup: GET {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("daylight lookup to {} failed", self.api_url))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("daylight lookup to {} failed: {}", self.api_url, status);
        }
        let body = resp.text().await?;
        parse_daylight_response(&body)
    }
}

/// Decode a daylight API body into today's dark interval.
///
/// `nautical_twilight_begin` is the morning boundary (end of darkness),
/// `nautical_twilight_end` the evening one (start of darkness).
pub fn parse_daylight_response(body: &str) -> Result<DarkInterval> {
    let data: DaylightResponse =
        serde_json::from_str(body).context("unexpected daylight response shape")?;

    if let Some(status) = data.status.as_deref() {
        if status != "OK" {
            bail!("daylight lookup returned status {}", status);
        }
    }

    let dark_end = parse_date(&data.results.nautical_twilight_begin)
        .context("invalid nautical_twilight_begin")?;
    let dark_begin = parse_date(&data.results.nautical_twilight_end)
        .context("invalid nautical_twilight_end")?;

    Ok(DarkInterval {
        dark_begin,
        dark_end,
    })
}
