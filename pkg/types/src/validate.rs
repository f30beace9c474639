use anyhow::{Result, bail};

/// Validate a tracked hardware identifier.
/// Rules: six colon-separated octets of two hex digits each.
pub fn validate_hardware_id(id: &str) -> Result<()> {
    let octets: Vec<&str> = id.split(':').collect();
    if octets.len() != 6 {
        bail!(
            "hardware id '{}' must have 6 colon-separated octets (got {})",
            id,
            octets.len()
        );
    }
    if !octets
        .iter()
        .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
    {
        bail!("hardware id '{}' must contain only two-digit hex octets", id);
    }
    Ok(())
}

/// Validate a latitude/longitude pair in decimal degrees.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        bail!("latitude {} is outside [-90, 90]", latitude);
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        bail!("longitude {} is outside [-180, 180]", longitude);
    }
    Ok(())
}
