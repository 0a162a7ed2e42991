//! Compile-time embedded geocoding service configuration.
//!
//! The reverse geocoder is defined in `services/nominatim.toml`. The file is
//! embedded at compile time; the base URL can be overridden at runtime with
//! the `NOMINATIM_URL` environment variable (e.g. to point at a self-hosted
//! instance).

use serde::Deserialize;

use crate::GeocodeError;

/// Environment variable overriding [`GeocodingService::base_url`].
pub const BASE_URL_ENV: &str = "NOMINATIM_URL";

/// A reverse geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the service may be called.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Reverse endpoint URL.
    pub base_url: String,
    /// `User-Agent` sent with every request. Nominatim's usage policy
    /// rejects requests without an identifying agent.
    pub user_agent: String,
    /// Address detail level (3 = country ... 18 = building).
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

const fn default_true() -> bool {
    true
}

const fn default_zoom() -> u8 {
    18
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

/// Parses a service definition.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if the TOML is malformed.
pub fn parse_service(toml_str: &str) -> Result<GeocodingService, GeocodeError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Returns the embedded Nominatim configuration with any
/// [`BASE_URL_ENV`] override applied.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if the embedded TOML is malformed.
pub fn nominatim_service() -> Result<GeocodingService, GeocodeError> {
    let mut service = parse_service(NOMINATIM_TOML)?;

    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        let url = url.trim();
        if !url.is_empty() {
            log::info!("Using {BASE_URL_ENV} override for {}: {url}", service.id);
            service.base_url = url.to_string();
        }
    }

    Ok(service)
}
