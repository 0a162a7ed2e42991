//! Nominatim / `OpenStreetMap` reverse geocoder client.
//!
//! The public instance allows at most **1 request per second**; this client
//! sends one request per call and leaves pacing to the caller.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use async_trait::async_trait;

use crate::locality::resolve_locality;
use crate::service_registry::{self, GeocodingService};
use crate::{GeocodeError, ResolvedAddress, ReverseGeocoder};

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    zoom: u8,
}

impl NominatimGeocoder {
    /// Creates a client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, user_agent: &str, zoom: u8) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            zoom,
        })
    }

    /// Creates a client from a service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Disabled`] if the service is not enabled, or
    /// [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn from_service(service: &GeocodingService) -> Result<Self, GeocodeError> {
        if !service.enabled {
            log::warn!("{} ({}) is disabled", service.name, service.id);
            return Err(GeocodeError::Disabled {
                id: service.id.clone(),
            });
        }
        log::info!("Reverse geocoding with {} at {}", service.name, service.base_url);
        Self::new(&service.base_url, &service.user_agent, service.zoom)
    }

    /// Creates a client from the embedded configuration, honoring the
    /// `NOMINATIM_URL` override.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn from_env() -> Result<Self, GeocodeError> {
        Self::from_service(&service_registry::nominatim_service()?)
    }

    /// The endpoint this client queries.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ResolvedAddress, GeocodeError> {
        log::debug!("Reverse geocoding ({latitude}, {longitude})");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "jsonv2".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", self.zoom.to_string()),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body, latitude, longitude)
    }
}

/// Parses a Nominatim reverse response.
fn parse_response(
    body: &serde_json::Value,
    latitude: f64,
    longitude: f64,
) -> Result<ResolvedAddress, GeocodeError> {
    if body.get("error").is_some() {
        return Err(GeocodeError::NotFound {
            latitude,
            longitude,
        });
    }

    let display_name = body["display_name"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing display_name in Nominatim response".to_string(),
        })?;

    let lat = parse_coordinate(&body["lat"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lat in Nominatim response".to_string(),
    })?;

    let lon = parse_coordinate(&body["lon"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lon in Nominatim response".to_string(),
    })?;

    let address = body.get("address").ok_or_else(|| GeocodeError::Parse {
        message: "Missing address details in Nominatim response".to_string(),
    })?;

    let field = |key: &str| address.get(key).and_then(|v| v.as_str()).map(String::from);

    Ok(ResolvedAddress {
        display_name,
        latitude: lat,
        longitude: lon,
        postcode: field("postcode"),
        locality: resolve_locality(address),
        region: field("state"),
        country: field("country"),
    })
}

/// Nominatim returns coordinates as strings; accept numbers too.
fn parse_coordinate(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| value.as_f64())
}
