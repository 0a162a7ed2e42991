#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding for road damage reports.
//!
//! Resolves the coordinates a reporter's browser provides into a structured
//! postal address using Nominatim / `OpenStreetMap`. The provider is
//! configured by an embedded TOML file (see [`service_registry`]) and
//! reached through the [`ReverseGeocoder`] trait so callers can swap in
//! another implementation.
//!
//! Lookups are single-shot: no retry, caching, or rate limiting.

pub mod locality;
pub mod nominatim;
pub mod service_registry;

use async_trait::async_trait;
use thiserror::Error;

pub use nominatim::NominatimGeocoder;

/// A structured address resolved from a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    /// Full human-readable address.
    pub display_name: String,
    /// Latitude of the matched place (WGS84).
    pub latitude: f64,
    /// Longitude of the matched place (WGS84).
    pub longitude: f64,
    /// Postal code, if the provider returned one.
    pub postcode: Option<String>,
    /// Locality chosen by [`locality::resolve_locality`].
    pub locality: String,
    /// Administrative region (state / province).
    pub region: Option<String>,
    /// Country name.
    pub country: Option<String>,
}

/// Errors from reverse geocoding.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The provider has no address for these coordinates.
    #[error("No address found for ({latitude}, {longitude})")]
    NotFound {
        /// Requested latitude.
        latitude: f64,
        /// Requested longitude.
        longitude: f64,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The configured service is switched off.
    #[error("Geocoding service {id} is disabled")]
    Disabled {
        /// Identifier of the disabled service.
        id: String,
    },

    /// The embedded service configuration is invalid.
    #[error("Invalid geocoding service config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Resolves coordinates to an address.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Looks up the address at `latitude`, `longitude`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider cannot be reached or its
    /// response cannot be parsed.
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ResolvedAddress, GeocodeError>;
}
