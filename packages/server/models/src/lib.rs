#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the `EcoRoad` server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the storage and simulation types so the API contract can evolve
//! independently.

use std::ops::RangeInclusive;

use ecoroad_geocoder::ResolvedAddress;
use ecoroad_report_models::{LengthUnit, Report, TIMESTAMP_FORMAT};
use ecoroad_simulation::{SimulationParams, SimulationResult};
use serde::{Deserialize, Serialize};

/// Accepted grid sizes for `/api/simulate`.
pub const GRID_SIZE_RANGE: RangeInclusive<usize> = 50..=300;
/// Accepted pothole counts for `/api/simulate`.
pub const NUM_POTHOLES_RANGE: RangeInclusive<usize> = 1..=300;
/// Accepted selling and manufacturing rates for `/api/simulate`.
pub const RATE_RANGE: RangeInclusive<f64> = 1.0..=100.0;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
    /// Individual problems, when there is more than one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl ApiError {
    /// Error body with a single message and no issue list.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            issues: Vec::new(),
        }
    }
}

/// A stored report as returned by the API.
///
/// Photo bytes are not inlined; `image_url` points at the image endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReport {
    /// Storage serial number.
    pub id: i64,
    /// Reporter's email address.
    pub email: String,
    /// Reporter's phone number.
    pub phone: String,
    /// Full display address from the reverse geocoder.
    pub address: Option<String>,
    /// Decimal degrees.
    pub latitude: f64,
    /// Decimal degrees.
    pub longitude: f64,
    /// Postal code, when the geocoder returned one.
    pub postcode: Option<String>,
    /// City, town, or the nearest named locality.
    pub city: Option<String>,
    /// State or region.
    pub state: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Stored image file name, `{lat}-{lon}.jpg`.
    pub image_name: Option<String>,
    /// Path of the image endpoint for this report.
    pub image_url: String,
    /// Breadth in meters.
    pub breadth: f64,
    /// Length in meters.
    pub length: f64,
    /// Depth in meters.
    pub depth: f64,
    /// Workflow status code; `s` for submitted.
    pub status: String,
    /// Submission time, `YYYY-MM-DD HH:MM:SS`.
    pub created_at: Option<String>,
}

/// Path of the image endpoint for report `id`.
#[must_use]
pub fn image_url(id: i64) -> String {
    format!("/api/reports/{id}/image")
}

impl From<Report> for ApiReport {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            email: report.contact.email,
            phone: report.contact.phone,
            address: report.address.display_name,
            latitude: report.coordinates.latitude,
            longitude: report.coordinates.longitude,
            postcode: report.address.postcode,
            city: report.address.city,
            state: report.address.state,
            country: report.address.country,
            image_name: report.image_name,
            image_url: image_url(report.id),
            breadth: report.dimensions.breadth,
            length: report.dimensions.length,
            depth: report.dimensions.depth,
            status: report.status.code().to_string(),
            created_at: report
                .created_at
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

/// Query parameters for `POST /api/reports`. The request body is the photo.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportParams {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Latitude from the browser's geolocation.
    pub lat: Option<f64>,
    /// Longitude from the browser's geolocation.
    pub lon: Option<f64>,
    /// Unit the measurements are in; feet when omitted.
    #[serde(default)]
    pub unit: LengthUnit,
    #[serde(default)]
    pub breadth: f64,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub depth: f64,
}

/// Resolved address as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAddress {
    /// Full formatted address.
    pub display_name: String,
    /// Latitude the address was resolved for.
    pub latitude: f64,
    /// Longitude the address was resolved for.
    pub longitude: f64,
    /// Postal code, if known.
    pub postcode: Option<String>,
    /// Most specific named place, or `"Unknown"`.
    pub locality: String,
    /// State or region, if known.
    pub region: Option<String>,
    /// Country, if known.
    pub country: Option<String>,
}

impl From<ResolvedAddress> for ApiAddress {
    fn from(address: ResolvedAddress) -> Self {
        Self {
            display_name: address.display_name,
            latitude: address.latitude,
            longitude: address.longitude,
            postcode: address.postcode,
            locality: address.locality,
            region: address.region,
            country: address.country,
        }
    }
}

/// Response to a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSubmittedReport {
    pub id: i64,
    pub address: ApiAddress,
    pub image_path: String,
    /// Breadth in meters.
    pub breadth: f64,
    /// Length in meters.
    pub length: f64,
    /// Depth in meters.
    pub depth: f64,
}

/// Query parameters for the map page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapQueryParams {
    /// Report whose details panel is open.
    pub selected: Option<i64>,
}

/// Query parameters for `GET /api/geocode/reverse`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseGeocodeParams {
    pub lat: f64,
    pub lon: f64,
}

/// Query parameters for `GET /api/simulate` and the simulator page.
///
/// Missing values fall back to the slider defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationQueryParams {
    pub grid_size: Option<usize>,
    pub num_potholes: Option<usize>,
    pub selling_rate: Option<f64>,
    pub manufacturing_rate: Option<f64>,
    /// Fixes the random draws; the server default applies when omitted.
    pub seed: Option<u64>,
}

impl SimulationQueryParams {
    /// Fills in defaults and checks every value against its slider range.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first out-of-range parameter.
    pub fn resolve(&self) -> Result<SimulationParams, String> {
        let defaults = SimulationParams::default();
        let params = SimulationParams {
            grid_size: self.grid_size.unwrap_or(defaults.grid_size),
            num_potholes: self.num_potholes.unwrap_or(defaults.num_potholes),
            selling_rate: self.selling_rate.unwrap_or(defaults.selling_rate),
            manufacturing_rate: self
                .manufacturing_rate
                .unwrap_or(defaults.manufacturing_rate),
        };

        if !GRID_SIZE_RANGE.contains(&params.grid_size) {
            return Err(format!(
                "gridSize must be between {} and {}",
                GRID_SIZE_RANGE.start(),
                GRID_SIZE_RANGE.end()
            ));
        }
        if !NUM_POTHOLES_RANGE.contains(&params.num_potholes) {
            return Err(format!(
                "numPotholes must be between {} and {}",
                NUM_POTHOLES_RANGE.start(),
                NUM_POTHOLES_RANGE.end()
            ));
        }
        for (name, rate) in [
            ("sellingRate", params.selling_rate),
            ("manufacturingRate", params.manufacturing_rate),
        ] {
            if !RATE_RANGE.contains(&rate) {
                return Err(format!(
                    "{name} must be between {} and {}",
                    RATE_RANGE.start(),
                    RATE_RANGE.end()
                ));
            }
        }

        Ok(params)
    }
}

/// Simulation output as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSimulation {
    pub params: SimulationParams,
    pub seed: Option<u64>,
    /// Sample positions along each axis, in centimeters.
    pub coords: Vec<f64>,
    /// Smoothed surface, one row per `y` sample.
    pub surface: Vec<Vec<f64>>,
    /// Centimeters.
    pub bounding_length: f64,
    /// Centimeters.
    pub bounding_width: f64,
    /// Centimeters.
    pub max_depth: f64,
    /// Cubic centimeters.
    pub original_volume: f64,
    /// Smoothed volume after scaling, cubic centimeters.
    pub scaled_volume: f64,
    /// Unscaled pricing cuboid, cubic centimeters.
    pub cuboid_volume: f64,
    /// Scaled cuboid, cubic centimeters.
    pub scaled_cuboid_volume: f64,
    /// Share of the scaled cuboid left empty, `0..=100`.
    pub waste_percent: Option<f64>,
    pub selling_price: f64,
    pub manufacturing_price: f64,
    pub profit: f64,
    /// Profit as a percentage of the selling price.
    pub margin_percent: f64,
}

impl From<&SimulationResult> for ApiSimulation {
    fn from(result: &SimulationResult) -> Self {
        let size = result.smoothed.size();
        Self {
            params: result.params,
            seed: result.seed,
            coords: result.smoothed.coords().to_vec(),
            surface: result
                .smoothed
                .cells()
                .chunks(size.max(1))
                .map(<[f64]>::to_vec)
                .collect(),
            bounding_length: result.bounding_length,
            bounding_width: result.bounding_width,
            max_depth: result.max_depth,
            original_volume: result.original_volume,
            scaled_volume: result.scaled_volume,
            cuboid_volume: result.cuboid.volume(),
            scaled_cuboid_volume: result.scaled_cuboid.volume(),
            waste_percent: result.waste_percent,
            selling_price: result.costs.selling_price,
            manufacturing_price: result.costs.manufacturing_price,
            profit: result.costs.profit,
            margin_percent: result.costs.margin_percent,
        }
    }
}
