#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Synthetic pothole surface simulation.
//!
//! Builds an uneven pothole from superimposed Gaussian depressions plus
//! noise, smooths it, and derives its dimensions, volume, and the cost of
//! filling its bounding cuboid with paving blocks.
//!
//! Lengths are centimeters and volumes cubic centimeters throughout; only
//! the cost step converts to meters.

pub mod config;
pub mod cost;
pub mod heightfield;
pub mod smoothing;

use ecoroad_report_models::round_to;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::SimulationConfig;
pub use cost::{CostEstimate, Cuboid, estimate_costs};
pub use heightfield::Heightfield;

/// Errors from invalid simulation inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// The grid needs at least two samples per axis to have a spacing.
    #[error("grid size must be at least 2, got {0}")]
    GridTooSmall(usize),

    /// At least one depression is required.
    #[error("number of potholes must be at least 1")]
    NoPotholes,

    /// A price rate is zero, negative, or not a number.
    #[error("{name} rate must be a positive number, got {value}")]
    InvalidRate {
        /// Which rate.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A [`SimulationConfig`] field is out of range.
    #[error("invalid simulation config: {message}")]
    InvalidConfig {
        /// Description of the bad field.
        message: String,
    },
}

/// User-chosen inputs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    /// Samples per axis.
    pub grid_size: usize,
    /// Number of Gaussian depressions.
    pub num_potholes: usize,
    /// Selling price, thousands per cubic meter.
    pub selling_rate: f64,
    /// Manufacturing price, thousands per cubic meter.
    pub manufacturing_rate: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            grid_size: 100,
            num_potholes: 5,
            selling_rate: 40.0,
            manufacturing_rate: 27.0,
        }
    }
}

/// One Gaussian depression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Depression {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Depth at the center.
    pub depth: f64,
    /// Gaussian sigma.
    pub width: f64,
}

impl Depression {
    /// Height contribution at (`x`, `y`); always `<= 0`.
    #[must_use]
    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        let distance_sq = (x - self.x).powi(2) + (y - self.y).powi(2);
        -self.depth * (-distance_sq / (2.0 * self.width.powi(2))).exp()
    }
}

/// Output of [`simulate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Inputs this result was produced from.
    pub params: SimulationParams,
    /// Seed used, if the run was seeded.
    pub seed: Option<u64>,
    /// Depressions that were drawn.
    pub depressions: Vec<Depression>,
    /// Clamped surface before smoothing.
    pub raw: Heightfield,
    /// Surface after smoothing.
    pub smoothed: Heightfield,
    /// Extent along x.
    pub bounding_length: f64,
    /// Extent along y.
    pub bounding_width: f64,
    /// Deepest point of the smoothed surface, rounded to two decimals.
    pub max_depth: f64,
    /// Riemann-sum volume of the raw surface.
    pub original_volume: f64,
    /// Riemann-sum volume of the smoothed surface after applying
    /// [`SimulationConfig::scale_factor`] to every axis.
    pub scaled_volume: f64,
    /// Bounding box used for pricing.
    pub cuboid: Cuboid,
    /// [`Self::cuboid`] with every side multiplied by the scale factor.
    pub scaled_cuboid: Cuboid,
    /// Share of the scaled cuboid not occupied by the scaled pothole, or
    /// `None` when the cuboid is empty.
    ///
    /// Floored at zero: on coarse grids the Riemann sum can overshoot the
    /// bounding cuboid.
    pub waste_percent: Option<f64>,
    /// Paving block prices.
    pub costs: CostEstimate,
}

/// Runs one simulation.
///
/// # Errors
///
/// Returns [`SimulationError`] if `params` or `config` are out of range.
pub fn simulate(
    params: &SimulationParams,
    config: &SimulationConfig,
) -> Result<SimulationResult, SimulationError> {
    config.validate()?;
    if params.grid_size < 2 {
        return Err(SimulationError::GridTooSmall(params.grid_size));
    }
    if params.num_potholes == 0 {
        return Err(SimulationError::NoPotholes);
    }

    let mut rng = config.rng();
    let depressions = draw_depressions(&mut rng, params.num_potholes, config);

    let half = config.span / 2.0;
    let mut raw = Heightfield::flat(heightfield::linspace(-half, half, params.grid_size));

    raw.for_each_mut(|x, y, h| {
        *h = depressions.iter().map(|d| d.height_at(x, y)).sum();
    });

    raw.for_each_mut(|x, y, h| {
        let noise = (rng.r#gen::<f64>() - 0.5) * config.noise_amplitude;
        *h += noise * (-config.noise_falloff * (x * x + y * y)).exp();
        *h = h.min(0.0);
    });

    let smoothed =
        smoothing::gaussian_filter(&raw, config.smoothing_sigma, config.smoothing_truncate);

    let bounding_length = raw.extent();
    let bounding_width = raw.extent();
    let max_depth = round_to(smoothed.min().abs(), 2);
    let original_volume = raw.volume();

    // Heights and both cell sides shrink by the same factor.
    let sf = config.scale_factor;
    let scaled_volume = smoothed.volume() * sf.powi(3);

    let cuboid = Cuboid {
        depth: max_depth,
        width: bounding_width,
        length: bounding_length,
    };
    let scaled_cuboid = cuboid.scaled(sf);
    let waste_percent = waste_percent(&scaled_cuboid, scaled_volume);

    let costs = estimate_costs(&cuboid, params.selling_rate, params.manufacturing_rate)?;

    log::debug!(
        "Simulated {} potholes on a {}x{} grid: depth {max_depth} cm, volume {original_volume:.2} cm3",
        params.num_potholes,
        params.grid_size,
        params.grid_size,
    );

    Ok(SimulationResult {
        params: *params,
        seed: config.seed,
        depressions,
        raw,
        smoothed,
        bounding_length,
        bounding_width,
        max_depth,
        original_volume,
        scaled_volume,
        cuboid,
        scaled_cuboid,
        waste_percent,
        costs,
    })
}

fn waste_percent(cuboid: &Cuboid, volume: f64) -> Option<f64> {
    let cuboid_volume = cuboid.volume();
    (cuboid_volume > 0.0)
        .then(|| round_to(((cuboid_volume - volume) / cuboid_volume * 100.0).max(0.0), 2))
}

/// Draws all centers first, then all depths, then all widths.
fn draw_depressions(
    rng: &mut impl Rng,
    count: usize,
    config: &SimulationConfig,
) -> Vec<Depression> {
    let range = config.center_range;
    let centers: Vec<(f64, f64)> = (0..count)
        .map(|_| (rng.gen_range(-range..=range), rng.gen_range(-range..=range)))
        .collect();
    let (dmin, dmax) = config.depth_range;
    let depths: Vec<f64> = (0..count).map(|_| rng.gen_range(dmin..=dmax)).collect();
    let (wmin, wmax) = config.width_range;
    let widths: Vec<f64> = (0..count).map(|_| rng.gen_range(wmin..=wmax)).collect();

    centers
        .into_iter()
        .zip(depths)
        .zip(widths)
        .map(|(((x, y), depth), width)| Depression {
            x,
            y,
            depth,
            width,
        })
        .collect()
}
