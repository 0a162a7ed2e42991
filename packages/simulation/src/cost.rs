//! Paving block cost estimate for a pothole's bounding cuboid.
//!
//! Rates are in thousands of currency per cubic meter, as entered on the
//! simulator sliders.

use ecoroad_report_models::round_to;
use serde::{Deserialize, Serialize};

use crate::SimulationError;

const CM_PER_M: f64 = 100.0;
const RATE_SCALE: f64 = 1000.0;

/// The box enclosing a pothole, in centimeters.
///
/// Used as the amount of material to cast; it over-estimates the true
/// excavated volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    /// Depth.
    pub depth: f64,
    /// Width ("height" on the plan view).
    pub width: f64,
    /// Length.
    pub length: f64,
}

impl Cuboid {
    /// Volume in cubic centimeters.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.depth * self.width * self.length
    }

    /// Returns this cuboid with every side multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            depth: self.depth * factor,
            width: self.width * factor,
            length: self.length * factor,
        }
    }

    /// Volume in cubic meters.
    #[must_use]
    pub fn volume_m3(&self) -> f64 {
        (self.depth / CM_PER_M) * (self.width / CM_PER_M) * (self.length / CM_PER_M)
    }
}

/// Prices for filling one cuboid with paving blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Total selling price.
    pub selling_price: f64,
    /// Total manufacturing price.
    pub manufacturing_price: f64,
    /// `selling_price - manufacturing_price`.
    pub profit: f64,
    /// Profit as a percentage of the selling price.
    pub margin_percent: f64,
}

/// Prices `cuboid` at the given per-cubic-meter rates.
///
/// Each total is rounded to two decimals before profit and margin are
/// derived from it.
///
/// # Errors
///
/// Returns [`SimulationError::InvalidRate`] if either rate is not a
/// positive finite number.
pub fn estimate_costs(
    cuboid: &Cuboid,
    selling_rate: f64,
    manufacturing_rate: f64,
) -> Result<CostEstimate, SimulationError> {
    check_rate("selling", selling_rate)?;
    check_rate("manufacturing", manufacturing_rate)?;

    let volume = cuboid.volume_m3();
    let selling_price = round_to(volume * selling_rate * RATE_SCALE, 2);
    let manufacturing_price = round_to(volume * manufacturing_rate * RATE_SCALE, 2);
    let profit = round_to(selling_price - manufacturing_price, 2);

    let margin_percent = if selling_price.abs() < f64::EPSILON {
        0.0
    } else {
        round_to(profit / selling_price * 100.0, 2)
    };

    Ok(CostEstimate {
        selling_price,
        manufacturing_price,
        profit,
        margin_percent,
    })
}

fn check_rate(name: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidRate { name, value })
    }
}
