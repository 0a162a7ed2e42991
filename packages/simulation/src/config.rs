//! Simulation constants.
//!
//! All lengths are centimeters. The defaults describe a 50 cm square patch
//! of road with depressions centered in its middle 30 cm.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::SimulationError;

/// Environment variable holding a fixed RNG seed.
pub const SEED_ENV: &str = "ECOROAD_SIM_SEED";

/// Fixed parameters of the synthetic surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Side length of the square patch.
    pub span: f64,
    /// Depression centers are drawn from `[-center_range, center_range]`
    /// on both axes.
    pub center_range: f64,
    /// Inclusive range of depression depths.
    pub depth_range: (f64, f64),
    /// Inclusive range of depression widths (Gaussian sigma).
    pub width_range: (f64, f64),
    /// Peak-to-peak amplitude of the bottom noise.
    pub noise_amplitude: f64,
    /// Decay rate of the noise envelope `exp(-falloff * (x² + y²))`.
    pub noise_falloff: f64,
    /// Smoothing sigma, in cells.
    pub smoothing_sigma: f64,
    /// Kernel cut-off, in sigmas.
    pub smoothing_truncate: f64,
    /// Shrink applied to every axis of the smoothed surface and its
    /// bounding box before the waste share is measured. Pricing uses the
    /// unscaled box.
    pub scale_factor: f64,
    /// RNG seed; `None` draws fresh entropy every run.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            span: 50.0,
            center_range: 15.0,
            depth_range: (1.5, 3.5),
            width_range: (8.0, 15.0),
            noise_amplitude: 0.8,
            noise_falloff: 0.5,
            smoothing_sigma: 2.0,
            smoothing_truncate: 4.0,
            scale_factor: 0.95,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Returns a copy with the seed fixed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Default config with the seed taken from [`SEED_ENV`], if set.
    ///
    /// An unparsable value is logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let seed = std::env::var(SEED_ENV).ok().and_then(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|e| log::warn!("Ignoring {SEED_ENV}={v:?}: {e}"))
                .ok()
        });
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Checks that every range is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfig`] describing the first bad
    /// field.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |message: &str| {
            Err(SimulationError::InvalidConfig {
                message: message.to_string(),
            })
        };

        if !(self.span.is_finite() && self.span > 0.0) {
            return invalid("span must be positive");
        }
        if !(self.center_range.is_finite() && self.center_range >= 0.0) {
            return invalid("center_range must be non-negative");
        }
        let (dmin, dmax) = self.depth_range;
        if !(dmin.is_finite() && dmax.is_finite() && 0.0 <= dmin && dmin <= dmax) {
            return invalid("depth_range must satisfy 0 <= min <= max");
        }
        let (wmin, wmax) = self.width_range;
        if !(wmin.is_finite() && wmax.is_finite() && 0.0 < wmin && wmin <= wmax) {
            return invalid("width_range must satisfy 0 < min <= max");
        }
        if !(self.noise_amplitude.is_finite() && self.noise_amplitude >= 0.0) {
            return invalid("noise_amplitude must be non-negative");
        }
        if !(self.smoothing_sigma.is_finite() && self.smoothing_sigma >= 0.0) {
            return invalid("smoothing_sigma must be non-negative");
        }
        if !(self.smoothing_truncate.is_finite() && self.smoothing_truncate >= 0.0) {
            return invalid("smoothing_truncate must be non-negative");
        }
        let sf = self.scale_factor;
        if !(sf.is_finite() && 0.0 < sf && sf <= 1.0) {
            return invalid("scale_factor must be in (0, 1]");
        }
        Ok(())
    }

    /// Creates the RNG for one run.
    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        self.seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn default_is_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_inverted_ranges() {
        let config = SimulationConfig {
            width_range: (5.0, 1.0),
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig { .. })
        ));

        let config = SimulationConfig {
            width_range: (0.0, 1.0),
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_scale_factor() {
        for scale_factor in [0.0, -0.5, 1.5, f64::NAN] {
            let config = SimulationConfig {
                scale_factor,
                ..SimulationConfig::default()
            };
            assert!(config.validate().is_err(), "{scale_factor}");
        }
    }

    #[test]
    fn seed_from_environment() {
        // SAFETY: no other test in this crate reads or writes this variable.
        unsafe { std::env::set_var(SEED_ENV, " 42 ") };
        assert_eq!(SimulationConfig::from_env().seed, Some(42));

        // SAFETY: as above.
        unsafe { std::env::set_var(SEED_ENV, "abc") };
        let config = SimulationConfig::from_env();
        assert_eq!(config.seed, None);
        assert_eq!(config, SimulationConfig::default());

        // SAFETY: as above.
        unsafe { std::env::remove_var(SEED_ENV) };
        assert_eq!(SimulationConfig::from_env().seed, None);
    }

    #[test]
    fn seeded_rng_repeats() {
        let config = SimulationConfig::default().with_seed(50);
        let a: Vec<u32> = (0..4).map(|_| config.rng().r#gen()).collect();
        let b: u32 = config.rng().r#gen();
        assert!(a.iter().all(|v| *v == b));
    }
}
