//! Separable Gaussian blur with mirrored edges.
//!
//! Edge samples are reflected about the cell boundary
//! (`d c b a | a b c d | d c b a`), and the kernel is cut off at
//! `truncate` standard deviations.

use crate::heightfield::Heightfield;

/// Builds a normalized 1-D Gaussian kernel of radius
/// `round(truncate * sigma)`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5).floor().max(0.0) as usize;
    let weights: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let offset = i as f64 - radius as f64;
            (-0.5 * (offset / sigma).powi(2)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Maps a possibly out-of-range index onto `0..n` by mirroring.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
const fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let m = i.rem_euclid(period);
    if m >= n {
        (period - 1 - m) as usize
    } else {
        m as usize
    }
}

/// Blurs `field` with a Gaussian of `sigma` cells.
///
/// A non-positive `sigma` returns the field unchanged.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn gaussian_filter(field: &Heightfield, sigma: f64, truncate: f64) -> Heightfield {
    let n = field.size();
    if sigma <= 0.0 || n == 0 {
        return field.clone();
    }

    let kernel = gaussian_kernel(sigma, truncate);
    let radius = (kernel.len() / 2) as isize;

    let convolve = |source: &[f64], horizontal: bool| -> Vec<f64> {
        let mut out = vec![0.0; n * n];
        for row in 0..n {
            for col in 0..n {
                out[row * n + col] = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, w)| {
                        let offset = k as isize - radius;
                        let (r, c) = if horizontal {
                            (row, reflect_index(col as isize + offset, n))
                        } else {
                            (reflect_index(row as isize + offset, n), col)
                        };
                        w * source[r * n + c]
                    })
                    .sum();
            }
        }
        out
    };

    let pass = convolve(field.cells(), true);
    field.with_cells(convolve(&pass, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::linspace;

    #[test]
    fn kernel_is_normalized_and_sized() {
        let kernel = gaussian_kernel(2.0, 4.0);
        assert_eq!(kernel.len(), 17);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((kernel[0] - kernel[16]).abs() < f64::EPSILON);
        assert!(kernel[8] > kernel[7]);
    }

    #[test]
    fn reflects_about_edges() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(2, 4), 2);
        // Radius larger than the grid keeps folding.
        assert_eq!(reflect_index(9, 4), 1);
        assert_eq!(reflect_index(-9, 2), 0);
    }

    #[test]
    fn constant_field_is_unchanged() {
        let mut field = Heightfield::flat(linspace(-1.0, 1.0, 5));
        field.for_each_mut(|_, _, h| *h = -3.0);
        let blurred = gaussian_filter(&field, 2.0, 4.0);
        for h in blurred.cells() {
            assert!((h + 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn spike_spreads_and_keeps_mass() {
        let mut field = Heightfield::flat(linspace(0.0, 1.0, 21));
        *field.get_mut(10, 10) = -1.0;
        let blurred = gaussian_filter(&field, 2.0, 4.0);
        let total: f64 = blurred.cells().iter().sum();
        assert!((total + 1.0).abs() < 1e-9);
        assert!(blurred.get(10, 10) > -1.0);
        assert!(blurred.get(10, 11) < 0.0);
    }

    #[test]
    fn zero_sigma_is_identity() {
        let mut field = Heightfield::flat(linspace(0.0, 1.0, 3));
        *field.get_mut(1, 1) = -1.0;
        assert_eq!(gaussian_filter(&field, 0.0, 4.0), field);
    }
}
