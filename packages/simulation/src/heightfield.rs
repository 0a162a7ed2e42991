//! Square grid of surface heights.

use serde::Serialize;

/// Returns `n` evenly spaced values from `start` to `end`, inclusive.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// A square heightfield sampled on the same coordinates along both axes.
///
/// Cells are stored row-major: `row` indexes the y axis, `col` the x axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heightfield {
    coords: Vec<f64>,
    cells: Vec<f64>,
}

impl Heightfield {
    /// Creates a flat (all-zero) field over `coords` × `coords`.
    #[must_use]
    pub fn flat(coords: Vec<f64>) -> Self {
        let cells = vec![0.0; coords.len() * coords.len()];
        Self { coords, cells }
    }

    /// Cells per axis.
    #[must_use]
    pub fn size(&self) -> usize {
        self.coords.len()
    }

    /// Axis coordinates.
    #[must_use]
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Distance between neighbouring samples.
    #[must_use]
    pub fn spacing(&self) -> f64 {
        match self.coords.as_slice() {
            [a, b, ..] => (b - a).abs(),
            _ => 0.0,
        }
    }

    /// Distance between the first and last sample.
    #[must_use]
    pub fn extent(&self) -> f64 {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Height at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.size() + col]
    }

    /// Mutable height at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        let size = self.size();
        &mut self.cells[row * size + col]
    }

    /// All heights, row-major.
    #[must_use]
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Visits every cell with its `(x, y)` position.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(f64, f64, &mut f64)) {
        let size = self.size();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            let x = self.coords[i % size];
            let y = self.coords[i / size];
            f(x, y, cell);
        }
    }

    /// Lowest height, capped at the zero level (`0.0` for an empty field).
    #[must_use]
    pub fn min(&self) -> f64 {
        self.cells.iter().copied().fold(0.0, f64::min)
    }

    /// Riemann-sum volume between the surface and the zero level.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let spacing = self.spacing();
        self.cells.iter().map(|h| h.abs()).sum::<f64>() * spacing * spacing
    }

    /// Builds a field with the same coordinates from a row-major cell list.
    pub(crate) fn with_cells(&self, cells: Vec<f64>) -> Self {
        debug_assert_eq!(cells.len(), self.cells.len());
        Self {
            coords: self.coords.clone(),
            cells,
        }
    }
}
