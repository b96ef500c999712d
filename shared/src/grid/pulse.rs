//! Gaussian pulse initial condition.
//!
//! Models a dropped object: a round mound of water at the centre of the
//! domain that relaxes outward once the simulation starts.

use serde::{Deserialize, Serialize};

use super::{GridCell, SimulationGrid};
use crate::constants::{DEFAULT_PULSE_HEIGHT, PULSE_SPREAD_DIVISOR};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianPulse {
    /// Height of the pulse at its centre.
    pub max_height: f32,
}

impl Default for GaussianPulse {
    fn default() -> Self {
        Self {
            max_height: DEFAULT_PULSE_HEIGHT,
        }
    }
}

impl GaussianPulse {
    pub fn new(max_height: f32) -> Self {
        Self { max_height }
    }

    /// Centre cell of a `size_x` by `size_y` grid (integer division).
    pub fn center(size_x: usize, size_y: usize) -> (usize, usize) {
        (size_x / 2, size_y / 2)
    }

    /// Standard deviation of the pulse, in cells.
    pub fn spread(size_x: usize, size_y: usize) -> f32 {
        size_x.min(size_y) as f32 / PULSE_SPREAD_DIVISOR
    }

    /// Height of the pulse at cell `(x, y)`.
    pub fn height_at(&self, x: usize, y: usize, size_x: usize, size_y: usize) -> f32 {
        let (cx, cy) = Self::center(size_x, size_y);
        let sigma = Self::spread(size_x, size_y);
        let dx = x as f32 - cx as f32;
        let dy = y as f32 - cy as f32;
        let distance_squared = dx * dx + dy * dy;
        self.max_height * (-distance_squared / (2.0 * sigma * sigma)).exp()
    }

    /// Overwrites every cell of `grid` with the pulse. Discharge and
    /// bathymetry are reset to zero.
    pub fn apply(&self, grid: &mut SimulationGrid) {
        let (size_x, size_y) = grid.dimensions();
        for (y, row) in grid.rows_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = GridCell::with_height(self.height_at(x, y, size_x, size_y));
            }
        }
    }
}
