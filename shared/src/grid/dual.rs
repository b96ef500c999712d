use super::{GaussianPulse, GridError, SimulationGrid};

/// The predicted and corrected grids of one simulation state.
///
/// Both grids always share the same dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct DualGridSet {
    pub predicted: SimulationGrid,
    pub corrected: SimulationGrid,
}

impl DualGridSet {
    /// Both roles seeded with the same initial condition.
    pub fn seeded(size_x: usize, size_y: usize, pulse: &GaussianPulse) -> Result<Self, GridError> {
        let corrected = SimulationGrid::new(size_x, size_y, pulse)?;
        let mut predicted = SimulationGrid::zeroed(size_x, size_y)?;
        predicted.copy_from(&corrected);
        Ok(Self {
            predicted,
            corrected,
        })
    }

    pub fn zeroed(size_x: usize, size_y: usize) -> Result<Self, GridError> {
        Ok(Self {
            predicted: SimulationGrid::zeroed(size_x, size_y)?,
            corrected: SimulationGrid::zeroed(size_x, size_y)?,
        })
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        self.corrected.dimensions()
    }

    /// Copies both roles of `other` into `self`.
    pub fn copy_from(&mut self, other: &DualGridSet) {
        self.predicted.copy_from(&other.predicted);
        self.corrected.copy_from(&other.corrected);
    }
}
