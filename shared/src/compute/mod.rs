//! Boundary contract between the scheduler and the flux kernels.
//!
//! A compute stage is a pure function of its inputs: it reads a complete
//! prior state, writes one complete output grid and keeps nothing between
//! calls. The numerical method lives entirely behind this trait, so a GPU
//! backend and the CPU reference kernel are interchangeable.

mod maccormack;
mod uniforms;

pub use maccormack::MacCormackStage;
pub use uniforms::{PhysicsUniforms, StageUniforms, TickUniforms};

use thiserror::Error;

use crate::grid::{DualGridSet, SimulationGrid};

/// The two phases of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputePass {
    Predict,
    Correct,
}

impl std::fmt::Display for ComputePass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputePass::Predict => write!(f, "predict"),
            ComputePass::Correct => write!(f, "correct"),
        }
    }
}

/// Read-only inputs of one compute pass.
#[derive(Debug, Clone, Copy)]
pub struct ComputeInput<'a> {
    pub pass: ComputePass,
    /// State read from the scheduler's read slot.
    pub previous: &'a DualGridSet,
    /// The freshly seeded initial condition.
    pub initial: &'a DualGridSet,
    pub uniforms: StageUniforms,
}

impl<'a> ComputeInput<'a> {
    /// The state this pass must read.
    ///
    /// The predictor of the very first tick has no previous tick to read
    /// from and starts from the seeded initial condition instead.
    pub fn source(&self) -> &'a DualGridSet {
        if self.pass == ComputePass::Predict && self.uniforms.is_first_pass() {
            self.initial
        } else {
            self.previous
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.previous.dimensions()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeStageError {
    #[error("output grid is {actual:?} but the input is {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("compute resources exhausted: {0}")]
    ResourceExhausted(String),

    #[error("compute backend failed: {0}")]
    Backend(String),
}

/// A swappable flux kernel.
pub trait ComputeStage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Runs `input.pass` and writes every cell of `output`.
    ///
    /// `output` may hold arbitrary stale data on entry. On error the
    /// scheduler discards whatever was written.
    fn run(&self, input: &ComputeInput<'_>, output: &mut SimulationGrid) -> Result<(), ComputeStageError>;
}

/// Checks that `output` matches the input dimensions.
pub fn ensure_same_dimensions(
    input: &ComputeInput<'_>,
    output: &SimulationGrid,
) -> Result<(), ComputeStageError> {
    let expected = input.dimensions();
    let actual = output.dimensions();
    if expected != actual || input.initial.dimensions() != expected {
        return Err(ComputeStageError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GaussianPulse;
    use crate::params::SimulationParams;

    #[test]
    fn test_first_predict_reads_initial_condition() {
        let initial = DualGridSet::seeded(8, 8, &GaussianPulse::default()).unwrap();
        let previous = DualGridSet::zeroed(8, 8).unwrap();
        let params = SimulationParams::default();

        let first = ComputeInput {
            pass: ComputePass::Predict,
            previous: &previous,
            initial: &initial,
            uniforms: StageUniforms::new(&params, (8, 8), true),
        };
        assert!(std::ptr::eq(first.source(), &initial));

        let correct = ComputeInput {
            pass: ComputePass::Correct,
            ..first
        };
        assert!(std::ptr::eq(correct.source(), &previous));

        let later = ComputeInput {
            uniforms: StageUniforms::new(&params, (8, 8), false),
            ..first
        };
        assert!(std::ptr::eq(later.source(), &previous));
    }

    #[test]
    fn test_dimension_check() {
        let initial = DualGridSet::zeroed(4, 4).unwrap();
        let input = ComputeInput {
            pass: ComputePass::Predict,
            previous: &initial,
            initial: &initial,
            uniforms: StageUniforms::new(&SimulationParams::default(), (4, 4), false),
        };
        let wrong = SimulationGrid::zeroed(4, 5).unwrap();
        assert_eq!(
            ensure_same_dimensions(&input, &wrong),
            Err(ComputeStageError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 5)
            })
        );
        let right = SimulationGrid::zeroed(4, 4).unwrap();
        assert!(ensure_same_dimensions(&input, &right).is_ok());
    }
}
