//! Physical parameters and startup configuration.
//!
//! Everything here is set once at initialisation. Nothing is checked for
//! numerical stability: a time step that is too large for the grid spacing
//! produces a diverging surface, not an error.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::*;
use crate::grid::GaussianPulse;

/// Process-wide physical parameters handed to every compute pass.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Gravitational acceleration.
    pub gravity: f32,
    /// Manning-style bed roughness.
    pub friction: f32,
    /// Fixed simulation step, in seconds.
    pub time_step: f32,
    /// Cell size, in length units per cell.
    pub spatial_step: f32,
    /// Fraction of the normal discharge reflected at the domain edges.
    pub restitution: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            friction: DEFAULT_FRICTION,
            time_step: DEFAULT_TIME_STEP,
            spatial_step: DEFAULT_SPATIAL_STEP,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

impl SimulationParams {
    /// The `Δt/Δx` ratio used by the flux computation.
    #[inline]
    pub fn dt_dx(&self) -> f32 {
        self.time_step / self.spatial_step
    }

    /// The fixed step as a wall-clock duration. A step too large to
    /// represent saturates, so such a simulation simply never ticks.
    pub fn step_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.time_step.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Settings of the CPU reference compute stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceKernelConfig {
    /// Still-water depth that cell heights are measured against.
    pub rest_depth: f32,
    /// Depth floor used when dividing by depth.
    pub min_depth: f32,
}

impl Default for ReferenceKernelConfig {
    fn default() -> Self {
        Self {
            rest_depth: DEFAULT_REST_DEPTH,
            min_depth: DEFAULT_MIN_DEPTH,
        }
    }
}

/// Complete startup configuration of a surface simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid_size_x: usize,
    pub grid_size_y: usize,
    pub pulse: GaussianPulse,
    pub params: SimulationParams,
    /// Most ticks run in one frame. `None` lets the integrator catch up on
    /// any backlog in a single frame.
    pub max_ticks_per_frame: Option<u32>,
    pub reference_kernel: ReferenceKernelConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size_x: DEFAULT_GRID_SIZE,
            grid_size_y: DEFAULT_GRID_SIZE,
            pulse: GaussianPulse::default(),
            params: SimulationParams::default(),
            max_ticks_per_frame: Some(DEFAULT_MAX_TICKS_PER_FRAME),
            reference_kernel: ReferenceKernelConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// A square grid with otherwise default settings.
    pub fn square(size: usize) -> Self {
        Self {
            grid_size_x: size,
            grid_size_y: size,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_setup() {
        let config = SimulationConfig::default();
        assert_eq!(config.grid_size_x, 660);
        assert_eq!(config.grid_size_y, 660);
        assert_eq!(config.params.gravity, 9.8);
        assert_eq!(config.params.friction, 0.9);
        assert_eq!(config.params.time_step, 0.001);
        assert_eq!(config.params.spatial_step, 0.2);
    }

    #[test]
    fn test_dt_dx_is_derived() {
        let params = SimulationParams {
            time_step: 0.01,
            spatial_step: 0.5,
            ..Default::default()
        };
        assert!((params.dt_dx() - 0.02).abs() < 1e-7);
    }

    #[test]
    fn test_step_duration() {
        let params = SimulationParams {
            time_step: 0.25,
            ..Default::default()
        };
        assert_eq!(params.step_duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_step_duration_saturates() {
        for time_step in [f32::INFINITY, 1e30] {
            let params = SimulationParams {
                time_step,
                ..Default::default()
            };
            assert_eq!(params.step_duration(), Duration::MAX);
        }

        let params = SimulationParams {
            time_step: f32::NAN,
            ..Default::default()
        };
        assert_eq!(params.step_duration(), Duration::ZERO);
    }
}
