//! Parameter blocks handed to a compute pass.
//!
//! These are laid out for direct upload as two 16-byte uniform buffers, the
//! same way the wave parameters are packed for the water shader.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::params::SimulationParams;

/// Per-pass grid and timing values.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct TickUniforms {
    /// `Δt/Δx` ratio used by the flux differences.
    pub dt_dx: f32,
    pub grid_size_x: f32,
    pub grid_size_y: f32,
    /// 1.0 on the very first tick, 0.0 afterwards.
    pub first_pass: f32,
}

/// Physical constants of the update.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct PhysicsUniforms {
    pub gravity: f32,
    pub friction: f32,
    pub time_step: f32,
    pub restitution: f32,
}

/// Everything a compute pass receives besides the grids themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageUniforms {
    pub tick: TickUniforms,
    pub physics: PhysicsUniforms,
}

impl StageUniforms {
    pub fn new(params: &SimulationParams, dimensions: (usize, usize), first_pass: bool) -> Self {
        Self {
            tick: TickUniforms {
                dt_dx: params.dt_dx(),
                grid_size_x: dimensions.0 as f32,
                grid_size_y: dimensions.1 as f32,
                first_pass: if first_pass { 1.0 } else { 0.0 },
            },
            physics: PhysicsUniforms {
                gravity: params.gravity,
                friction: params.friction,
                time_step: params.time_step,
                restitution: params.restitution,
            },
        }
    }

    #[inline]
    pub fn is_first_pass(&self) -> bool {
        self.tick.first_pass > 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_blocks_are_16_bytes() {
        assert_eq!(std::mem::size_of::<TickUniforms>(), 16);
        assert_eq!(std::mem::size_of::<PhysicsUniforms>(), 16);
    }

    #[test]
    fn test_marshalling_from_params() {
        let params = SimulationParams {
            gravity: 9.8,
            friction: 0.9,
            time_step: 0.001,
            spatial_step: 0.2,
            restitution: 0.5,
        };
        let uniforms = StageUniforms::new(&params, (660, 330), true);

        assert!((uniforms.tick.dt_dx - 0.005).abs() < 1e-7);
        assert_eq!(uniforms.tick.grid_size_x, 660.0);
        assert_eq!(uniforms.tick.grid_size_y, 330.0);
        assert!(uniforms.is_first_pass());
        assert_eq!(uniforms.physics.restitution, 0.5);

        let later = StageUniforms::new(&params, (660, 330), false);
        assert!(!later.is_first_pass());
        assert_eq!(later.tick.first_pass, 0.0);
    }

    #[test]
    fn test_physics_bytes_follow_field_order() {
        let params = SimulationParams::default();
        let uniforms = StageUniforms::new(&params, (4, 4), false);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&uniforms.physics));
        assert_eq!(
            floats,
            &[params.gravity, params.friction, params.time_step, params.restitution]
        );
        assert_eq!(bytemuck::bytes_of(&uniforms.tick).len(), 16);
    }
}
