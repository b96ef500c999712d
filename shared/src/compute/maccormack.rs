//! CPU reference kernel: MacCormack predictor/corrector for the 2D shallow
//! water equations in conservative form.
//!
//! ```text
//! ∂d/∂t  + ∂qx/∂x              + ∂qy/∂y              = 0
//! ∂qx/∂t + ∂(qx²/d + gd²/2)/∂x + ∂(qx·qy/d)/∂y        = -gd ∂b/∂x - friction
//! ∂qy/∂t + ∂(qx·qy/d)/∂x       + ∂(qy²/d + gd²/2)/∂y = -gd ∂b/∂y - friction
//! ```
//!
//! where `d = rest_depth + height - bathymetry`. The predictor uses forward
//! differences on the prior corrected state, the corrector uses backward
//! differences on the predicted state and averages with the prior state.
//! Manning friction is applied semi-implicitly after each pass. Cells outside
//! the domain mirror the edge cell with the normal discharge reversed and
//! scaled by the restitution coefficient.

use rayon::prelude::*;

use super::{ensure_same_dimensions, ComputeInput, ComputePass, ComputeStage, ComputeStageError};
use crate::grid::{GridCell, SimulationGrid};
use crate::params::ReferenceKernelConfig;

/// Conservative variables of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Conserved {
    depth: f32,
    qx: f32,
    qy: f32,
    bed: f32,
}

/// Reference CPU implementation of the compute stage.
#[derive(Debug, Clone, Default)]
pub struct MacCormackStage {
    config: ReferenceKernelConfig,
}

impl MacCormackStage {
    pub fn new(config: ReferenceKernelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReferenceKernelConfig {
        &self.config
    }
}

impl ComputeStage for MacCormackStage {
    fn name(&self) -> &str {
        "cpu-maccormack"
    }

    fn run(&self, input: &ComputeInput<'_>, output: &mut SimulationGrid) -> Result<(), ComputeStageError> {
        ensure_same_dimensions(input, output)?;
        if output.is_empty() {
            return Ok(());
        }

        let kernel = Kernel::new(&self.config, input);
        let source = input.source();
        let size_x = output.size_x();

        match input.pass {
            ComputePass::Predict => {
                let prior = &source.corrected;
                output
                    .cells_mut()
                    .par_chunks_mut(size_x)
                    .enumerate()
                    .for_each(|(y, row)| {
                        for (x, cell) in row.iter_mut().enumerate() {
                            *cell = kernel.predict(prior, x, y);
                        }
                    });
            }
            ComputePass::Correct => {
                let prior = &source.corrected;
                let predicted = &source.predicted;
                output
                    .cells_mut()
                    .par_chunks_mut(size_x)
                    .enumerate()
                    .for_each(|(y, row)| {
                        for (x, cell) in row.iter_mut().enumerate() {
                            *cell = kernel.correct(prior, predicted, x, y);
                        }
                    });
            }
        }

        log::trace!(
            "[{}] {} pass over {}x{} cells",
            self.name(),
            input.pass,
            output.size_x(),
            output.size_y()
        );
        Ok(())
    }
}

/// Constants of one pass, resolved from the uniforms.
struct Kernel {
    gravity: f32,
    friction_sq: f32,
    time_step: f32,
    dt_dx: f32,
    restitution: f32,
    rest_depth: f32,
    min_depth: f32,
    size_x: isize,
    size_y: isize,
}

impl Kernel {
    fn new(config: &ReferenceKernelConfig, input: &ComputeInput<'_>) -> Self {
        let physics = input.uniforms.physics;
        let (size_x, size_y) = input.dimensions();
        Self {
            gravity: physics.gravity,
            friction_sq: physics.friction * physics.friction,
            time_step: physics.time_step,
            dt_dx: input.uniforms.tick.dt_dx,
            restitution: physics.restitution,
            rest_depth: config.rest_depth,
            min_depth: config.min_depth,
            size_x: size_x as isize,
            size_y: size_y as isize,
        }
    }

    fn to_conserved(&self, cell: &GridCell) -> Conserved {
        Conserved {
            depth: self.rest_depth + cell.height - cell.bathymetry,
            qx: cell.discharge_x,
            qy: cell.discharge_y,
            bed: cell.bathymetry,
        }
    }

    fn to_cell(&self, state: Conserved) -> GridCell {
        GridCell::new(
            state.depth - self.rest_depth + state.bed,
            state.qx,
            state.qy,
            state.bed,
        )
    }

    /// State at `(x, y)`, reflecting off the domain edges.
    fn sample(&self, grid: &SimulationGrid, x: isize, y: isize) -> Conserved {
        let cx = x.clamp(0, self.size_x - 1);
        let cy = y.clamp(0, self.size_y - 1);
        let mut state = self.to_conserved(grid.cell(cx as usize, cy as usize));
        if cx != x {
            state.qx = -self.restitution * state.qx;
        }
        if cy != y {
            state.qy = -self.restitution * state.qy;
        }
        state
    }

    #[inline]
    fn effective_depth(&self, depth: f32) -> f32 {
        depth.max(self.min_depth)
    }

    fn flux_x(&self, s: Conserved) -> [f32; 3] {
        let d = self.effective_depth(s.depth);
        [
            s.qx,
            s.qx * s.qx / d + 0.5 * self.gravity * d * d,
            s.qx * s.qy / d,
        ]
    }

    fn flux_y(&self, s: Conserved) -> [f32; 3] {
        let d = self.effective_depth(s.depth);
        [
            s.qy,
            s.qx * s.qy / d,
            s.qy * s.qy / d + 0.5 * self.gravity * d * d,
        ]
    }

    /// Bed slope momentum source between two neighbours, integrated over one
    /// step. Uses the mean depth so that still water over a sloped bed stays
    /// still.
    fn bed_source(&self, a: Conserved, b: Conserved) -> f32 {
        let mean_depth = 0.5 * (self.effective_depth(a.depth) + self.effective_depth(b.depth));
        -self.dt_dx * self.gravity * mean_depth * (b.bed - a.bed)
    }

    /// Semi-implicit Manning friction on the discharge.
    fn apply_friction(&self, mut state: Conserved) -> Conserved {
        if self.friction_sq <= 0.0 {
            return state;
        }
        let d = self.effective_depth(state.depth);
        let q = (state.qx * state.qx + state.qy * state.qy).sqrt();
        let damping = 1.0 + self.time_step * self.gravity * self.friction_sq * q / d.powf(7.0 / 3.0);
        state.qx /= damping;
        state.qy /= damping;
        state
    }

    fn predict(&self, prior: &SimulationGrid, x: usize, y: usize) -> GridCell {
        let (xi, yi) = (x as isize, y as isize);
        let c = self.sample(prior, xi, yi);
        let e = self.sample(prior, xi + 1, yi);
        let n = self.sample(prior, xi, yi + 1);

        let (fc, fe) = (self.flux_x(c), self.flux_x(e));
        let (gc, gn) = (self.flux_y(c), self.flux_y(n));
        let r = self.dt_dx;

        let predicted = Conserved {
            depth: c.depth - r * (fe[0] - fc[0]) - r * (gn[0] - gc[0]),
            qx: c.qx - r * (fe[1] - fc[1]) - r * (gn[1] - gc[1]) + self.bed_source(c, e),
            qy: c.qy - r * (fe[2] - fc[2]) - r * (gn[2] - gc[2]) + self.bed_source(c, n),
            bed: c.bed,
        };
        self.to_cell(self.apply_friction(predicted))
    }

    fn correct(&self, prior: &SimulationGrid, predicted: &SimulationGrid, x: usize, y: usize) -> GridCell {
        let (xi, yi) = (x as isize, y as isize);
        let u = self.to_conserved(prior.cell(x, y));
        let p = self.sample(predicted, xi, yi);
        let w = self.sample(predicted, xi - 1, yi);
        let s = self.sample(predicted, xi, yi - 1);

        let (fp, fw) = (self.flux_x(p), self.flux_x(w));
        let (gp, gs) = (self.flux_y(p), self.flux_y(s));
        let r = self.dt_dx;

        let corrected = Conserved {
            depth: 0.5 * (u.depth + p.depth - r * (fp[0] - fw[0]) - r * (gp[0] - gs[0])),
            qx: 0.5 * (u.qx + p.qx - r * (fp[1] - fw[1]) - r * (gp[1] - gs[1]) + self.bed_source(w, p)),
            qy: 0.5 * (u.qy + p.qy - r * (fp[2] - fw[2]) - r * (gp[2] - gs[2]) + self.bed_source(s, p)),
            bed: u.bed,
        };
        self.to_cell(self.apply_friction(corrected))
    }
}
