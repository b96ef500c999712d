//! The surface simulation as one Bevy resource.
//!
//! Ties the scheduler, the integrator and the compute stage together. A
//! host inserts it at startup and the plugin advances it once per frame.

use std::time::Duration;

use bevy::prelude::*;

use crate::compute::{ComputeStage, MacCormackStage};
use crate::coupling::CouplingPort;
use crate::grid::GridError;
use crate::integrator::TimeIntegrator;
use crate::params::{SimulationConfig, SimulationParams};
use crate::scheduler::{DoubleBufferScheduler, TickError, TickReport};

/// Result of advancing the simulation by one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    pub ticks: u32,
    pub last_tick: Option<TickReport>,
    pub abandoned: Option<TickError>,
    /// Simulated time discarded by the catch-up cap.
    pub dropped: Duration,
}

#[derive(Resource)]
pub struct SurfaceSimulation {
    scheduler: DoubleBufferScheduler,
    integrator: TimeIntegrator,
    stage: Box<dyn ComputeStage>,
    params: SimulationParams,
}

impl SurfaceSimulation {
    /// Builds a paused simulation running on the CPU reference kernel.
    pub fn new(config: &SimulationConfig) -> Result<Self, GridError> {
        Self::with_stage(config, Box::new(MacCormackStage::new(config.reference_kernel)))
    }

    /// Builds a paused simulation running on `stage`.
    pub fn with_stage(config: &SimulationConfig, stage: Box<dyn ComputeStage>) -> Result<Self, GridError> {
        let scheduler = DoubleBufferScheduler::new(config.grid_size_x, config.grid_size_y, &config.pulse)?;
        let integrator = TimeIntegrator::new(config.params.step_duration(), config.max_ticks_per_frame);
        log::debug!(
            "[Simulation] {}x{} grid, step {:?}, stage `{}`",
            config.grid_size_x,
            config.grid_size_y,
            integrator.step(),
            stage.name()
        );
        Ok(Self {
            scheduler,
            integrator,
            stage,
            params: config.params,
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn scheduler(&self) -> &DoubleBufferScheduler {
        &self.scheduler
    }

    pub fn integrator(&self) -> &TimeIntegrator {
        &self.integrator
    }

    pub fn stage_name(&self) -> &str {
        self.stage.name()
    }

    pub fn is_stepping(&self) -> bool {
        self.integrator.is_active()
    }

    /// Pauses or resumes simulated time. A tick in progress always finishes.
    pub fn set_stepping(&mut self, stepping: bool) {
        self.integrator.set_active(stepping);
    }

    pub fn coupling_port(&self) -> CouplingPort<'_> {
        self.scheduler.coupling_port(self.params.dt_dx())
    }

    /// Runs every tick due after `elapsed` of wall-clock time.
    ///
    /// An abandoned tick consumes its step and ends the frame; the rest of
    /// the backlog is retried next frame.
    pub fn advance(&mut self, elapsed: Duration) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        self.integrator.begin_frame(elapsed);

        while self.integrator.next_tick() {
            match self.scheduler.tick(self.stage.as_ref(), &self.params) {
                Ok(report) => {
                    outcome.ticks += 1;
                    outcome.last_tick = Some(report);
                }
                Err(err) => {
                    log::warn!("[Simulation] Tick abandoned: {err}");
                    outcome.abandoned = Some(err);
                    break;
                }
            }
        }

        let budget = self.integrator.end_frame();
        outcome.dropped = budget.dropped;
        if !budget.dropped.is_zero() {
            log::warn!(
                "[Simulation] Hit {} ticks this frame, dropped {:?} of backlog",
                budget.ticks,
                budget.dropped
            );
        }
        outcome
    }

    /// Runs exactly one tick, ignoring the integrator.
    pub fn step_once(&mut self) -> Result<TickReport, TickError> {
        self.scheduler.tick(self.stage.as_ref(), &self.params)
    }

    /// Starts over from the seeded initial condition. Stepping is left as is.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.integrator.reset();
    }
}
