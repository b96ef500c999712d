//! Ping-pong ownership of the two simulation states.
//!
//! The scheduler owns slots A and B, each a full [`DualGridSet`]. The read
//! slot always holds the last completed tick. A tick runs as:
//!
//! ```text
//! Idle ──▶ PredictReady   predictor reads R, writes W.predicted
//!      ──▶ CorrectReady   R.corrected is handed to W, corrector reads W
//!                         and writes R's corrected storage
//!      ──▶ Idle           corrected storages trade back, W becomes R
//! ```
//!
//! Handing grids between slots is a `Vec` move, never a copy, and the
//! stage only ever gets a shared borrow of one slot and a mutable borrow of
//! a grid in the other.

use thiserror::Error;

use crate::compute::{ComputeInput, ComputePass, ComputeStage, ComputeStageError, StageUniforms};
use crate::coupling::CouplingPort;
use crate::grid::{DualGridSet, GaussianPulse, GridError};
use crate::params::SimulationParams;

/// Tag of one of the two buffer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    A,
    B,
}

impl SlotId {
    #[inline]
    pub fn other(self) -> SlotId {
        match self {
            SlotId::A => SlotId::B,
            SlotId::B => SlotId::A,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            SlotId::A => 0,
            SlotId::B => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchedulerPhase {
    #[default]
    Idle,
    PredictReady,
    CorrectReady,
}

/// Which slot each pass of a tick read from and wrote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRoles {
    pub predict_read: SlotId,
    pub predict_write: SlotId,
    pub correct_read: SlotId,
    pub correct_write: SlotId,
}

impl TickRoles {
    fn for_read_slot(read: SlotId) -> Self {
        Self {
            predict_read: read,
            predict_write: read.other(),
            correct_read: read.other(),
            correct_write: read,
        }
    }
}

/// Summary of a completed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// 1-based number of the tick since the last reset.
    pub tick: u64,
    pub roles: TickRoles,
    /// Whether the predictor started from the seeded initial condition.
    pub first_pass: bool,
    /// Slot exposed by the coupling port after this tick.
    pub exposed: SlotId,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{pass} pass of tick {tick} failed in `{stage}`")]
pub struct TickError {
    pub pass: ComputePass,
    pub tick: u64,
    pub stage: String,
    #[source]
    pub source: ComputeStageError,
}

/// Double-buffered simulation state and the predictor/corrector protocol.
#[derive(Debug)]
pub struct DoubleBufferScheduler {
    slots: [DualGridSet; 2],
    initial: DualGridSet,
    read: SlotId,
    phase: SchedulerPhase,
    first_pass: bool,
    completed_ticks: u64,
    abandoned_ticks: u64,
}

impl DoubleBufferScheduler {
    /// Allocates every grid and seeds them with `pulse`.
    pub fn new(size_x: usize, size_y: usize, pulse: &GaussianPulse) -> Result<Self, GridError> {
        Self::from_initial(DualGridSet::seeded(size_x, size_y, pulse)?)
    }

    /// Builds a scheduler whose slots start from `initial`.
    pub fn from_initial(initial: DualGridSet) -> Result<Self, GridError> {
        let (size_x, size_y) = initial.dimensions();
        let mut a = DualGridSet::zeroed(size_x, size_y)?;
        let mut b = DualGridSet::zeroed(size_x, size_y)?;
        a.copy_from(&initial);
        b.copy_from(&initial);

        Ok(Self {
            slots: [a, b],
            initial,
            read: SlotId::A,
            phase: SchedulerPhase::Idle,
            first_pass: true,
            completed_ticks: 0,
            abandoned_ticks: 0,
        })
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// True until the first tick completes.
    pub fn first_pass(&self) -> bool {
        self.first_pass
    }

    pub fn completed_ticks(&self) -> u64 {
        self.completed_ticks
    }

    pub fn abandoned_ticks(&self) -> u64 {
        self.abandoned_ticks
    }

    /// Slot holding the last completed state.
    pub fn read_slot(&self) -> SlotId {
        self.read
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.initial.dimensions()
    }

    pub fn slot(&self, id: SlotId) -> &DualGridSet {
        &self.slots[id.index()]
    }

    pub fn initial(&self) -> &DualGridSet {
        &self.initial
    }

    /// Read-only view of the last completed corrected grid.
    pub fn coupling_port(&self, dt_dx: f32) -> CouplingPort<'_> {
        CouplingPort::new(&self.slot(self.read).corrected, dt_dx, self.completed_ticks)
    }

    /// Runs one predictor/corrector tick through `stage`.
    ///
    /// On error the tick is abandoned: the read slot, the exposed grid and
    /// the first-pass flag are left exactly as they were.
    pub fn tick(
        &mut self,
        stage: &dyn ComputeStage,
        params: &SimulationParams,
    ) -> Result<TickReport, TickError> {
        let tick = self.completed_ticks + 1;
        let roles = TickRoles::for_read_slot(self.read);
        let first_pass = self.first_pass;
        let uniforms = StageUniforms::new(params, self.dimensions(), first_pass);

        let (read, write) = split_slots(&mut self.slots, self.read);

        self.phase = SchedulerPhase::PredictReady;
        let predict = ComputeInput {
            pass: ComputePass::Predict,
            previous: &*read,
            initial: &self.initial,
            uniforms,
        };
        if let Err(source) = stage.run(&predict, &mut write.predicted) {
            self.phase = SchedulerPhase::Idle;
            self.abandoned_ticks += 1;
            return Err(TickError {
                pass: ComputePass::Predict,
                tick,
                stage: stage.name().to_string(),
                source,
            });
        }

        // W now carries the predicted state and the prior corrected state.
        std::mem::swap(&mut read.corrected, &mut write.corrected);

        self.phase = SchedulerPhase::CorrectReady;
        let correct = ComputeInput {
            pass: ComputePass::Correct,
            previous: &*write,
            initial: &self.initial,
            uniforms,
        };
        let result = stage.run(&correct, &mut read.corrected);

        // Success: W receives the new corrected grid and R gets the prior one
        // back. Failure: R gets the prior grid back, torn output goes to W.
        std::mem::swap(&mut read.corrected, &mut write.corrected);
        self.phase = SchedulerPhase::Idle;

        if let Err(source) = result {
            self.abandoned_ticks += 1;
            return Err(TickError {
                pass: ComputePass::Correct,
                tick,
                stage: stage.name().to_string(),
                source,
            });
        }

        self.read = self.read.other();
        self.completed_ticks = tick;
        if self.first_pass {
            self.first_pass = false;
            log::debug!("[Scheduler] First tick completed, first-pass flag cleared");
        }

        Ok(TickReport {
            tick,
            roles,
            first_pass,
            exposed: self.read,
        })
    }

    /// Restores both slots to the seeded initial condition and re-arms the
    /// first-pass flag.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.copy_from(&self.initial);
        }
        self.read = SlotId::A;
        self.phase = SchedulerPhase::Idle;
        self.first_pass = true;
        self.completed_ticks = 0;
        log::debug!("[Scheduler] Reset to the initial condition");
    }
}

/// Splits the slots into `(read, write)` borrows.
fn split_slots(slots: &mut [DualGridSet; 2], read: SlotId) -> (&mut DualGridSet, &mut DualGridSet) {
    let [a, b] = slots;
    match read {
        SlotId::A => (a, b),
        SlotId::B => (b, a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SimulationGrid;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Predictor adds one to every height of its source, corrector copies the
    /// predicted grid of the slot it reads.
    #[derive(Default)]
    struct CountingStage {
        calls: Mutex<Vec<(ComputePass, bool)>>,
    }

    impl ComputeStage for CountingStage {
        fn name(&self) -> &str {
            "counting"
        }

        fn run(&self, input: &ComputeInput<'_>, output: &mut SimulationGrid) -> Result<(), ComputeStageError> {
            self.calls
                .lock()
                .unwrap()
                .push((input.pass, input.uniforms.is_first_pass()));
            match input.pass {
                ComputePass::Predict => {
                    output.copy_from(&input.source().corrected);
                    for cell in output.cells_mut() {
                        cell.height += 1.0;
                    }
                }
                ComputePass::Correct => output.copy_from(&input.previous.predicted),
            }
            Ok(())
        }
    }

    /// Scribbles over its output, then fails on the chosen pass once
    /// `succeed_first` calls of that pass have gone through.
    struct FailingStage {
        fail_on: ComputePass,
        succeed_first: usize,
        seen: AtomicUsize,
        inner: CountingStage,
    }

    impl FailingStage {
        fn new(fail_on: ComputePass, succeed_first: usize) -> Self {
            Self {
                fail_on,
                succeed_first,
                seen: AtomicUsize::new(0),
                inner: CountingStage::default(),
            }
        }
    }

    impl ComputeStage for FailingStage {
        fn name(&self) -> &str {
            "failing"
        }

        fn run(&self, input: &ComputeInput<'_>, output: &mut SimulationGrid) -> Result<(), ComputeStageError> {
            if input.pass == self.fail_on && self.seen.fetch_add(1, Ordering::SeqCst) >= self.succeed_first {
                for cell in output.cells_mut() {
                    cell.height = f32::NAN;
                }
                return Err(ComputeStageError::Backend("device lost".into()));
            }
            self.inner.run(input, output)
        }
    }

    fn scheduler() -> DoubleBufferScheduler {
        DoubleBufferScheduler::from_initial(DualGridSet::zeroed(4, 3).unwrap()).unwrap()
    }

    fn exposed_heights(scheduler: &DoubleBufferScheduler) -> Vec<f32> {
        scheduler
            .coupling_port(0.0)
            .grid()
            .cells()
            .iter()
            .map(|c| c.height)
            .collect()
    }

    #[test]
    fn test_corrector_reads_slot_written_by_predictor() {
        let mut scheduler = scheduler();
        let stage = CountingStage::default();
        let params = SimulationParams::default();

        for expected in 1..=5u64 {
            let report = scheduler.tick(&stage, &params).unwrap();
            assert_eq!(report.tick, expected);
            assert_eq!(report.roles.correct_read, report.roles.predict_write);
            assert_eq!(report.roles.correct_write, report.roles.predict_read);
            assert_ne!(report.roles.predict_read, report.roles.predict_write);
            assert!(exposed_heights(&scheduler).iter().all(|h| *h == expected as f32));
        }
    }

    #[test]
    fn test_read_slot_alternates() {
        let mut scheduler = scheduler();
        let stage = CountingStage::default();
        let params = SimulationParams::default();

        assert_eq!(scheduler.read_slot(), SlotId::A);
        let first = scheduler.tick(&stage, &params).unwrap();
        assert_eq!(first.roles.predict_read, SlotId::A);
        assert_eq!(first.exposed, SlotId::B);
        let second = scheduler.tick(&stage, &params).unwrap();
        assert_eq!(second.roles.predict_read, SlotId::B);
        assert_eq!(scheduler.read_slot(), SlotId::A);
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    }

    #[test]
    fn test_first_pass_flag_clears_after_first_completed_tick() {
        let mut scheduler = scheduler();
        let stage = CountingStage::default();
        let params = SimulationParams::default();

        assert!(scheduler.first_pass());
        let report = scheduler.tick(&stage, &params).unwrap();
        assert!(report.first_pass);
        assert!(!scheduler.first_pass());

        scheduler.tick(&stage, &params).unwrap();
        let calls = stage.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                (ComputePass::Predict, true),
                (ComputePass::Correct, true),
                (ComputePass::Predict, false),
                (ComputePass::Correct, false),
            ]
        );
    }

    #[test]
    fn test_first_predict_starts_from_initial_condition() {
        let mut initial = DualGridSet::zeroed(2, 2).unwrap();
        initial.corrected.cell_mut(1, 1).height = 7.0;
        let mut scheduler = DoubleBufferScheduler::from_initial(initial).unwrap();
        scheduler.tick(&CountingStage::default(), &SimulationParams::default()).unwrap();
        assert_eq!(scheduler.coupling_port(0.0).grid().cell(1, 1).height, 8.0);
        assert_eq!(scheduler.coupling_port(0.0).grid().cell(0, 0).height, 1.0);
    }

    #[test]
    fn test_failed_predict_keeps_previous_state() {
        let mut scheduler = scheduler();
        let params = SimulationParams::default();
        let stage = FailingStage::new(ComputePass::Predict, 1);

        scheduler.tick(&stage, &params).unwrap();
        let before = exposed_heights(&scheduler);
        let read = scheduler.read_slot();

        let err = scheduler.tick(&stage, &params).unwrap_err();
        assert_eq!(err.pass, ComputePass::Predict);
        assert_eq!(err.tick, 2);
        assert_eq!(exposed_heights(&scheduler), before);
        assert_eq!(scheduler.read_slot(), read);
        assert_eq!(scheduler.completed_ticks(), 1);
        assert_eq!(scheduler.abandoned_ticks(), 1);
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    }

    #[test]
    fn test_failed_correct_never_exposes_torn_state() {
        let mut scheduler = scheduler();
        let params = SimulationParams::default();
        let stage = FailingStage::new(ComputePass::Correct, 2);

        scheduler.tick(&stage, &params).unwrap();
        scheduler.tick(&stage, &params).unwrap();
        let before = exposed_heights(&scheduler);

        let err = scheduler.tick(&stage, &params).unwrap_err();
        assert_eq!(err.pass, ComputePass::Correct);
        assert_eq!(err.stage, "failing");
        assert_eq!(exposed_heights(&scheduler), before);
        assert!(before.iter().all(|h| *h == 2.0));

        // The next successful tick continues from the intact state.
        let recovered = CountingStage::default();
        scheduler.tick(&recovered, &params).unwrap();
        assert!(exposed_heights(&scheduler).iter().all(|h| *h == 3.0));
    }

    #[test]
    fn test_first_pass_survives_a_failed_first_tick() {
        let mut scheduler = scheduler();
        let params = SimulationParams::default();
        let failing = FailingStage::new(ComputePass::Correct, 0);

        assert!(scheduler.tick(&failing, &params).is_err());
        assert!(scheduler.first_pass());

        let report = scheduler.tick(&CountingStage::default(), &params).unwrap();
        assert!(report.first_pass);
        assert!(!scheduler.first_pass());
    }

    #[test]
    fn test_reset_restores_initial_condition() {
        let mut scheduler = DoubleBufferScheduler::new(9, 9, &GaussianPulse::default()).unwrap();
        let stage = CountingStage::default();
        let params = SimulationParams::default();
        scheduler.tick(&stage, &params).unwrap();
        scheduler.tick(&stage, &params).unwrap();
        scheduler.tick(&stage, &params).unwrap();

        scheduler.reset();
        assert!(scheduler.first_pass());
        assert_eq!(scheduler.completed_ticks(), 0);
        assert_eq!(scheduler.read_slot(), SlotId::A);
        assert_eq!(scheduler.slot(SlotId::A), scheduler.initial());
        assert_eq!(scheduler.slot(SlotId::B), scheduler.initial());
    }

    #[test]
    fn test_coupling_port_tracks_completed_ticks() {
        let mut scheduler = scheduler();
        assert_eq!(scheduler.coupling_port(0.5).tick(), 0);
        scheduler.tick(&CountingStage::default(), &SimulationParams::default()).unwrap();
        let port = scheduler.coupling_port(0.5);
        assert_eq!(port.tick(), 1);
        assert_eq!(port.dt_dx(), 0.5);
    }
}
