//! Fixed-step time integration over a variable frame rate.
//!
//! Elapsed frame time is added to an accumulator; every whole step in the
//! accumulator fires one tick and subtracts exactly one step, so the
//! remainder carries into the next frame. The accumulator is a [`Duration`],
//! which keeps the arithmetic exact for steps that are whole nanoseconds.

use std::time::Duration;

/// What the integrator did with the backlog at the end of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBudget {
    pub ticks: u32,
    /// Time dropped because the per-frame tick cap was hit.
    pub dropped: Duration,
}

#[derive(Debug, Clone)]
pub struct TimeIntegrator {
    step: Duration,
    accumulated: Duration,
    active: bool,
    max_ticks_per_frame: Option<u32>,
    ticks_this_frame: u32,
    dropped_total: Duration,
}

impl TimeIntegrator {
    /// A paused integrator firing once per `step`.
    pub fn new(step: Duration, max_ticks_per_frame: Option<u32>) -> Self {
        Self {
            step,
            accumulated: Duration::ZERO,
            active: false,
            max_ticks_per_frame,
            ticks_this_frame: 0,
            dropped_total: Duration::ZERO,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn max_ticks_per_frame(&self) -> Option<u32> {
        self.max_ticks_per_frame
    }

    /// Total time discarded by the catch-up cap since construction.
    pub fn dropped_total(&self) -> Duration {
        self.dropped_total
    }

    /// Starts a frame that took `elapsed` of wall-clock time.
    pub fn begin_frame(&mut self, elapsed: Duration) {
        self.ticks_this_frame = 0;
        if self.active {
            self.accumulated = self.accumulated.saturating_add(elapsed);
        }
    }

    /// Consumes one step if a tick is due in this frame.
    pub fn next_tick(&mut self) -> bool {
        if !self.active || self.step.is_zero() || self.accumulated < self.step {
            return false;
        }
        if self.cap_reached() {
            return false;
        }
        self.accumulated -= self.step;
        self.ticks_this_frame += 1;
        true
    }

    fn cap_reached(&self) -> bool {
        self.max_ticks_per_frame
            .is_some_and(|max| self.ticks_this_frame >= max)
    }

    /// Closes the frame. If the tick cap left whole steps in the
    /// accumulator they are dropped, keeping only the sub-step remainder.
    /// A backlog left for any other reason carries over.
    pub fn end_frame(&mut self) -> FrameBudget {
        let mut dropped = Duration::ZERO;
        if self.cap_reached() && !self.step.is_zero() && self.accumulated >= self.step {
            let remainder = self.accumulated.as_nanos() % self.step.as_nanos();
            let remainder = Duration::new(
                (remainder / 1_000_000_000) as u64,
                (remainder % 1_000_000_000) as u32,
            );
            dropped = self.accumulated - remainder;
            self.accumulated = remainder;
            self.dropped_total += dropped;
        }
        FrameBudget {
            ticks: self.ticks_this_frame,
            dropped,
        }
    }

    /// Clears the accumulator.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.ticks_this_frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frames(integrator: &mut TimeIntegrator, frames: u32, elapsed: Duration) -> u32 {
        let mut ticks = 0;
        for _ in 0..frames {
            integrator.begin_frame(elapsed);
            while integrator.next_tick() {
                ticks += 1;
            }
            integrator.end_frame();
        }
        ticks
    }

    #[test]
    fn test_tick_count_and_residual() {
        let step = Duration::from_millis(4);
        let frame = Duration::from_millis(7);
        let mut integrator = TimeIntegrator::new(step, None);
        integrator.set_active(true);

        let ticks = run_frames(&mut integrator, 10, frame);
        // 70 ms of 4 ms steps
        assert_eq!(ticks, 17);
        assert_eq!(integrator.accumulated(), Duration::from_millis(2));
    }

    #[test]
    fn test_remainder_is_carried_not_reset() {
        let mut integrator = TimeIntegrator::new(Duration::from_millis(10), None);
        integrator.set_active(true);

        assert_eq!(run_frames(&mut integrator, 1, Duration::from_millis(6)), 0);
        assert_eq!(run_frames(&mut integrator, 1, Duration::from_millis(6)), 1);
        assert_eq!(integrator.accumulated(), Duration::from_millis(2));
    }

    #[test]
    fn test_inactive_neither_adds_nor_consumes() {
        let mut integrator = TimeIntegrator::new(Duration::from_millis(10), None);
        integrator.set_active(true);
        run_frames(&mut integrator, 1, Duration::from_millis(15));
        assert_eq!(integrator.accumulated(), Duration::from_millis(5));

        integrator.set_active(false);
        assert_eq!(run_frames(&mut integrator, 20, Duration::from_millis(15)), 0);
        assert_eq!(integrator.accumulated(), Duration::from_millis(5));

        integrator.set_active(true);
        assert_eq!(run_frames(&mut integrator, 1, Duration::from_millis(5)), 1);
        assert_eq!(integrator.accumulated(), Duration::ZERO);
    }

    #[test]
    fn test_starts_paused() {
        let mut integrator = TimeIntegrator::new(Duration::from_millis(1), None);
        assert_eq!(run_frames(&mut integrator, 3, Duration::from_millis(10)), 0);
        assert_eq!(integrator.accumulated(), Duration::ZERO);
    }

    #[test]
    fn test_cap_drops_whole_steps_and_keeps_remainder() {
        let mut integrator = TimeIntegrator::new(Duration::from_millis(1), Some(3));
        integrator.set_active(true);

        integrator.begin_frame(Duration::from_micros(10_500));
        let mut ticks = 0;
        while integrator.next_tick() {
            ticks += 1;
        }
        let budget = integrator.end_frame();

        assert_eq!(ticks, 3);
        assert_eq!(budget.ticks, 3);
        assert_eq!(budget.dropped, Duration::from_millis(7));
        assert_eq!(integrator.accumulated(), Duration::from_micros(500));
        assert_eq!(integrator.dropped_total(), Duration::from_millis(7));
    }

    #[test]
    fn test_backlog_below_cap_carries_over() {
        let mut integrator = TimeIntegrator::new(Duration::from_millis(1), Some(10));
        integrator.set_active(true);

        integrator.begin_frame(Duration::from_millis(4));
        assert!(integrator.next_tick());
        // caller stops early, e.g. after an abandoned tick
        let budget = integrator.end_frame();
        assert_eq!(budget.ticks, 1);
        assert_eq!(budget.dropped, Duration::ZERO);
        assert_eq!(integrator.accumulated(), Duration::from_millis(3));
    }

    #[test]
    fn test_zero_step_never_fires() {
        let mut integrator = TimeIntegrator::new(Duration::ZERO, None);
        integrator.set_active(true);
        assert_eq!(run_frames(&mut integrator, 2, Duration::from_millis(5)), 0);
        assert_eq!(integrator.end_frame().dropped, Duration::ZERO);
    }

    #[test]
    fn test_saturated_step_never_fires() {
        let mut integrator = TimeIntegrator::new(Duration::MAX, Some(1));
        integrator.set_active(true);
        assert_eq!(run_frames(&mut integrator, 3, Duration::from_secs(3600)), 0);
        assert_eq!(integrator.accumulated(), Duration::from_secs(3 * 3600));

        // the accumulator saturates instead of overflowing
        integrator.begin_frame(Duration::from_secs(u64::MAX));
        integrator.begin_frame(Duration::from_secs(u64::MAX));
        assert_eq!(integrator.accumulated(), Duration::MAX);
    }
}
