//! Frame-rate sampling, kept apart from the simulation state.

use std::time::Duration;

use bevy_ecs::resource::Resource;

pub const FRAME_RATE_WARMUP: Duration = Duration::from_secs(5);
pub const FRAME_RATE_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);
pub const FRAME_RATE_SAMPLES_PER_AVERAGE: usize = 5;

/// Counts frames over fixed intervals after a warm-up period and reports
/// the mean frames per second of every batch of samples.
#[derive(Resource, Debug, Clone)]
pub struct FrameRateSampler {
    warmup: Duration,
    interval: Duration,
    samples_per_average: usize,
    warmed_up: bool,
    elapsed: Duration,
    frames: u32,
    samples: Vec<f32>,
}

impl Default for FrameRateSampler {
    fn default() -> Self {
        Self::new(
            FRAME_RATE_WARMUP,
            FRAME_RATE_SAMPLE_INTERVAL,
            FRAME_RATE_SAMPLES_PER_AVERAGE,
        )
    }
}

impl FrameRateSampler {
    pub fn new(warmup: Duration, interval: Duration, samples_per_average: usize) -> Self {
        Self {
            warmup,
            interval,
            samples_per_average: samples_per_average.max(1),
            warmed_up: warmup.is_zero(),
            elapsed: Duration::ZERO,
            frames: 0,
            samples: Vec::with_capacity(samples_per_average.max(1)),
        }
    }

    pub fn is_warmed_up(&self) -> bool {
        self.warmed_up
    }

    /// Records one rendered frame of length `delta`. Returns the mean frame
    /// rate once a full batch of samples has been collected.
    pub fn record_frame(&mut self, delta: Duration) -> Option<f32> {
        self.elapsed += delta;

        if !self.warmed_up {
            if self.elapsed < self.warmup {
                return None;
            }
            self.warmed_up = true;
            self.elapsed -= self.warmup;
            self.frames = 0;
            return None;
        }

        self.frames += 1;
        if self.interval.is_zero() || self.elapsed < self.interval {
            return None;
        }

        let sample = self.frames as f32 / self.elapsed.as_secs_f32();
        self.samples.push(sample);
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        log::trace!("[FrameRate] sample {:.1} fps", sample);

        if self.samples.len() < self.samples_per_average {
            return None;
        }
        let average = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
        self.samples.clear();
        Some(average)
    }
}
