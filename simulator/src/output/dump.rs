use bevy::prelude::*;
use bevy_log::{debug, error};
use shared::{SurfaceFieldFrame, SurfaceSimulation, TickCompleted};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where and how often compressed frames are written.
#[derive(Resource, Debug, Clone)]
pub struct FrameDumpSettings {
    pub dir: PathBuf,
    /// Dump whenever the tick count crosses a multiple of this.
    pub every: u64,
}

impl FrameDumpSettings {
    /// True if a multiple of `every` lies in `(previous, current]`.
    pub fn is_due(&self, previous: u64, current: u64) -> bool {
        self.every > 0 && current / self.every > previous / self.every
    }

    pub fn frame_path(&self, tick: u64) -> PathBuf {
        self.dir.join(format!("frame_{tick:08}.bin"))
    }
}

pub fn write_frame(frame: &SurfaceFieldFrame, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let payload = frame.to_payload()?;
    let mut file = File::create(path)?;
    file.write_all(&payload)?;
    Ok(())
}

fn dump_current_frame(settings: &FrameDumpSettings, simulation: &SurfaceSimulation) {
    let frame = simulation.coupling_port().frame();
    let path = settings.frame_path(frame.tick);
    if let Err(err) = write_frame(&frame, &path) {
        error!("Could not write frame {} to {} : {}", frame.tick, path.display(), err);
    } else {
        debug!("Frame {} written to {}", frame.tick, path.display());
    }
}

pub fn dump_initial_frame(settings: Res<FrameDumpSettings>, simulation: Res<SurfaceSimulation>) {
    dump_current_frame(&settings, &simulation);
}

pub fn dump_frames_system(
    settings: Res<FrameDumpSettings>,
    simulation: Res<SurfaceSimulation>,
    mut completed: EventReader<TickCompleted>,
) {
    // Only the frame's last tick is observable, so one dump per frame at most
    let mut due = false;
    for ev in completed.read() {
        let previous = ev.tick.saturating_sub(ev.ticks_this_frame as u64);
        due |= settings.is_due(previous, ev.tick);
    }
    if due {
        dump_current_frame(&settings, &simulation);
    }
}
