pub mod dump;
pub mod frame_rate;

use bevy::prelude::*;
use bevy_log::info;
use shared::diagnostics::FrameRateSampler;
use shared::sets::SimulationSet;
use shared::SurfaceSimulation;
use std::time::Duration;

use dump::{dump_frames_system, dump_initial_frame, FrameDumpSettings};
use frame_rate::sample_frame_rate_system;

/// Wall-clock length of a bounded run.
#[derive(Resource, Debug, Clone, Copy)]
pub struct RunLimit(pub Duration);

pub fn setup_resources(app: &mut App) {
    app.init_resource::<FrameRateSampler>();
}

pub fn register_systems(app: &mut App) {
    app.add_systems(Update, sample_frame_rate_system);

    app.add_systems(
        Update,
        dump_frames_system
            .in_set(SimulationSet::Publish)
            .run_if(resource_exists::<FrameDumpSettings>),
    );

    app.add_systems(
        Startup,
        dump_initial_frame.run_if(resource_exists::<FrameDumpSettings>),
    );

    app.add_systems(
        Last,
        exit_after_run_limit.run_if(resource_exists::<RunLimit>),
    );
}

fn exit_after_run_limit(
    time: Res<Time>,
    limit: Res<RunLimit>,
    simulation: Res<SurfaceSimulation>,
    mut exit: EventWriter<AppExit>,
) {
    if time.elapsed() < limit.0 {
        return;
    }

    let scheduler = simulation.scheduler();
    info!(
        "Run finished after {:?}: {} ticks completed, {} abandoned, {:?} of backlog dropped",
        time.elapsed(),
        scheduler.completed_ticks(),
        scheduler.abandoned_ticks(),
        simulation.integrator().dropped_total()
    );
    exit.write(AppExit::Success);
}
