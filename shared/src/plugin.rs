//! Bevy integration of the surface simulation.

use bevy::prelude::*;
use bevy_log::info;

use crate::modes::SimulationModes;
use crate::scheduler::{SlotId, TickError};
use crate::sets::SimulationSet;
use crate::simulation::SurfaceSimulation;

/// Advances the [`SurfaceSimulation`] resource once per frame.
///
/// The host inserts the resource; the plugin only drives it. Consumers of
/// the coupling port should run in [`SimulationSet::Publish`].
pub struct SurfaceSimulationPlugin;

impl Plugin for SurfaceSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationModes>()
            .add_event::<TickCompleted>()
            .add_event::<TickAbandoned>()
            .add_event::<ResetSurfaceSimulation>()
            .configure_sets(
                Update,
                (
                    SimulationSet::Modes,
                    SimulationSet::Advance,
                    SimulationSet::Publish,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (apply_simulation_modes, handle_reset_requests)
                    .chain()
                    .in_set(SimulationSet::Modes)
                    .run_if(resource_exists::<SurfaceSimulation>),
            )
            .add_systems(
                Update,
                advance_surface_simulation
                    .in_set(SimulationSet::Advance)
                    .run_if(resource_exists::<SurfaceSimulation>),
            );
    }
}

/// Sent once per frame in which at least one tick completed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCompleted {
    /// Number of the last tick completed this frame.
    pub tick: u64,
    pub ticks_this_frame: u32,
    /// Slot now exposed by the coupling port.
    pub exposed: SlotId,
}

#[derive(Event, Debug, Clone)]
pub struct TickAbandoned(pub TickError);

/// Request to restart the simulation from its initial condition.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ResetSurfaceSimulation;

pub fn apply_simulation_modes(modes: Res<SimulationModes>, mut simulation: ResMut<SurfaceSimulation>) {
    if simulation.is_stepping() == modes.stepping {
        return;
    }
    simulation.set_stepping(modes.stepping);
    if modes.stepping {
        info!("Surface simulation resumed");
    } else {
        info!("Surface simulation paused");
    }
}

pub fn handle_reset_requests(
    mut requests: EventReader<ResetSurfaceSimulation>,
    mut simulation: ResMut<SurfaceSimulation>,
) {
    if requests.read().count() == 0 {
        return;
    }
    simulation.reset();
    info!("Surface simulation reset to its initial condition");
}

pub fn advance_surface_simulation(
    time: Res<Time>,
    mut simulation: ResMut<SurfaceSimulation>,
    mut completed: EventWriter<TickCompleted>,
    mut abandoned: EventWriter<TickAbandoned>,
) {
    let outcome = simulation.advance(time.delta());

    if let Some(report) = outcome.last_tick {
        completed.write(TickCompleted {
            tick: report.tick,
            ticks_this_frame: outcome.ticks,
            exposed: report.exposed,
        });
    }
    if let Some(err) = outcome.abandoned {
        abandoned.write(TickAbandoned(err));
    }
}
