pub mod compute;
pub mod constants;
pub mod coupling;
pub mod diagnostics;
pub mod grid;
pub mod integrator;
pub mod modes;
pub mod params;
pub mod plugin;
pub mod scheduler;
pub mod sets;
pub mod simulation;

pub use constants::*;
pub use coupling::{CouplingPort, SurfaceFieldFrame};
pub use modes::{SimulationModes, SurfaceDisplay};
pub use params::{SimulationConfig, SimulationParams};
pub use plugin::{ResetSurfaceSimulation, SurfaceSimulationPlugin, TickAbandoned, TickCompleted};
pub use simulation::{FrameOutcome, SurfaceSimulation};
