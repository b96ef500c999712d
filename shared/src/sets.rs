use bevy::prelude::*;

/// Ordering of the surface simulation inside `Update`.
///
/// Renderers and exporters that read the coupling port should run in
/// `Publish` so they always see the state of the frame's last completed tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Modes,
    Advance,
    Publish,
}
