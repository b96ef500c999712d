//! Grid data model: cells, single grids, the predicted/corrected pair and
//! the Gaussian initial condition.

mod cell;
mod dual;
mod pulse;
mod store;

pub use cell::{GridCell, GridField};
pub use dual::DualGridSet;
pub use pulse::GaussianPulse;
pub use store::SimulationGrid;

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("grid of {size_x}x{size_y} cells overflows the address space")]
    DimensionOverflow { size_x: usize, size_y: usize },

    #[error("could not allocate {cells} grid cells")]
    Allocation {
        cells: usize,
        #[source]
        source: TryReserveError,
    },
}
