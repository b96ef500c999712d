//! Read-only hand-off of the latest corrected grid to the renderer.

use bevy_log::debug;
use bincode::Options;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{GridCell, SimulationGrid};

/// Borrowed view of the corrected grid of the last completed tick.
///
/// The view holds a shared borrow of the scheduler, so no tick can run
/// while it is alive and two reads always see the same content.
#[derive(Debug, Clone, Copy)]
pub struct CouplingPort<'a> {
    grid: &'a SimulationGrid,
    dt_dx: f32,
    tick: u64,
}

impl<'a> CouplingPort<'a> {
    pub fn new(grid: &'a SimulationGrid, dt_dx: f32, tick: u64) -> Self {
        Self { grid, dt_dx, tick }
    }

    pub fn grid(&self) -> &'a SimulationGrid {
        self.grid
    }

    /// The `Δt/Δx` scalar the renderer receives with every grid.
    pub fn dt_dx(&self) -> f32 {
        self.dt_dx
    }

    /// Number of the tick that produced this grid, 0 for the initial state.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }

    /// Row-major floats, four per cell, without copying.
    pub fn as_floats(&self) -> &'a [f32] {
        self.grid.as_floats()
    }

    pub fn snapshot(&self) -> Vec<[f32; 4]> {
        self.grid.snapshot()
    }

    /// Owned copy suitable for sending out of process.
    pub fn frame(&self) -> SurfaceFieldFrame {
        let (size_x, size_y) = self.dimensions();
        SurfaceFieldFrame {
            tick: self.tick,
            size_x: size_x as u32,
            size_y: size_y as u32,
            dt_dx: self.dt_dx,
            cells: self.grid.cells().to_vec(),
        }
    }
}

/// Owned, serialisable copy of one coupling port reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFieldFrame {
    pub tick: u64,
    pub size_x: u32,
    pub size_y: u32,
    pub dt_dx: f32,
    pub cells: Vec<GridCell>,
}

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("failed to encode frame: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode frame: {0}")]
    Decode(#[source] bincode::Error),

    #[error("lz4 block error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("frame holds {actual} cells for a {size_x}x{size_y} grid")]
    CellCount {
        size_x: u32,
        size_y: u32,
        actual: usize,
    },
}

impl SurfaceFieldFrame {
    /// Encodes the frame as an lz4-compressed bincode block.
    pub fn to_payload(&self) -> Result<Vec<u8>, PayloadError> {
        let payload = bincode::options().serialize(self).map_err(PayloadError::Encode)?;
        let output = lz4::block::compress(&payload, None, true)?;
        debug!(
            "Frame {} payload: {} bytes, {} compressed",
            self.tick,
            payload.len(),
            output.len()
        );
        Ok(output)
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self, PayloadError> {
        let decompressed = lz4::block::decompress(payload, None)?;
        let frame: SurfaceFieldFrame = bincode::options()
            .deserialize(&decompressed)
            .map_err(PayloadError::Decode)?;

        let expected = frame.size_x as usize * frame.size_y as usize;
        if frame.cells.len() != expected {
            return Err(PayloadError::CellCount {
                size_x: frame.size_x,
                size_y: frame.size_y,
                actual: frame.cells.len(),
            });
        }
        Ok(frame)
    }
}
