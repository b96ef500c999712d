//! Per-cell simulation state.
//!
//! A cell is four `f32` values laid out exactly as the compute stage and the
//! renderer expect them: one RGBA32F texel per cell, in the order
//! height, discharge x, discharge y, bathymetry.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Selects one scalar of a [`GridCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridField {
    Height = 0,
    DischargeX = 1,
    DischargeY = 2,
    /// Terrain elevation. Present in the layout, always zero today.
    Bathymetry = 3,
}

impl GridField {
    pub const ALL: [GridField; 4] = [
        GridField::Height,
        GridField::DischargeX,
        GridField::DischargeY,
        GridField::Bathymetry,
    ];

    /// Position of this field inside a cell's 4-tuple.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// State of a single grid cell.
///
/// `height` is the water surface elevation above rest and may dip below zero
/// while a wave passes. Nothing here enforces plausibility; that belongs to
/// the compute stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct GridCell {
    pub height: f32,
    pub discharge_x: f32,
    pub discharge_y: f32,
    pub bathymetry: f32,
}

impl GridCell {
    pub const ZERO: GridCell = GridCell {
        height: 0.0,
        discharge_x: 0.0,
        discharge_y: 0.0,
        bathymetry: 0.0,
    };

    pub const fn new(height: f32, discharge_x: f32, discharge_y: f32, bathymetry: f32) -> Self {
        Self {
            height,
            discharge_x,
            discharge_y,
            bathymetry,
        }
    }

    /// A still cell at the given surface height.
    pub const fn with_height(height: f32) -> Self {
        Self::new(height, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn get(&self, field: GridField) -> f32 {
        match field {
            GridField::Height => self.height,
            GridField::DischargeX => self.discharge_x,
            GridField::DischargeY => self.discharge_y,
            GridField::Bathymetry => self.bathymetry,
        }
    }

    #[inline]
    pub fn set(&mut self, field: GridField, value: f32) {
        match field {
            GridField::Height => self.height = value,
            GridField::DischargeX => self.discharge_x = value,
            GridField::DischargeY => self.discharge_y = value,
            GridField::Bathymetry => self.bathymetry = value,
        }
    }

    /// The cell as the 4-tuple handed to compute stages and renderers.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.height, self.discharge_x, self.discharge_y, self.bathymetry]
    }

    /// True when every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}
