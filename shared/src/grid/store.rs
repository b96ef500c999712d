//! Dense storage for one simulation grid.
//!
//! Cells are stored row-major in a single allocation, so `grid[y][x]` lives
//! at index `y * size_x + x`. The same layout is used by the compute stage
//! input, the coupling port and the exported payloads, so a flattened grid
//! can be handed over without any reordering.

use super::{GaussianPulse, GridCell, GridError, GridField};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationGrid {
    size_x: usize,
    size_y: usize,
    cells: Vec<GridCell>,
}

impl SimulationGrid {
    /// Allocates a `size_x` by `size_y` grid seeded with `pulse`.
    ///
    /// Fails only if the cells cannot be allocated.
    pub fn new(size_x: usize, size_y: usize, pulse: &GaussianPulse) -> Result<Self, GridError> {
        let mut grid = Self::zeroed(size_x, size_y)?;
        pulse.apply(&mut grid);
        log::debug!(
            "Seeded {}x{} grid with a pulse of height {}",
            size_x,
            size_y,
            pulse.max_height
        );
        Ok(grid)
    }

    /// Allocates a grid with every cell at rest and zero height.
    pub fn zeroed(size_x: usize, size_y: usize) -> Result<Self, GridError> {
        let len = size_x
            .checked_mul(size_y)
            .ok_or(GridError::DimensionOverflow { size_x, size_y })?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|source| GridError::Allocation {
                cells: len,
                source,
            })?;
        cells.resize(len, GridCell::ZERO);

        Ok(Self {
            size_x,
            size_y,
            cells,
        })
    }

    #[inline]
    pub fn size_x(&self) -> usize {
        self.size_x
    }

    #[inline]
    pub fn size_y(&self) -> usize {
        self.size_y
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.size_x, self.size_y)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.size_x && y < self.size_y,
            "cell ({x}, {y}) outside {}x{} grid",
            self.size_x,
            self.size_y
        );
        y * self.size_x + x
    }

    /// Cell at column `x`, row `y`. The caller guarantees bounds.
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &GridCell {
        &self.cells[self.index(x, y)]
    }

    /// Mutable cell at column `x`, row `y`. The caller guarantees bounds.
    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut GridCell {
        let index = self.index(x, y);
        &mut self.cells[index]
    }

    /// Overwrites one scalar of one cell. No physical validation is done.
    #[inline]
    pub fn set_field(&mut self, field: GridField, x: usize, y: usize, value: f32) {
        self.cell_mut(x, y).set(field, value);
    }

    #[inline]
    pub fn field(&self, field: GridField, x: usize, y: usize) -> f32 {
        self.cell(x, y).get(field)
    }

    /// All cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [GridCell] {
        &mut self.cells
    }

    pub fn row(&self, y: usize) -> &[GridCell] {
        let start = y * self.size_x;
        &self.cells[start..start + self.size_x]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[GridCell]> {
        // chunks_exact panics on a zero chunk size
        self.cells.chunks_exact(self.size_x.max(1))
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [GridCell]> {
        self.cells.chunks_exact_mut(self.size_x.max(1))
    }

    /// The grid as a flat `f32` slice, four floats per cell, without copying.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.cells)
    }

    /// Row-major copy of the grid as `(height, discharge_x, discharge_y,
    /// bathymetry)` tuples.
    pub fn snapshot(&self) -> Vec<[f32; 4]> {
        self.cells.iter().map(|cell| cell.to_array()).collect()
    }

    /// Copies every cell of `other` into `self`. Both grids must have the
    /// same dimensions.
    pub fn copy_from(&mut self, other: &SimulationGrid) {
        debug_assert_eq!(self.dimensions(), other.dimensions());
        self.cells.copy_from_slice(&other.cells);
    }

    pub fn max_height(&self) -> f32 {
        self.cells
            .iter()
            .map(|c| c.height)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}
