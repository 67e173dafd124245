//! Fixed 8x8 pixel buffer
//!
//! Cells are addressed by `(x, y)` with `x` the column (left to right) and
//! `y` the row (bottom to top). The linear layout is column-major,
//! `index = x * 8 + y`, which is also the order the LEDs are chained in.
//! Mutations stay in memory until [`PixelBuffer::show`] pushes the frame.

use crate::OutputDriver;
use crate::color::{BLACK, Rgb};

/// Width and height of the matrix
pub const MATRIX_SIZE: u8 = 8;

/// Number of cells in the matrix
pub const PIXEL_COUNT: usize = MATRIX_SIZE as usize * MATRIX_SIZE as usize;

/// Convert `(x, y)` to a linear index
///
/// Returns `None` if either coordinate is outside `0..8`.
pub const fn coords_to_index(x: u8, y: u8) -> Option<usize> {
    if x >= MATRIX_SIZE || y >= MATRIX_SIZE {
        return None;
    }
    Some(x as usize * MATRIX_SIZE as usize + y as usize)
}

/// Convert a linear index back to `(x, y)`
#[allow(clippy::cast_possible_truncation)]
pub const fn index_to_coords(index: usize) -> Option<(u8, u8)> {
    if index >= PIXEL_COUNT {
        return None;
    }
    let size = MATRIX_SIZE as usize;
    Some(((index / size) as u8, (index % size) as u8))
}

/// Frame of 64 colors, black by default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBuffer {
    cells: [Rgb; PIXEL_COUNT],
}

impl PixelBuffer {
    /// Create an all-black buffer
    pub const fn new() -> Self {
        Self {
            cells: [BLACK; PIXEL_COUNT],
        }
    }

    /// Create a buffer with every cell set to `color`
    pub const fn filled(color: Rgb) -> Self {
        Self {
            cells: [color; PIXEL_COUNT],
        }
    }

    /// Set a single cell
    ///
    /// Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u8, y: u8, color: Rgb) {
        if let Some(index) = coords_to_index(x, y) {
            self.cells[index] = color;
        }
    }

    /// Get a single cell, black if out of range
    pub fn get(&self, x: u8, y: u8) -> Rgb {
        match coords_to_index(x, y) {
            Some(index) => self.cells[index],
            None => BLACK,
        }
    }

    /// Set every cell to `color`
    pub fn fill(&mut self, color: Rgb) {
        self.cells = [color; PIXEL_COUNT];
    }

    /// Copy every non-black cell of `overlay` on top of this buffer
    pub fn apply_overlay(&mut self, overlay: &PixelBuffer) {
        for (cell, top) in self.cells.iter_mut().zip(overlay.cells.iter()) {
            if *top != BLACK {
                *cell = *top;
            }
        }
    }

    /// Check whether every cell is black
    pub fn is_dark(&self) -> bool {
        self.cells.iter().all(|cell| *cell == BLACK)
    }

    /// Linear view of the cells in hardware order
    pub const fn cells(&self) -> &[Rgb; PIXEL_COUNT] {
        &self.cells
    }

    /// Mutable linear view of the cells in hardware order
    pub fn cells_mut(&mut self) -> &mut [Rgb; PIXEL_COUNT] {
        &mut self.cells
    }

    /// Push the whole frame to the LED driver
    pub fn show<O: OutputDriver>(&self, output: &mut O) {
        output.write(&self.cells);
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}
