//! The shared escape-count grid.
//!
//! Workers write into the grid concurrently without a lock.  That is
//! sound because the scheduling protocol hands every pixel to exactly
//! one owner at a time; the cells are atomics only so the compiler
//! agrees with us.  Relaxed stores are enough: the results are read
//! after every worker has been joined.

use std::sync::atomic::{AtomicU32, Ordering};

use planes::{Pixel, PixelRect};

/// The value of a cell nobody has written yet.
pub const UNSET: u32 = u32::max_value();

/// A square, row-major grid of escape counts.
#[derive(Debug)]
pub struct EscapeGrid {
    side: usize,
    cells: Vec<AtomicU32>,
}

impl EscapeGrid {
    /// A grid of `side` x `side` unwritten cells.
    pub fn new(side: usize) -> Self {
        EscapeGrid {
            side,
            cells: (0..side * side).map(|_| AtomicU32::new(UNSET)).collect(),
        }
    }

    /// Pixels per side.
    pub fn side(&self) -> usize {
        self.side
    }

    fn offset(&self, pixel: &Pixel) -> usize {
        debug_assert!(pixel.0 < self.side && pixel.1 < self.side);
        pixel.1 * self.side + pixel.0
    }

    /// Record the escape count of one pixel.
    pub fn set(&self, pixel: &Pixel, value: u32) {
        self.cells[self.offset(pixel)].store(value, Ordering::Relaxed);
    }

    /// The escape count of one pixel, or `UNSET`.
    pub fn get(&self, pixel: &Pixel) -> u32 {
        self.cells[self.offset(pixel)].load(Ordering::Relaxed)
    }

    /// Paint a whole block of pixels with one value.
    pub fn fill(&self, block: &PixelRect, value: u32) {
        for (y, x) in iproduct!(block.rows.clone(), block.columns.clone()) {
            self.set(&Pixel(x, y), value);
        }
    }

    /// True once every cell has been written.
    pub fn is_complete(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| cell.load(Ordering::Relaxed) != UNSET)
    }

    /// One row of the grid, left to right.
    pub fn row(&self, y: usize) -> Vec<u32> {
        self.cells[y * self.side..(y + 1) * self.side]
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect()
    }

    /// A copy of the whole grid, row-major from row 0.
    pub fn to_vec(&self) -> Vec<u32> {
        self.cells
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_unwritten() {
        let grid = EscapeGrid::new(3);
        assert_eq!(grid.to_vec(), vec![UNSET; 9]);
        assert!(!grid.is_complete());
    }

    #[test]
    fn set_is_row_major() {
        let grid = EscapeGrid::new(3);
        grid.set(&Pixel(2, 1), 7);
        assert_eq!(grid.get(&Pixel(2, 1)), 7);
        assert_eq!(grid.to_vec()[5], 7);
        assert_eq!(grid.row(1), vec![UNSET, UNSET, 7]);
    }

    #[test]
    fn fill_covers_block_only() {
        let grid = EscapeGrid::new(4);
        grid.fill(
            &PixelRect {
                columns: 1..3,
                rows: 2..4,
            },
            9,
        );
        let painted = grid.to_vec().iter().filter(|&&v| v == 9).count();
        assert_eq!(painted, 4);
        assert_eq!(grid.get(&Pixel(1, 2)), 9);
        assert_eq!(grid.get(&Pixel(2, 3)), 9);
        assert_eq!(grid.get(&Pixel(0, 2)), UNSET);
    }
}
