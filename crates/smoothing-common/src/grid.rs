//! Geometry of the smoothed output grid.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// Geometry of a regular square-celled grid, planned fresh for every draw.
///
/// Cell `(col, row)` has its lower-left corner at
/// `(origin_x + col * cell_size, origin_y + row * cell_size)`. Values laid out
/// on this grid are row-major: `index = row * count_x + col`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPlan {
    /// Lower-left corner X of the first cell
    pub origin_x: f64,
    /// Lower-left corner Y of the first cell
    pub origin_y: f64,
    /// Side length of one cell, in geographic units
    pub cell_size: f64,
    /// Number of cells in X direction
    pub count_x: usize,
    /// Number of cells in Y direction
    pub count_y: usize,
}

impl GridPlan {
    /// Create a new grid plan.
    pub fn new(origin_x: f64, origin_y: f64, cell_size: f64, count_x: usize, count_y: usize) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_size,
            count_x,
            count_y,
        }
    }

    /// Extent covered by the grid: `origin + count * cell_size` on each axis.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox {
            min_x: self.origin_x,
            min_y: self.origin_y,
            max_x: self.origin_x + self.count_x as f64 * self.cell_size,
            max_y: self.origin_y + self.count_y as f64 * self.cell_size,
        }
    }

    /// Lower-left corner of the cell at a flat row-major index.
    pub fn index_to_coord(&self, index: usize) -> Option<(f64, f64)> {
        if index >= self.len() {
            return None;
        }
        let row = index / self.count_x;
        let col = index % self.count_x;
        Some((
            self.origin_x + col as f64 * self.cell_size,
            self.origin_y + row as f64 * self.cell_size,
        ))
    }

    /// Centre of the cell `(col, row)`.
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.cell_size,
            self.origin_y + (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Get the 1D array index for a 2D grid position.
    pub fn flat_index(&self, col: usize, row: usize) -> usize {
        row * self.count_x + col
    }

    /// Total number of grid cells, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.count_x.saturating_mul(self.count_y)
    }

    /// Check if the grid has zero area.
    pub fn is_empty(&self) -> bool {
        self.count_x == 0 || self.count_y == 0
    }
}
