//! Input cell generators for synthetic gridded datasets.
//!
//! These generators create predictable, verifiable cell sets that can be
//! used across the test suite and the benchmarks.

use smoothing_common::Cell;

/// Creates a regular block of cells with predictable values.
///
/// Cell `(col, row)` sits at `(col * resolution, row * resolution)` and
/// carries `field = col * 1000 + row`.
///
/// # Example
///
/// ```
/// use test_utils::create_test_cells;
///
/// let cells = create_test_cells(10, 5, 2.0, "value");
/// assert_eq!(cells.len(), 50);
/// assert_eq!(cells[1].x, 2.0);
/// assert_eq!(cells[1].value("value"), Some(1000.0));
/// assert_eq!(cells[10].value("value"), Some(1.0));
/// ```
pub fn create_test_cells(width: usize, height: usize, resolution: f64, field: &str) -> Vec<Cell> {
    create_cells_with(width, height, resolution, field, |col, row| {
        (col * 1000 + row) as f64
    })
}

/// Creates a block of cells all carrying the same value.
pub fn create_constant_cells(
    width: usize,
    height: usize,
    resolution: f64,
    field: &str,
    value: f64,
) -> Vec<Cell> {
    create_cells_with(width, height, resolution, field, |_, _| value)
}

/// Creates a block of cells with a single Gaussian bump in the middle.
///
/// Values peak at `peak` in the centre cell and fall off with a spread of a
/// quarter of the block width. Useful for checking that smoothing keeps the
/// maximum where the data has it.
pub fn create_blob_cells(
    width: usize,
    height: usize,
    resolution: f64,
    field: &str,
    peak: f64,
) -> Vec<Cell> {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let spread = (width.max(height) as f64 / 4.0).max(1.0);

    create_cells_with(width, height, resolution, field, |col, row| {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        peak * (-(dx * dx + dy * dy) / (2.0 * spread * spread)).exp()
    })
}

/// Creates a sparse scatter of cells with pseudo-random values in `[0, 100)`.
///
/// Roughly `density` of the block positions are populated. The same seed
/// always produces the same cells.
pub fn create_sparse_cells(
    width: usize,
    height: usize,
    resolution: f64,
    field: &str,
    density: f64,
    seed: u32,
) -> Vec<Cell> {
    let threshold = (density.clamp(0.0, 1.0) * u32::MAX as f64) as u32;
    let mut cells = Vec::new();

    for row in 0..height {
        for col in 0..width {
            let h = simple_hash(col as u32, row as u32, seed);
            if h > threshold {
                continue;
            }
            let value = (simple_hash(row as u32, col as u32, seed ^ 0x9e37) % 10_000) as f64 / 100.0;
            cells.push(
                Cell::new(col as f64 * resolution, row as f64 * resolution).with_value(field, value),
            );
        }
    }

    cells
}

/// Replace the value at the given indices with NaN.
pub fn with_nan_values(mut cells: Vec<Cell>, field: &str, indices: &[usize]) -> Vec<Cell> {
    for &i in indices {
        if let Some(cell) = cells.get_mut(i) {
            cell.values.insert(field.to_string(), f64::NAN);
        }
    }
    cells
}

fn create_cells_with(
    width: usize,
    height: usize,
    resolution: f64,
    field: &str,
    value: impl Fn(usize, usize) -> f64,
) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            cells.push(
                Cell::new(col as f64 * resolution, row as f64 * resolution)
                    .with_value(field, value(col, row)),
            );
        }
    }
    cells
}

/// Simple hash function for deterministic pseudo-random values.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
