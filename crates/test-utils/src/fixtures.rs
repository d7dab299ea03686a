//! Common test fixtures: reference extents, views and cell sets.

use smoothing_common::{BoundingBox, Cell, ViewState};

/// Field name the fixture cells carry their value under.
pub const VALUE_FIELD: &str = "value";

/// Common bounding boxes as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Unit square
    pub const UNIT: (f64, f64, f64, f64) = (0.0, 0.0, 1.0, 1.0);

    /// 100 x 100 block at the origin
    pub const BLOCK_100: (f64, f64, f64, f64) = (0.0, 0.0, 100.0, 100.0);

    /// Metric extent roughly covering Europe in EPSG:3035
    pub const EUROPE_LAEA: (f64, f64, f64, f64) = (2_500_000.0, 1_400_000.0, 7_400_000.0, 5_500_000.0);

    /// Degenerate box (single point)
    pub const POINT: (f64, f64, f64, f64) = (5.0, 5.0, 5.0, 5.0);
}

/// Build a [`BoundingBox`] from one of the tuple constants.
pub fn bbox_of(b: (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::new(b.0, b.1, b.2, b.3)
}

/// The four-cell reference dataset: 2 x 2 cells of resolution 10.
///
/// | corner   | value |
/// |----------|-------|
/// | (0, 0)   | 10    |
/// | (10, 0)  | 20    |
/// | (0, 10)  | 30    |
/// | (10, 10) | 40    |
pub fn scenario_cells() -> Vec<Cell> {
    vec![
        Cell::new(0.0, 0.0).with_value(VALUE_FIELD, 10.0),
        Cell::new(10.0, 0.0).with_value(VALUE_FIELD, 20.0),
        Cell::new(0.0, 10.0).with_value(VALUE_FIELD, 30.0),
        Cell::new(10.0, 10.0).with_value(VALUE_FIELD, 40.0),
    ]
}

/// Input resolution of [`scenario_cells`].
pub const SCENARIO_RESOLUTION: f64 = 10.0;

/// View over the scenario cells: zoom 1, 20 x 20 pixels, bbox (0,0)-(20,20).
pub fn scenario_view() -> ViewState {
    ViewState::from_center(10.0, 10.0, 1.0, 20, 20)
}

/// A 256 x 256 view over [`bbox::BLOCK_100`].
pub fn block_view() -> ViewState {
    ViewState::fit_bbox(&bbox_of(bbox::BLOCK_100), 256, 256)
}
