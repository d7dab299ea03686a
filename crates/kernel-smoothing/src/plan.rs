//! Extent and grid planning for the smoothed layer.

use serde::{Deserialize, Serialize};
use smoothing_common::{BoundingBox, GridCell, GridPlan, SmoothingError, SmoothingResult, ViewState};

/// Largest smoothed grid one draw may allocate: 64 Mi cells, 512 MiB of `f64`.
pub const MAX_GRID_CELLS: usize = 1 << 26;

/// Where the smoothed grid's extent comes from.
///
/// - **DataBound**: the bounding box of the input cells' lower-left corners.
///   Tightest extent, independent of the viewport.
/// - **ViewportBound**: the viewport snapped outward to multiples of the input
///   resolution, so the whole visible area is covered regardless of which
///   cells are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtentPolicy {
    #[default]
    DataBound,
    ViewportBound,
}

impl ExtentPolicy {
    /// Parse from string (case-insensitive, `-` or `_`). `None` if unknown.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "data" | "data_bound" => Some(Self::DataBound),
            "viewport" | "viewport_bound" => Some(Self::ViewportBound),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataBound => "data_bound",
            Self::ViewportBound => "viewport_bound",
        }
    }
}

impl std::fmt::Display for ExtentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plan the smoothed grid for one draw.
///
/// `resolution_fn(input_resolution, zoom)` gives the smoothed cell size.
/// Counts are `ceil(extent / cell_size)` per axis, so the planned grid always
/// covers the chosen extent. An empty cell slice under [`ExtentPolicy::DataBound`]
/// (or a zero-width extent) yields a zero-area plan, which callers treat as
/// "nothing to draw". A grid above [`MAX_GRID_CELLS`] fails with
/// `InvalidParameter` on `resolution_smoothed`.
pub fn plan_grid<T: GridCell>(
    input_resolution: f64,
    view: &ViewState,
    cells: &[T],
    resolution_fn: &dyn Fn(f64, f64) -> f64,
    policy: ExtentPolicy,
) -> SmoothingResult<GridPlan> {
    require_positive("input_resolution", input_resolution)?;

    let cell_size = resolution_fn(input_resolution, view.zoom);
    require_positive("resolution_smoothed", cell_size)?;

    let extent = match policy {
        ExtentPolicy::ViewportBound => Some(view.bbox.snap_outward(input_resolution)),
        ExtentPolicy::DataBound => BoundingBox::from_points(cells.iter().map(|c| (c.x(), c.y()))),
    };

    let plan = match extent {
        Some(extent) => GridPlan::new(
            extent.min_x,
            extent.min_y,
            cell_size,
            cells_along(extent.width(), cell_size)?,
            cells_along(extent.height(), cell_size)?,
        ),
        None => GridPlan::new(0.0, 0.0, cell_size, 0, 0),
    };
    check_grid_size(&plan)?;

    tracing::debug!(
        policy = %policy,
        origin_x = plan.origin_x,
        origin_y = plan.origin_y,
        cell_size = plan.cell_size,
        count_x = plan.count_x,
        count_y = plan.count_y,
        "Planned smoothed grid"
    );

    Ok(plan)
}

fn cells_along(span: f64, cell_size: f64) -> SmoothingResult<usize> {
    if span.is_nan() || span <= 0.0 {
        return Ok(0);
    }
    let count = (span / cell_size).ceil();
    if count > MAX_GRID_CELLS as f64 {
        return Err(grid_too_large(count, cell_size));
    }
    Ok(count as usize)
}

/// Fail with `InvalidParameter` when the plan holds more than [`MAX_GRID_CELLS`].
pub(crate) fn check_grid_size(plan: &GridPlan) -> SmoothingResult<()> {
    match plan.count_x.checked_mul(plan.count_y) {
        Some(n) if n <= MAX_GRID_CELLS => Ok(()),
        _ => Err(grid_too_large(
            plan.count_x as f64 * plan.count_y as f64,
            plan.cell_size,
        )),
    }
}

fn grid_too_large(cells: f64, cell_size: f64) -> SmoothingError {
    SmoothingError::invalid_parameter(
        "resolution_smoothed",
        format!(
            "cell size {} needs {:e} cells, more than the limit of {}",
            cell_size, cells, MAX_GRID_CELLS
        ),
    )
}

/// Fail with `InvalidParameter` unless `value` is finite and strictly positive.
pub(crate) fn require_positive(param: &str, value: f64) -> SmoothingResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SmoothingError::invalid_parameter(
            param,
            format!("must be a finite value > 0, got {}", value),
        ))
    }
}
