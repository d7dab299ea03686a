//! Common types shared across the kernel-smoothing workspace.

pub mod bbox;
pub mod cell;
pub mod error;
pub mod grid;
pub mod view;

pub use bbox::BoundingBox;
pub use cell::{Cell, GridCell, SmoothedCell, SmoothedLayer, DEFAULT_SMOOTHED_PROPERTY};
pub use error::{SmoothingError, SmoothingResult};
pub use grid::GridPlan;
pub use view::{GeoTransform, ViewState};
