//! Kernel smoothing of weighted grid cells for pan/zoom map viewers.
//!
//! Raw cells of a fixed-resolution grid are resampled onto a denser grid with
//! a 2D weighted kernel density estimate, then handed to an ordered list of
//! delegate styles that draw the smoothed layer.
//!
//! # Architecture
//!
//! ```text
//! draw(cells, view, resolution, ctx)
//!      │
//!      ├─► pre-filter input cells            (SmoothingConfig::filter)
//!      │
//!      ├─► plan_grid()                        extent + counts + cell size
//!      │
//!      ├─► DensityEstimator::estimate()       row-major density grid
//!      │
//!      ├─► materialize()                      lazy SmoothedCell sequence
//!      │
//!      └─► composite()                        per delegate: visible? ─► save ─►
//!                                             alpha/blend ─► transform ─► draw
//!                                             ─► restore
//! ```
//!
//! Nothing is retained between draws: every call plans, estimates and
//! materializes from scratch.
//!
//! # Example
//!
//! ```ignore
//! use kernel_smoothing::{KernelSmoothingStyle, SmoothingConfig};
//! use smoothing_common::{Cell, ViewState};
//!
//! let config = SmoothingConfig::new(
//!     |c: &Cell| c.value("population").unwrap_or(0.0),
//!     |resolution, _zoom| resolution * 2.0,
//! )
//! .with_style(my_style);
//!
//! let style = KernelSmoothingStyle::new(config)?;
//! let outcome = style.draw(&cells, &view, 1000.0, &mut canvas)?;
//! ```

pub mod composite;
pub mod config;
pub mod context;
pub mod density;
pub mod materialize;
pub mod pipeline;
pub mod plan;

pub use composite::{composite, CompositeStats, DelegateStyle};
pub use config::{SmoothingConfig, SmoothingSettings};
pub use context::{BlendMode, Color, ContextGuard, RenderContext};
pub use density::{prepare_samples, DensityEstimator, GaussianKde, NonFinitePolicy, WeightedSample};
pub use materialize::{materialize, SmoothedCells};
pub use pipeline::{DrawOutcome, KernelSmoothingStyle, LayerStyle, SkipReason};
pub use plan::{plan_grid, ExtentPolicy, MAX_GRID_CELLS};

pub use smoothing_common::{
    BoundingBox, Cell, GeoTransform, GridCell, GridPlan, SmoothedCell, SmoothedLayer,
    SmoothingError, SmoothingResult, ViewState,
};
