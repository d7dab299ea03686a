//! Test support for the kernel-smoothing crates.
//!
//! - [`generators`]: synthetic input cells (predictable, constant, blob,
//!   sparse, NaN-injected)
//! - [`fixtures`]: the four-cell scenario, views and extents
//! - [`recording`]: doubles that log what the pipeline did to the render
//!   context, the delegate styles and the density estimator
//!
//! Pulled in as a dev-dependency by path:
//!
//! ```ignore
//! use test_utils::{scenario_cells, scenario_view, RecordingContext, RecordingStyle};
//! ```

pub mod fixtures;
pub mod generators;
pub mod recording;

pub use fixtures::*;
pub use generators::*;
pub use recording::*;

/// Assert `|left - right| <= tolerance`, comparing as `f64`.
///
/// An optional trailing format message is appended to the panic text.
///
/// ```ignore
/// assert_approx_eq!(grid_mass, 10.0, 1e-9);
/// assert_approx_eq!(peak, 0.25, 1e-6, "peak at cell {}", idx);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr $(,)?) => {
        $crate::assert_approx_eq!($actual, $expected, $tolerance, "")
    };
    ($actual:expr, $expected:expr, $tolerance:expr, $($msg:tt)+) => {{
        let (actual, expected, tolerance) =
            ($actual as f64, $expected as f64, $tolerance as f64);
        let off_by = (actual - expected).abs();
        if off_by.is_nan() || off_by > tolerance {
            panic!(
                "values differ by {:e} (tolerance {:e}): actual {:?}, expected {:?}. {}",
                off_by,
                tolerance,
                actual,
                expected,
                format_args!($($msg)+)
            );
        }
    }};
}
