//! Raster rendering for smoothed layers.
//!
//! Provides the pieces a host needs to turn a [`kernel_smoothing`] draw into
//! an image:
//! - [`PixmapCanvas`]: a tiny-skia backed `RenderContext`
//! - [`ColorRamp`]: value to colour mapping from hex stops
//! - [`SquareStyle`]: a delegate style filling each smoothed cell
//! - [`StyleConfig`]: JSON configuration for a list of square styles

pub mod canvas;
pub mod gradient;
pub mod square;
pub mod style;

pub use canvas::PixmapCanvas;
pub use gradient::{ColorRamp, ColorStop, RampScale};
pub use square::SquareStyle;
pub use style::{SquareStyleConfig, StyleConfig};
