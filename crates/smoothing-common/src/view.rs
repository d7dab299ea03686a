//! Viewport state supplied by the host on every draw.

use crate::{BoundingBox, SmoothingError, SmoothingResult};
use serde::{Deserialize, Serialize};

/// Current viewport of the map viewer.
///
/// `zoom` is the view scale: geographic units per screen pixel. Screen pixel
/// rows grow downward while geographic Y grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Geographic extent of the visible area
    pub bbox: BoundingBox,
    /// Geographic units per pixel
    pub zoom: f64,
    /// Screen width in pixels
    pub width_px: u32,
    /// Screen height in pixels
    pub height_px: u32,
}

impl ViewState {
    /// View centred on `(center_x, center_y)` at the given zoom.
    pub fn from_center(center_x: f64, center_y: f64, zoom: f64, width_px: u32, height_px: u32) -> Self {
        let half_w = width_px as f64 * zoom / 2.0;
        let half_h = height_px as f64 * zoom / 2.0;
        Self {
            bbox: BoundingBox::new(
                center_x - half_w,
                center_y - half_h,
                center_x + half_w,
                center_y + half_h,
            ),
            zoom,
            width_px,
            height_px,
        }
    }

    /// Smallest view of the given pixel size that shows all of `bbox`.
    pub fn fit_bbox(bbox: &BoundingBox, width_px: u32, height_px: u32) -> Self {
        let zoom_x = bbox.width() / width_px.max(1) as f64;
        let zoom_y = bbox.height() / height_px.max(1) as f64;
        let zoom = zoom_x.max(zoom_y);
        Self::from_center(
            (bbox.min_x + bbox.max_x) / 2.0,
            (bbox.min_y + bbox.max_y) / 2.0,
            zoom,
            width_px,
            height_px,
        )
    }

    /// Check the view can be used for planning and drawing.
    pub fn validate(&self) -> SmoothingResult<()> {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(SmoothingError::invalid_parameter(
                "zoom",
                format!("must be a finite value > 0, got {}", self.zoom),
            ));
        }
        if self.width_px == 0 || self.height_px == 0 {
            return Err(SmoothingError::invalid_parameter(
                "view",
                format!("empty screen size {}x{}", self.width_px, self.height_px),
            ));
        }
        Ok(())
    }

    /// Geographic-to-screen transform for this view.
    pub fn transform(&self) -> GeoTransform {
        GeoTransform {
            sx: 1.0 / self.zoom,
            sy: -1.0 / self.zoom,
            tx: -self.bbox.min_x / self.zoom,
            ty: self.bbox.max_y / self.zoom,
        }
    }

    pub fn geo_to_pix_x(&self, x: f64) -> f64 {
        (x - self.bbox.min_x) / self.zoom
    }

    pub fn geo_to_pix_y(&self, y: f64) -> f64 {
        (self.bbox.max_y - y) / self.zoom
    }

    pub fn pix_to_geo_x(&self, px: f64) -> f64 {
        self.bbox.min_x + px * self.zoom
    }

    pub fn pix_to_geo_y(&self, py: f64) -> f64 {
        self.bbox.max_y - py * self.zoom
    }
}

/// Axis-aligned affine map from geographic to screen coordinates:
/// `px = x * sx + tx`, `py = y * sy + ty`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl GeoTransform {
    pub fn identity() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Map a geographic point to screen space.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.sx + self.tx, y * self.sy + self.ty)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::identity()
    }
}
