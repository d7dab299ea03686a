//! Square delegate style: one filled square per smoothed cell.

use kernel_smoothing::{BlendMode, Color, DelegateStyle, RenderContext};
use smoothing_common::{SmoothedLayer, SmoothingResult, ViewState};

use crate::gradient::{ColorRamp, RampScale};

/// Fills each smoothed cell with its ramp colour.
#[derive(Debug, Clone)]
pub struct SquareStyle {
    name: String,
    ramp: ColorRamp,
    scale: RampScale,
    min_zoom: f64,
    max_zoom: f64,
    alpha: Option<f64>,
    blend: Option<BlendMode>,
    filter_color: Option<Color>,
    size: f64,
}

impl SquareStyle {
    pub fn new(name: impl Into<String>, ramp: ColorRamp) -> Self {
        Self {
            name: name.into(),
            ramp,
            scale: RampScale::default(),
            min_zoom: 0.0,
            max_zoom: f64::INFINITY,
            alpha: None,
            blend: None,
            filter_color: None,
            size: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: RampScale) -> Self {
        self.scale = scale;
        self
    }

    /// Only draw when `min_zoom <= zoom < max_zoom`.
    pub fn with_zoom_range(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_blend(mut self, mode: BlendMode) -> Self {
        self.blend = Some(mode);
        self
    }

    pub fn with_filter_color(mut self, color: Color) -> Self {
        self.filter_color = Some(color);
        self
    }

    /// Square side as a fraction of the cell size, clamped to (0, 1].
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = if size > 0.0 { size.min(1.0) } else { 1.0 };
        self
    }

    pub fn ramp(&self) -> &ColorRamp {
        &self.ramp
    }
}

impl DelegateStyle for SquareStyle {
    fn name(&self) -> &str {
        &self.name
    }

    fn visible(&self, zoom: f64) -> bool {
        zoom >= self.min_zoom && zoom < self.max_zoom
    }

    fn alpha(&self, _zoom: f64) -> Option<f64> {
        self.alpha
    }

    fn blend_operation(&self, _zoom: f64) -> Option<BlendMode> {
        self.blend
    }

    fn filter_color(&self, _zoom: f64) -> Option<Color> {
        self.filter_color
    }

    fn draw(
        &self,
        layer: &SmoothedLayer,
        _view: &ViewState,
        ctx: &mut dyn RenderContext,
    ) -> SmoothingResult<()> {
        let Some(range) = layer.value_range() else {
            return Ok(());
        };

        let side = layer.cell_size * self.size;
        let offset = (layer.cell_size - side) / 2.0;
        let mut drawn = 0usize;

        for cell in layer {
            let color = self.ramp.color_for(cell.value, self.scale, range);
            if color.a == 0 {
                continue;
            }
            ctx.fill_rect(cell.x + offset, cell.y + offset, side, side, color);
            drawn += 1;
        }

        tracing::trace!(
            style = %self.name,
            drawn = drawn,
            min = range.0,
            max = range.1,
            "Drew squares"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_range_visibility() {
        let style = SquareStyle::new("s", ColorRamp::heat()).with_zoom_range(1.0, 10.0);
        assert!(!style.visible(0.5));
        assert!(style.visible(1.0));
        assert!(style.visible(9.99));
        assert!(!style.visible(10.0));
    }

    #[test]
    fn test_size_clamped() {
        let style = SquareStyle::new("s", ColorRamp::heat()).with_size(3.0);
        assert_eq!(style.size, 1.0);
        let style = style.with_size(-1.0);
        assert_eq!(style.size, 1.0);
        let style = style.with_size(0.5);
        assert_eq!(style.size, 0.5);
    }
}
