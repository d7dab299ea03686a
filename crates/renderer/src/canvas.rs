//! tiny-skia backed render context.

use kernel_smoothing::{BlendMode, Color, RenderContext};
use smoothing_common::{GeoTransform, SmoothingError, SmoothingResult, ViewState};
use std::path::Path;
use tiny_skia::{Paint, Pixmap, Rect, Transform};

#[derive(Debug, Clone, Copy)]
struct CanvasState {
    alpha: f64,
    blend: BlendMode,
    transform: GeoTransform,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            blend: BlendMode::Normal,
            transform: GeoTransform::identity(),
        }
    }
}

/// Raster drawing surface implementing [`RenderContext`].
///
/// Rectangles are mapped to pixel space in f64 before rasterizing, so large
/// projected coordinates keep their precision.
pub struct PixmapCanvas {
    pixmap: Pixmap,
    state: CanvasState,
    stack: Vec<CanvasState>,
}

impl PixmapCanvas {
    /// Create a transparent canvas of the given size.
    pub fn new(width: u32, height: u32) -> SmoothingResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            SmoothingError::Render(format!("cannot allocate {}x{} canvas", width, height))
        })?;

        Ok(Self {
            pixmap,
            state: CanvasState::default(),
            stack: Vec::new(),
        })
    }

    /// Canvas sized to the view's screen.
    pub fn for_view(view: &ViewState) -> SmoothingResult<Self> {
        Self::new(view.width_px, view.height_px)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Current global alpha.
    pub fn global_alpha(&self) -> f64 {
        self.state.alpha
    }

    /// Current blend mode.
    pub fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    /// Fill the whole canvas, ignoring the current drawing state.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(tiny_skia::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
    }

    /// Unpremultiplied color of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::new(p.red(), p.green(), p.blue(), p.alpha()))
    }

    /// Encode the canvas as PNG.
    pub fn encode_png(&self) -> SmoothingResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| SmoothingError::Render(format!("PNG encoding failed: {}", e)))
    }

    /// Encode the canvas as PNG and write it to `path`.
    pub fn save_png(&self, path: impl AsRef<Path>) -> SmoothingResult<()> {
        let bytes = self.encode_png()?;
        std::fs::write(path.as_ref(), bytes)?;
        tracing::debug!(path = %path.as_ref().display(), "Saved PNG");
        Ok(())
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let mut c = tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a);
        c.set_alpha(c.alpha() * self.state.alpha as f32);

        let mut paint = Paint::default();
        paint.set_color(c);
        paint.blend_mode = to_skia_blend(self.state.blend);
        paint.anti_alias = false;
        paint
    }

    fn fill_pixel_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color) {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));

        let Some(rect) = Rect::from_ltrb(left as f32, top as f32, right as f32, bottom as f32)
        else {
            return;
        };

        let paint = self.paint(color);
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

impl RenderContext for PixmapCanvas {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => tracing::warn!("restore called without a matching save"),
        }
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn set_transform(&mut self, transform: &GeoTransform) {
        self.state.transform = *transform;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let t = self.state.transform;
        let (x0, y0) = t.apply(x, y);
        let (x1, y1) = t.apply(x + width, y + height);
        self.fill_pixel_rect(x0, y0, x1, y1, color);
    }

    fn fill_view(&mut self, color: Color) {
        let (w, h) = (self.width() as f64, self.height() as f64);
        self.fill_pixel_rect(0.0, 0.0, w, h, color);
    }
}

fn to_skia_blend(mode: BlendMode) -> tiny_skia::BlendMode {
    use tiny_skia::BlendMode as Sk;
    match mode {
        BlendMode::Normal => Sk::SourceOver,
        BlendMode::Multiply => Sk::Multiply,
        BlendMode::Screen => Sk::Screen,
        BlendMode::Overlay => Sk::Overlay,
        BlendMode::Darken => Sk::Darken,
        BlendMode::Lighten => Sk::Lighten,
        BlendMode::ColorDodge => Sk::ColorDodge,
        BlendMode::ColorBurn => Sk::ColorBurn,
        BlendMode::HardLight => Sk::HardLight,
        BlendMode::SoftLight => Sk::SoftLight,
        BlendMode::Difference => Sk::Difference,
        BlendMode::Exclusion => Sk::Exclusion,
        BlendMode::Lighter => Sk::Plus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_canvas_fails() {
        assert!(matches!(
            PixmapCanvas::new(0, 10),
            Err(SmoothingError::Render(_))
        ));
    }

    #[test]
    fn test_save_restore_state() {
        let mut canvas = PixmapCanvas::new(4, 4).unwrap();
        canvas.save();
        canvas.set_global_alpha(0.3);
        canvas.set_blend_mode(BlendMode::Multiply);
        canvas.restore();
        assert_eq!(canvas.global_alpha(), 1.0);
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn test_fill_view_respects_alpha() {
        let mut canvas = PixmapCanvas::new(2, 2).unwrap();
        canvas.set_global_alpha(0.5);
        canvas.fill_view(Color::new(255, 0, 0, 255));
        let p = canvas.pixel(1, 1).unwrap();
        assert!(p.a > 120 && p.a < 135, "alpha {}", p.a);
    }

    #[test]
    fn test_blend_mapping() {
        assert_eq!(to_skia_blend(BlendMode::Normal), tiny_skia::BlendMode::SourceOver);
        assert_eq!(to_skia_blend(BlendMode::Lighter), tiny_skia::BlendMode::Plus);
    }
}
