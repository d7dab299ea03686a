//! Recording test doubles for the render context, delegate styles and the
//! density estimator.
//!
//! Each double keeps an ordered log of what it was asked to do so tests can
//! assert on call order, state changes and arguments without a real surface.

use kernel_smoothing::{
    BlendMode, Color, DelegateStyle, DensityEstimator, GaussianKde, RenderContext, WeightedSample,
};
use smoothing_common::{
    GeoTransform, GridPlan, SmoothedLayer, SmoothingError, SmoothingResult, ViewState,
};
use std::sync::{Arc, Mutex};

/// Drawing state tracked by [`RecordingContext`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedState {
    pub alpha: f64,
    pub blend: BlendMode,
    pub transform: GeoTransform,
}

impl Default for RecordedState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            blend: BlendMode::Normal,
            transform: GeoTransform::identity(),
        }
    }
}

/// One call made on a [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContextCall {
    Save,
    Restore,
    Alpha(f64),
    Blend(BlendMode),
    Transform(GeoTransform),
    /// A rectangle fill, with the state it was drawn under
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        state: RecordedState,
    },
    /// A whole-view fill, with the state it was drawn under
    FillView { color: Color, state: RecordedState },
}

/// In-memory [`RenderContext`] that logs every call.
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<ContextCall>,
    state: RecordedState,
    stack: Vec<RecordedState>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[ContextCall] {
        &self.calls
    }

    /// Current drawing state.
    pub fn state(&self) -> RecordedState {
        self.state
    }

    /// Number of `save` calls not yet matched by a `restore`.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn count_saves(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, ContextCall::Save)).count()
    }

    pub fn count_restores(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ContextCall::Restore))
            .count()
    }

    /// All rectangle fills, in order.
    pub fn fills(&self) -> Vec<&ContextCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, ContextCall::FillRect { .. }))
            .collect()
    }

    /// All whole-view fills, in order.
    pub fn view_fills(&self) -> Vec<&ContextCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, ContextCall::FillView { .. }))
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl RenderContext for RecordingContext {
    fn save(&mut self) {
        self.calls.push(ContextCall::Save);
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        self.calls.push(ContextCall::Restore);
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.calls.push(ContextCall::Alpha(alpha));
        self.state.alpha = alpha;
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.calls.push(ContextCall::Blend(mode));
        self.state.blend = mode;
    }

    fn set_transform(&mut self, transform: &GeoTransform) {
        self.calls.push(ContextCall::Transform(*transform));
        self.state.transform = *transform;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.calls.push(ContextCall::FillRect {
            x,
            y,
            width,
            height,
            color,
            state: self.state,
        });
    }

    fn fill_view(&mut self, color: Color) {
        self.calls.push(ContextCall::FillView {
            color,
            state: self.state,
        });
    }
}

/// Something a [`RecordingStyle`] was asked or did.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleEvent {
    /// A capability query (`visible`, `alpha`, `blend_operation`, `filter_color`)
    Query { style: String, capability: &'static str },
    /// A draw over the given smoothed cells, as `(x, y, value)`
    Draw {
        style: String,
        property: String,
        cells: Vec<(f64, f64, f64)>,
    },
    /// A filter overlay draw
    Filter { style: String, color: Color },
}

/// Shared, ordered log several [`RecordingStyle`]s can write to.
pub type StyleLog = Arc<Mutex<Vec<StyleEvent>>>;

/// Create an empty shared style log.
pub fn style_log() -> StyleLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Delegate style that records its queries and draws.
///
/// Draws one `fill_rect` per smoothed cell in `color`, sized to the layer's
/// cell size.
#[derive(Debug, Clone)]
pub struct RecordingStyle {
    name: String,
    log: StyleLog,
    color: Color,
    visible: bool,
    alpha: Option<f64>,
    blend: Option<BlendMode>,
    filter: Option<Color>,
    fail: bool,
    panic: bool,
}

impl RecordingStyle {
    pub fn new(name: impl Into<String>, log: &StyleLog) -> Self {
        Self {
            name: name.into(),
            log: Arc::clone(log),
            color: Color::new(255, 0, 0, 255),
            visible: true,
            alpha: None,
            blend: None,
            filter: None,
            fail: false,
            panic: false,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
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

    pub fn with_filter(mut self, color: Color) -> Self {
        self.filter = Some(color);
        self
    }

    /// Make `draw` return an error after filling its cells.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Make `draw` panic after filling its cells.
    pub fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    fn record(&self, event: StyleEvent) {
        if let Ok(mut log) = self.log.lock() {
            log.push(event);
        }
    }

    fn query(&self, capability: &'static str) {
        self.record(StyleEvent::Query {
            style: self.name.clone(),
            capability,
        });
    }
}

impl DelegateStyle for RecordingStyle {
    fn name(&self) -> &str {
        &self.name
    }

    fn visible(&self, _zoom: f64) -> bool {
        self.query("visible");
        self.visible
    }

    fn alpha(&self, _zoom: f64) -> Option<f64> {
        self.query("alpha");
        self.alpha
    }

    fn blend_operation(&self, _zoom: f64) -> Option<BlendMode> {
        self.query("blend_operation");
        self.blend
    }

    fn filter_color(&self, _zoom: f64) -> Option<Color> {
        self.query("filter_color");
        self.filter
    }

    fn draw_filter(&self, ctx: &mut dyn RenderContext, color: Color) -> SmoothingResult<()> {
        self.record(StyleEvent::Filter {
            style: self.name.clone(),
            color,
        });
        ctx.fill_view(color);
        Ok(())
    }

    fn draw(
        &self,
        layer: &SmoothedLayer,
        _view: &ViewState,
        ctx: &mut dyn RenderContext,
    ) -> SmoothingResult<()> {
        self.record(StyleEvent::Draw {
            style: self.name.clone(),
            property: layer.property.clone(),
            cells: layer.iter().map(|c| (c.x, c.y, c.value)).collect(),
        });

        for cell in layer {
            ctx.fill_rect(cell.x, cell.y, layer.cell_size, layer.cell_size, self.color);
        }

        if self.panic {
            panic!("style '{}' panicked", self.name);
        }
        if self.fail {
            return Err(SmoothingError::Render(format!("{} could not draw", self.name)));
        }
        Ok(())
    }
}

/// Snapshot of every event logged so far.
pub fn events(log: &StyleLog) -> Vec<StyleEvent> {
    log.lock().map(|l| l.clone()).unwrap_or_default()
}

/// Names of the styles that drew, in draw order.
pub fn draw_order(log: &StyleLog) -> Vec<String> {
    events(log)
        .into_iter()
        .filter_map(|e| match e {
            StyleEvent::Draw { style, .. } => Some(style),
            _ => None,
        })
        .collect()
}

/// One call made on a [`CountingEstimator`].
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorCall {
    pub samples: Vec<WeightedSample>,
    pub bandwidth: f64,
    pub plan: GridPlan,
}

/// Density estimator that delegates to [`GaussianKde`] and records its inputs.
#[derive(Debug, Default)]
pub struct CountingEstimator {
    inner: GaussianKde,
    calls: Mutex<Vec<EstimatorCall>>,
}

impl CountingEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<EstimatorCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl DensityEstimator for CountingEstimator {
    fn estimate(
        &self,
        samples: &[WeightedSample],
        bandwidth: f64,
        plan: &GridPlan,
    ) -> SmoothingResult<Vec<f64>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(EstimatorCall {
                samples: samples.to_vec(),
                bandwidth,
                plan: *plan,
            });
        }
        self.inner.estimate(samples, bandwidth, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_context_tracks_state() {
        let mut ctx = RecordingContext::new();
        ctx.save();
        ctx.set_global_alpha(0.5);
        ctx.fill_rect(0.0, 0.0, 1.0, 1.0, Color::new(1, 2, 3, 255));
        ctx.restore();

        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.state().alpha, 1.0);
        match ctx.fills()[0] {
            ContextCall::FillRect { state, .. } => assert_eq!(state.alpha, 0.5),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_recording_style_logs_queries() {
        let log = style_log();
        let style = RecordingStyle::new("a", &log).with_alpha(0.3);
        assert!(style.visible(1.0));
        assert_eq!(style.alpha(1.0), Some(0.3));
        assert_eq!(events(&log).len(), 2);
    }
}
