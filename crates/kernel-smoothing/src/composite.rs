//! Compositing of delegate styles over one smoothed layer.

use smoothing_common::{SmoothedLayer, SmoothingError, SmoothingResult, ViewState};

use crate::context::{BlendMode, Color, ContextGuard, RenderContext};

/// A drawing routine invoked against the materialized smoothed cells.
///
/// Only `draw` is required. The optional capabilities are queried with the
/// current zoom (geographic units per pixel) on every draw.
pub trait DelegateStyle {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        "style"
    }

    /// Whether the style is drawn at this zoom.
    fn visible(&self, _zoom: f64) -> bool {
        true
    }

    /// Global alpha in [0, 1]. `None` keeps the context untouched.
    fn alpha(&self, _zoom: f64) -> Option<f64> {
        None
    }

    /// Blend mode. `None` keeps the context untouched.
    fn blend_operation(&self, _zoom: f64) -> Option<BlendMode> {
        None
    }

    /// Color of an overlay drawn right after the style.
    fn filter_color(&self, _zoom: f64) -> Option<Color> {
        None
    }

    /// Draw the filter overlay. Fills the whole view by default.
    fn draw_filter(&self, ctx: &mut dyn RenderContext, color: Color) -> SmoothingResult<()> {
        ctx.fill_view(color);
        Ok(())
    }

    /// Draw the smoothed cells in geographic coordinates.
    fn draw(
        &self,
        layer: &SmoothedLayer,
        view: &ViewState,
        ctx: &mut dyn RenderContext,
    ) -> SmoothingResult<()>;
}

/// Counts of what happened during one composite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositeStats {
    /// Delegates that were drawn
    pub drawn: usize,
    /// Delegates skipped by their visibility predicate
    pub hidden: usize,
}

/// Draw every delegate, in list order, over the same layer.
///
/// Invisible delegates are skipped before any other query. Every visible
/// delegate draws inside a [`ContextGuard`], so the transform, alpha and blend
/// mode it runs under are restored even if it fails. Alpha and blend are only
/// set for delegates that declare alpha, a blend mode or a filter overlay.
/// The first failure aborts the pass and is returned as
/// [`SmoothingError::Style`].
pub fn composite(
    layer: &SmoothedLayer,
    delegates: &[Box<dyn DelegateStyle>],
    view: &ViewState,
    ctx: &mut dyn RenderContext,
) -> SmoothingResult<CompositeStats> {
    let zoom = view.zoom;
    let mut stats = CompositeStats::default();

    for style in delegates {
        let style: &dyn DelegateStyle = &**style;

        if !style.visible(zoom) {
            tracing::trace!(style = style.name(), zoom = zoom, "Style hidden at this zoom");
            stats.hidden += 1;
            continue;
        }

        let alpha = style.alpha(zoom);
        let blend = style.blend_operation(zoom);
        let filter = style.filter_color(zoom);

        let mut guard = ContextGuard::acquire(&mut *ctx);
        if alpha.is_some() || blend.is_some() || filter.is_some() {
            guard.set_global_alpha(effective_alpha(style.name(), alpha));
            guard.set_blend_mode(blend.unwrap_or_default());
        }
        draw_delegate(style, layer, view, filter, &mut *guard)?;
        drop(guard);

        tracing::trace!(
            style = style.name(),
            cells = layer.len(),
            alpha = ?alpha,
            blend = ?blend,
            "Style drawn"
        );
        stats.drawn += 1;
    }

    Ok(stats)
}

fn draw_delegate(
    style: &dyn DelegateStyle,
    layer: &SmoothedLayer,
    view: &ViewState,
    filter: Option<Color>,
    ctx: &mut dyn RenderContext,
) -> SmoothingResult<()> {
    ctx.set_transform(&view.transform());

    style
        .draw(layer, view, ctx)
        .map_err(|e| as_style_error(style.name(), e))?;

    if let Some(color) = filter {
        style
            .draw_filter(ctx, color)
            .map_err(|e| as_style_error(style.name(), e))?;
    }

    Ok(())
}

fn effective_alpha(style: &str, alpha: Option<f64>) -> f64 {
    match alpha {
        None => 1.0,
        Some(a) if a.is_nan() => {
            tracing::warn!(style = style, "Style returned NaN alpha, drawing opaque");
            1.0
        }
        Some(a) if !(0.0..=1.0).contains(&a) => {
            tracing::warn!(style = style, alpha = a, "Style alpha outside [0, 1], clamping");
            a.clamp(0.0, 1.0)
        }
        Some(a) => a,
    }
}

fn as_style_error(style: &str, err: SmoothingError) -> SmoothingError {
    match err {
        SmoothingError::Style { .. } => err,
        other => SmoothingError::style(style, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_alpha() {
        assert_eq!(effective_alpha("s", None), 1.0);
        assert_eq!(effective_alpha("s", Some(0.3)), 0.3);
        assert_eq!(effective_alpha("s", Some(1.7)), 1.0);
        assert_eq!(effective_alpha("s", Some(-0.2)), 0.0);
        assert_eq!(effective_alpha("s", Some(f64::NAN)), 1.0);
    }

    #[test]
    fn test_style_error_wrapping() {
        let err = as_style_error("squares", SmoothingError::Render("surface lost".into()));
        assert_eq!(err.to_string(), "Style 'squares' failed: Rendering failed: surface lost");

        let err = as_style_error("outer", SmoothingError::style("inner", "x"));
        assert!(matches!(err, SmoothingError::Style { ref style, .. } if style == "inner"));
    }
}
