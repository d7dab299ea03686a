//! Rendering surface abstraction and scoped state handling.
//!
//! The host owns the drawing surface; the pipeline only touches it through
//! [`RenderContext`]. Any state the pipeline changes (alpha, blend mode,
//! transform) is changed inside a [`ContextGuard`], which restores the saved
//! state when dropped, including on early returns and panics.

use serde::{Deserialize, Serialize};
use smoothing_common::{GeoTransform, SmoothingError, SmoothingResult};
use std::ops::{Deref, DerefMut};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (hash optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        let a = if hex.len() == 8 { channel(6)? } else { 255 };

        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Linear interpolation between two colors, `t` clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

/// Compositing operation applied when drawing onto the surface.
///
/// Names follow the HTML canvas `globalCompositeOperation` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Lighter,
}

impl BlendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Lighter => "lighter",
        }
    }
}

impl std::str::FromStr for BlendMode {
    type Err = SmoothingError;

    fn from_str(s: &str) -> SmoothingResult<Self> {
        let mode = match s.to_lowercase().as_str() {
            "normal" | "source-over" => Self::Normal,
            "multiply" => Self::Multiply,
            "screen" => Self::Screen,
            "overlay" => Self::Overlay,
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            "color-dodge" => Self::ColorDodge,
            "color-burn" => Self::ColorBurn,
            "hard-light" => Self::HardLight,
            "soft-light" => Self::SoftLight,
            "difference" => Self::Difference,
            "exclusion" => Self::Exclusion,
            "lighter" | "plus" => Self::Lighter,
            other => {
                return Err(SmoothingError::invalid_parameter(
                    "blend_operation",
                    format!("unknown blend mode '{}'", other),
                ))
            }
        };
        Ok(mode)
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Drawing surface owned by the host.
///
/// `fill_rect` coordinates are interpreted through the current transform;
/// `fill_view` covers the whole surface in screen space.
pub trait RenderContext {
    /// Push the current alpha, blend mode and transform.
    fn save(&mut self);

    /// Pop the state pushed by the matching `save`.
    fn restore(&mut self);

    fn set_global_alpha(&mut self, alpha: f64);

    fn set_blend_mode(&mut self, mode: BlendMode);

    fn set_transform(&mut self, transform: &GeoTransform);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);

    fn fill_view(&mut self, color: Color);
}

/// Scoped context state: `save` on acquire, `restore` on drop.
pub struct ContextGuard<'a, C: RenderContext + ?Sized> {
    ctx: &'a mut C,
}

impl<'a, C: RenderContext + ?Sized> ContextGuard<'a, C> {
    pub fn acquire(ctx: &'a mut C) -> Self {
        ctx.save();
        Self { ctx }
    }
}

impl<C: RenderContext + ?Sized> Deref for ContextGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.ctx
    }
}

impl<C: RenderContext + ?Sized> DerefMut for ContextGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.ctx
    }
}

impl<C: RenderContext + ?Sized> Drop for ContextGuard<'_, C> {
    fn drop(&mut self) {
        self.ctx.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[derive(Default)]
    struct DepthContext {
        depth: usize,
        alpha: f64,
        stack: Vec<f64>,
    }

    impl RenderContext for DepthContext {
        fn save(&mut self) {
            self.depth += 1;
            self.stack.push(self.alpha);
        }
        fn restore(&mut self) {
            self.depth -= 1;
            self.alpha = self.stack.pop().unwrap_or(1.0);
        }
        fn set_global_alpha(&mut self, alpha: f64) {
            self.alpha = alpha;
        }
        fn set_blend_mode(&mut self, _mode: BlendMode) {}
        fn set_transform(&mut self, _transform: &GeoTransform) {}
        fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, _color: Color) {}
        fn fill_view(&mut self, _color: Color) {}
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut ctx = DepthContext { alpha: 1.0, ..Default::default() };
        {
            let mut guard = ContextGuard::acquire(&mut ctx);
            guard.set_global_alpha(0.25);
            assert_eq!(guard.depth, 1);
        }
        assert_eq!(ctx.depth, 0);
        assert_eq!(ctx.alpha, 1.0);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let mut ctx = DepthContext { alpha: 1.0, ..Default::default() };
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut guard = ContextGuard::acquire(&mut ctx);
            guard.set_global_alpha(0.5);
            panic!("delegate blew up");
        }));
        assert!(result.is_err());
        assert_eq!(ctx.depth, 0);
        assert_eq!(ctx.alpha, 1.0);
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::new(255, 0, 0, 255)));
        assert_eq!(Color::from_hex("00ff0080"), Some(Color::new(0, 255, 0, 128)));
        assert_eq!(Color::from_hex("#GGGGGG"), None);
        assert_eq!(Color::from_hex("#FFF"), None);
    }

    #[test]
    fn test_blend_mode_parse() {
        assert_eq!("source-over".parse::<BlendMode>().unwrap(), BlendMode::Normal);
        assert_eq!("Multiply".parse::<BlendMode>().unwrap(), BlendMode::Multiply);
        assert!("bogus".parse::<BlendMode>().is_err());
        let json = serde_json::to_string(&BlendMode::ColorDodge).unwrap();
        assert_eq!(json, "\"color-dodge\"");
    }
}
