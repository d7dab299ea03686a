//! JSON style configuration for square delegate styles.

use kernel_smoothing::{BlendMode, Color, DelegateStyle};
use serde::{Deserialize, Serialize};
use smoothing_common::{SmoothingError, SmoothingResult};

use crate::gradient::{ColorRamp, ColorStop, RampScale};
use crate::square::SquareStyle;

/// Style configuration loaded from JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    pub version: String,
    /// Styles in draw order
    pub styles: Vec<SquareStyleConfig>,
}

/// A single square style definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquareStyleConfig {
    pub name: String,
    pub description: Option<String>,
    /// Colour stops. Empty means the built-in heat ramp.
    #[serde(default)]
    pub stops: Vec<ColorStop>,
    #[serde(default)]
    pub scale: RampScale,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub alpha: Option<f64>,
    pub blend: Option<BlendMode>,
    /// Overlay drawn over the whole view after the squares
    pub filter_color: Option<String>,
    /// Square side as a fraction of the cell size
    #[serde(default = "default_size")]
    pub size: f64,
}

fn default_size() -> f64 {
    1.0
}

impl SquareStyleConfig {
    /// Build the delegate style this definition describes.
    pub fn to_style(&self) -> SmoothingResult<SquareStyle> {
        let ramp = if self.stops.is_empty() {
            ColorRamp::heat()
        } else {
            ColorRamp::new(&self.stops)?
        };

        let mut style = SquareStyle::new(&self.name, ramp)
            .with_scale(self.scale)
            .with_zoom_range(
                self.min_zoom.unwrap_or(0.0),
                self.max_zoom.unwrap_or(f64::INFINITY),
            )
            .with_size(self.size);

        if let Some(alpha) = self.alpha {
            style = style.with_alpha(alpha);
        }
        if let Some(blend) = self.blend {
            style = style.with_blend(blend);
        }
        if let Some(hex) = &self.filter_color {
            let color = Color::from_hex(hex).ok_or_else(|| {
                SmoothingError::style(&self.name, format!("invalid filter colour '{}'", hex))
            })?;
            style = style.with_filter_color(color);
        }

        Ok(style)
    }
}

impl StyleConfig {
    /// Load style configuration from JSON string
    pub fn from_json(json_str: &str) -> SmoothingResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load style configuration from file
    pub fn from_file(path: &str) -> SmoothingResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SmoothingError::Config(format!("cannot read {}: {}", path, e)))?;
        Self::from_json(&content)
    }

    /// Get a specific style definition
    pub fn get_style(&self, name: &str) -> Option<&SquareStyleConfig> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Build every style, keeping the configured order.
    pub fn build_styles(&self) -> SmoothingResult<Vec<Box<dyn DelegateStyle>>> {
        self.styles
            .iter()
            .map(|s| s.to_style().map(|style| Box::new(style) as Box<dyn DelegateStyle>))
            .collect()
    }
}
