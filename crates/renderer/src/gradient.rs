//! Colour ramps mapping smoothed values to colours.

use kernel_smoothing::Color;
use serde::{Deserialize, Serialize};
use smoothing_common::{SmoothingError, SmoothingResult};

/// Colour stop for a ramp
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColorStop {
    pub value: f64,
    /// `#RRGGBB` or `#RRGGBBAA`
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ColorStop {
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Self {
            value,
            color: color.into(),
            label: None,
        }
    }
}

/// How ramp stop values relate to the smoothed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RampScale {
    /// Stops are in [0, 1]; values are normalized by the layer's value range
    #[default]
    Normalized,
    /// Stops are in the same units as the smoothed values
    Absolute,
}

/// Piecewise-linear colour ramp.
///
/// Values below the first stop take the first colour, values above the last
/// stop take the last colour. NaN maps to transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<(f64, Color)>,
}

impl ColorRamp {
    /// Build a ramp from stops. Stops are sorted by value.
    pub fn new(stops: &[ColorStop]) -> SmoothingResult<Self> {
        if stops.is_empty() {
            return Err(SmoothingError::invalid_parameter(
                "stops",
                "a colour ramp needs at least one stop",
            ));
        }

        let mut parsed = Vec::with_capacity(stops.len());
        for stop in stops {
            if !stop.value.is_finite() {
                return Err(SmoothingError::invalid_parameter(
                    "stops",
                    format!("stop value must be finite, got {}", stop.value),
                ));
            }
            let color = Color::from_hex(&stop.color).ok_or_else(|| {
                SmoothingError::invalid_parameter(
                    "stops",
                    format!("invalid hex colour '{}'", stop.color),
                )
            })?;
            parsed.push((stop.value, color));
        }
        parsed.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Self { stops: parsed })
    }

    /// Transparent yellow through orange to opaque red, on [0, 1].
    pub fn heat() -> Self {
        Self {
            stops: vec![
                (0.0, Color::new(255, 255, 178, 0)),
                (0.25, Color::new(254, 204, 92, 160)),
                (0.5, Color::new(253, 141, 60, 200)),
                (0.75, Color::new(240, 59, 32, 230)),
                (1.0, Color::new(189, 0, 38, 255)),
            ],
        }
    }

    pub fn stops(&self) -> &[(f64, Color)] {
        &self.stops
    }

    /// Colour for `value`.
    pub fn color_at(&self, value: f64) -> Color {
        if value.is_nan() {
            return Color::transparent();
        }

        let (first_v, first_c) = self.stops[0];
        if value <= first_v {
            return first_c;
        }

        for pair in self.stops.windows(2) {
            let (v0, c0) = pair[0];
            let (v1, c1) = pair[1];
            if value <= v1 {
                let span = v1 - v0;
                let t = if span > 0.0 { (value - v0) / span } else { 1.0 };
                return c0.lerp(c1, t);
            }
        }

        self.stops[self.stops.len() - 1].1
    }

    /// Colour for `value` under `scale`, given the layer's `(min, max)` range.
    pub fn color_for(&self, value: f64, scale: RampScale, range: (f64, f64)) -> Color {
        match scale {
            RampScale::Absolute => self.color_at(value),
            RampScale::Normalized => {
                let (min, max) = range;
                let span = max - min;
                let t = if span > 0.0 { (value - min) / span } else { 1.0 };
                self.color_at(t)
            }
        }
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::heat()
    }
}
