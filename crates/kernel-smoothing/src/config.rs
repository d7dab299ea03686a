//! Configuration for the smoothing pipeline.
//!
//! [`SmoothingConfig`] carries the accessor closures and delegate styles and
//! is built in code. [`SmoothingSettings`] is its serializable subset, loaded
//! from JSON or environment variables, and turned into a config with
//! [`SmoothingSettings::into_config`].

use serde::{Deserialize, Serialize};
use smoothing_common::{SmoothingError, SmoothingResult, DEFAULT_SMOOTHED_PROPERTY};

use crate::composite::DelegateStyle;
use crate::density::{GaussianKde, NonFinitePolicy, DEFAULT_TRUNCATION};
use crate::plan::ExtentPolicy;

/// Per-cell value accessor.
pub type ValueFn<C> = Box<dyn Fn(&C) -> f64 + Send + Sync>;
/// `(input_resolution, zoom) -> geographic length`.
pub type ResolutionFn = Box<dyn Fn(f64, f64) -> f64 + Send + Sync>;
/// Predicate over input cells.
pub type CellFilter<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;
/// Predicate over smoothed values.
pub type ValueFilter = Box<dyn Fn(f64) -> bool + Send + Sync>;

/// Configuration of one kernel-smoothed layer.
pub struct SmoothingConfig<C> {
    /// Value to smooth, read from each input cell.
    pub value: ValueFn<C>,

    /// Kernel bandwidth in geographic units. The larger, the smoother.
    pub sigma: ResolutionFn,

    /// Smoothed cell size. Defaults to half the input resolution.
    pub resolution_smoothed: ResolutionFn,

    /// Input cells failing this predicate are ignored.
    pub filter: Option<CellFilter<C>>,

    /// Smoothed cells whose value fails this predicate are dropped.
    pub filter_smoothed: Option<ValueFilter>,

    /// Name the smoothed value is exposed under.
    pub smoothed_property: String,

    /// Delegate styles, drawn in order.
    pub styles: Vec<Box<dyn DelegateStyle>>,

    pub extent_policy: ExtentPolicy,

    pub non_finite: NonFinitePolicy,
}

impl<C> SmoothingConfig<C> {
    /// Config with the two required functions and defaults for the rest.
    pub fn new<V, S>(value: V, sigma: S) -> Self
    where
        V: Fn(&C) -> f64 + Send + Sync + 'static,
        S: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            value: Box::new(value),
            sigma: Box::new(sigma),
            resolution_smoothed: Box::new(|resolution, _zoom| resolution / 2.0),
            filter: None,
            filter_smoothed: None,
            smoothed_property: DEFAULT_SMOOTHED_PROPERTY.to_string(),
            styles: Vec::new(),
            extent_policy: ExtentPolicy::default(),
            non_finite: NonFinitePolicy::default(),
        }
    }

    pub fn with_resolution_smoothed<F>(mut self, f: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.resolution_smoothed = Box::new(f);
        self
    }

    pub fn with_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(f));
        self
    }

    pub fn with_filter_smoothed<F>(mut self, f: F) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        self.filter_smoothed = Some(Box::new(f));
        self
    }

    pub fn with_smoothed_property(mut self, name: impl Into<String>) -> Self {
        self.smoothed_property = name.into();
        self
    }

    /// Append a delegate style; styles draw in the order they are added.
    pub fn with_style(mut self, style: impl DelegateStyle + 'static) -> Self {
        self.styles.push(Box::new(style));
        self
    }

    pub fn with_styles(mut self, styles: Vec<Box<dyn DelegateStyle>>) -> Self {
        self.styles.extend(styles);
        self
    }

    pub fn with_extent_policy(mut self, policy: ExtentPolicy) -> Self {
        self.extent_policy = policy;
        self
    }

    pub fn with_non_finite(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    /// The smoothed-value filter as a plain predicate.
    pub fn smoothed_filter(&self) -> Option<&dyn Fn(f64) -> bool> {
        match &self.filter_smoothed {
            Some(f) => Some(&**f),
            None => None,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SmoothingResult<()> {
        if self.smoothed_property.trim().is_empty() {
            return Err(SmoothingError::invalid_parameter(
                "smoothed_property",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

impl<C> std::fmt::Debug for SmoothingConfig<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmoothingConfig")
            .field("smoothed_property", &self.smoothed_property)
            .field("filter", &self.filter.is_some())
            .field("filter_smoothed", &self.filter_smoothed.is_some())
            .field(
                "styles",
                &self.styles.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("extent_policy", &self.extent_policy)
            .field("non_finite", &self.non_finite)
            .finish()
    }
}

/// Serializable smoothing parameters.
///
/// Bandwidth and smoothed cell size are expressed relative to the input
/// resolution: `sigma = sigma_factor * resolution` and
/// `cell_size = resolution / resolution_divisor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    /// Bandwidth as a multiple of the input resolution.
    pub sigma_factor: f64,

    /// Input resolution divided by this gives the smoothed cell size.
    pub resolution_divisor: f64,

    /// Name the smoothed value is exposed under.
    pub smoothed_property: String,

    pub extent_policy: ExtentPolicy,

    pub non_finite: NonFinitePolicy,

    /// Gaussian kernel extent in standard deviations.
    pub kernel_truncation: f64,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            sigma_factor: 1.0,
            resolution_divisor: 2.0,
            smoothed_property: DEFAULT_SMOOTHED_PROPERTY.to_string(),
            extent_policy: ExtentPolicy::DataBound,
            non_finite: NonFinitePolicy::Skip,
            kernel_truncation: DEFAULT_TRUNCATION,
        }
    }
}

impl SmoothingSettings {
    /// Load settings from environment variables, starting from defaults.
    pub fn from_env() -> SmoothingResult<Self> {
        let mut settings = Self::default();

        if let Ok(val) = std::env::var("SMOOTHING_SIGMA_FACTOR") {
            settings.sigma_factor = parse_env("SMOOTHING_SIGMA_FACTOR", &val)?;
        }

        if let Ok(val) = std::env::var("SMOOTHING_RESOLUTION_DIVISOR") {
            settings.resolution_divisor = parse_env("SMOOTHING_RESOLUTION_DIVISOR", &val)?;
        }

        if let Ok(val) = std::env::var("SMOOTHING_PROPERTY") {
            settings.smoothed_property = val;
        }

        if let Ok(val) = std::env::var("SMOOTHING_EXTENT_POLICY") {
            settings.extent_policy = ExtentPolicy::parse(&val).ok_or_else(|| {
                unknown_env("SMOOTHING_EXTENT_POLICY", &val, "data_bound, viewport_bound")
            })?;
        }

        if let Ok(val) = std::env::var("SMOOTHING_NON_FINITE") {
            settings.non_finite = NonFinitePolicy::parse(&val)
                .ok_or_else(|| unknown_env("SMOOTHING_NON_FINITE", &val, "skip, reject"))?;
        }

        if let Ok(val) = std::env::var("SMOOTHING_KERNEL_TRUNCATION") {
            settings.kernel_truncation = parse_env("SMOOTHING_KERNEL_TRUNCATION", &val)?;
        }

        Ok(settings)
    }

    /// Load settings from a JSON string. Missing fields take their defaults.
    pub fn from_json(json_str: &str) -> SmoothingResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load settings from a JSON file.
    pub fn from_file(path: &str) -> SmoothingResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SmoothingError::Config(format!("cannot read {}: {}", path, e)))?;
        Self::from_json(&content)
    }

    /// Validate the settings.
    pub fn validate(&self) -> SmoothingResult<()> {
        for (param, value) in [
            ("sigma_factor", self.sigma_factor),
            ("resolution_divisor", self.resolution_divisor),
            ("kernel_truncation", self.kernel_truncation),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SmoothingError::invalid_parameter(
                    param,
                    format!("must be a finite value > 0, got {}", value),
                ));
            }
        }

        if self.smoothed_property.trim().is_empty() {
            return Err(SmoothingError::invalid_parameter(
                "smoothed_property",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Gaussian estimator matching these settings.
    pub fn estimator(&self) -> SmoothingResult<GaussianKde> {
        GaussianKde::with_truncation(self.kernel_truncation)
    }

    /// Build a pipeline configuration around the given value accessor.
    pub fn into_config<C, V>(self, value: V) -> SmoothingResult<SmoothingConfig<C>>
    where
        V: Fn(&C) -> f64 + Send + Sync + 'static,
    {
        self.validate()?;

        let sigma_factor = self.sigma_factor;
        let divisor = self.resolution_divisor;

        Ok(
            SmoothingConfig::new(value, move |resolution, _zoom| resolution * sigma_factor)
                .with_resolution_smoothed(move |resolution, _zoom| resolution / divisor)
                .with_smoothed_property(self.smoothed_property)
                .with_extent_policy(self.extent_policy)
                .with_non_finite(self.non_finite),
        )
    }
}

fn parse_env(name: &str, value: &str) -> SmoothingResult<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| SmoothingError::Config(format!("{} is not a number: '{}'", name, value)))
}

fn unknown_env(name: &str, value: &str, expected: &str) -> SmoothingError {
    SmoothingError::Config(format!(
        "{} has unknown value '{}' (expected one of: {})",
        name, value, expected
    ))
}
