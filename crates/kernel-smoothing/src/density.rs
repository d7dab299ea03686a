//! Weighted 2D kernel density estimation over a planned grid.
//!
//! The estimator is a pluggable numerical primitive behind [`DensityEstimator`].
//! Any implementation must:
//! - be deterministic for identical inputs,
//! - return exactly `plan.count_x * plan.count_y` values, row-major,
//! - ignore samples outside the planned extent and never wrap around edges.
//!
//! [`GaussianKde`] is the default: linear binning onto bin centres followed by
//! a separable, truncated Gaussian convolution with zero padding.

use serde::{Deserialize, Serialize};
use smoothing_common::{GridCell, GridPlan, SmoothingError, SmoothingResult};

use crate::plan::{check_grid_size, require_positive};

/// A point sample fed to the estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSample {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

impl WeightedSample {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.weight.is_finite()
    }
}

/// What to do with cells whose position or weight is NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NonFinitePolicy {
    /// Drop the sample and log how many were dropped
    #[default]
    Skip,
    /// Fail the draw with `InvalidData`
    Reject,
}

impl NonFinitePolicy {
    /// Parse from string (case-insensitive). `None` if unknown.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Some(Self::Skip),
            "reject" | "error" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Reduce cells to weighted samples at their cell centres.
///
/// The sample position is the lower-left corner plus half the input
/// resolution on both axes.
pub fn prepare_samples<T: GridCell>(
    cells: &[T],
    input_resolution: f64,
    value: &dyn Fn(&T) -> f64,
    policy: NonFinitePolicy,
) -> SmoothingResult<Vec<WeightedSample>> {
    let half = input_resolution / 2.0;
    let mut samples = Vec::with_capacity(cells.len());
    let mut dropped = 0usize;

    for (index, cell) in cells.iter().enumerate() {
        let sample = WeightedSample {
            x: cell.x() + half,
            y: cell.y() + half,
            weight: value(cell),
        };

        if sample.is_finite() {
            samples.push(sample);
            continue;
        }

        match policy {
            NonFinitePolicy::Skip => dropped += 1,
            NonFinitePolicy::Reject => {
                return Err(SmoothingError::invalid_data(format!(
                    "cell {} has a non-finite position or weight (x={}, y={}, weight={})",
                    index, sample.x, sample.y, sample.weight
                )));
            }
        }
    }

    if dropped > 0 {
        tracing::warn!(
            dropped = dropped,
            total = cells.len(),
            "Skipped cells with non-finite position or weight"
        );
    }

    Ok(samples)
}

/// Weighted 2D density estimation onto a planned grid.
pub trait DensityEstimator {
    /// Estimate the density of `samples` on every cell of `plan`.
    ///
    /// `bandwidth` is the kernel standard deviation in geographic units.
    fn estimate(
        &self,
        samples: &[WeightedSample],
        bandwidth: f64,
        plan: &GridPlan,
    ) -> SmoothingResult<Vec<f64>>;
}

impl<E: DensityEstimator + ?Sized> DensityEstimator for &E {
    fn estimate(
        &self,
        samples: &[WeightedSample],
        bandwidth: f64,
        plan: &GridPlan,
    ) -> SmoothingResult<Vec<f64>> {
        (**self).estimate(samples, bandwidth, plan)
    }
}

/// Default number of standard deviations the Gaussian kernel extends to.
pub const DEFAULT_TRUNCATION: f64 = 4.0;

/// Gaussian kernel density estimate using linear binning.
///
/// Output values are densities per unit area: summing `value * cell_size^2`
/// over the grid gives back the total weight of the in-extent samples, minus
/// whatever kernel mass falls beyond the grid edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKde {
    truncation: f64,
}

impl Default for GaussianKde {
    fn default() -> Self {
        Self {
            truncation: DEFAULT_TRUNCATION,
        }
    }
}

impl GaussianKde {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kernel truncated at `truncation` standard deviations.
    pub fn with_truncation(truncation: f64) -> SmoothingResult<Self> {
        require_positive("kernel_truncation", truncation)?;
        Ok(Self { truncation })
    }

    pub fn truncation(&self) -> f64 {
        self.truncation
    }

    /// Discrete 1D kernel sampled at bin spacing, normalized to unit sum.
    ///
    /// The radius is capped at `max_radius` bins since taps beyond the grid
    /// never contribute.
    pub fn kernel(&self, bandwidth: f64, cell_size: f64, max_radius: usize) -> Vec<f64> {
        let radius = ((self.truncation * bandwidth / cell_size).ceil() as usize).min(max_radius);
        let mut taps: Vec<f64> = (0..=2 * radius)
            .map(|k| {
                let d = (k as f64 - radius as f64) * cell_size / bandwidth;
                (-0.5 * d * d).exp()
            })
            .collect();

        let sum: f64 = taps.iter().sum();
        for t in taps.iter_mut() {
            *t /= sum;
        }
        taps
    }
}

impl DensityEstimator for GaussianKde {
    fn estimate(
        &self,
        samples: &[WeightedSample],
        bandwidth: f64,
        plan: &GridPlan,
    ) -> SmoothingResult<Vec<f64>> {
        require_positive("sigma", bandwidth)?;
        require_positive("cell_size", plan.cell_size)?;

        if plan.is_empty() {
            return Ok(Vec::new());
        }
        check_grid_size(plan)?;

        let (nx, ny) = (plan.count_x, plan.count_y);
        let extent = plan.bbox();
        let mut binned = vec![0.0f64; nx * ny];
        let mut binned_count = 0usize;

        for sample in samples {
            if !sample.is_finite() || !extent.contains_point(sample.x, sample.y) {
                continue;
            }

            let (c0, c1, fx) = linear_bin(sample.x, plan.origin_x, plan.cell_size, nx);
            let (r0, r1, fy) = linear_bin(sample.y, plan.origin_y, plan.cell_size, ny);
            let w = sample.weight;

            binned[r0 * nx + c0] += w * (1.0 - fx) * (1.0 - fy);
            binned[r0 * nx + c1] += w * fx * (1.0 - fy);
            binned[r1 * nx + c0] += w * (1.0 - fx) * fy;
            binned[r1 * nx + c1] += w * fx * fy;
            binned_count += 1;
        }

        let kernel = self.kernel(bandwidth, plan.cell_size, nx.max(ny));
        let horizontal = convolve_rows(&binned, nx, ny, &kernel);
        let mut density = convolve_cols(&horizontal, nx, ny, &kernel);

        let area = plan.cell_size * plan.cell_size;
        for v in density.iter_mut() {
            *v /= area;
        }

        tracing::debug!(
            samples = samples.len(),
            binned = binned_count,
            bandwidth = bandwidth,
            kernel_taps = kernel.len(),
            bins_x = nx,
            bins_y = ny,
            "Estimated density grid"
        );

        Ok(density)
    }
}

/// Split a coordinate between its two nearest bin centres.
///
/// Returns `(lower_bin, upper_bin, upper_fraction)`. Coordinates between the
/// extent edge and the outermost bin centre go entirely to that bin.
#[inline]
fn linear_bin(coord: f64, origin: f64, cell_size: f64, bins: usize) -> (usize, usize, f64) {
    let last = (bins - 1) as f64;
    let u = ((coord - origin) / cell_size - 0.5).clamp(0.0, last);
    let lower = (u.floor() as usize).min(bins - 1);
    let upper = (lower + 1).min(bins - 1);
    (lower, upper, u - lower as f64)
}

fn convolve_rows(data: &[f64], nx: usize, ny: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut out = vec![0.0f64; nx * ny];

    for row in 0..ny {
        let src = &data[row * nx..(row + 1) * nx];
        let dst = &mut out[row * nx..(row + 1) * nx];
        for (col, slot) in dst.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, tap) in kernel.iter().enumerate() {
                let c = col as isize + k as isize - radius;
                if c >= 0 && (c as usize) < nx {
                    acc += tap * src[c as usize];
                }
            }
            *slot = acc;
        }
    }

    out
}

fn convolve_cols(data: &[f64], nx: usize, ny: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut out = vec![0.0f64; nx * ny];

    for row in 0..ny {
        for col in 0..nx {
            let mut acc = 0.0;
            for (k, tap) in kernel.iter().enumerate() {
                let r = row as isize + k as isize - radius;
                if r >= 0 && (r as usize) < ny {
                    acc += tap * data[r as usize * nx + col];
                }
            }
            out[row * nx + col] = acc;
        }
    }

    out
}
