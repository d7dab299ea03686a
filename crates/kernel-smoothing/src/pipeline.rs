//! The kernel smoothing style: plan, estimate, materialize, composite.

use smoothing_common::{GridCell, SmoothedLayer, SmoothingResult, ViewState};

use crate::composite::{composite, CompositeStats};
use crate::config::SmoothingConfig;
use crate::context::RenderContext;
use crate::density::{prepare_samples, DensityEstimator, GaussianKde};
use crate::materialize::materialize;
use crate::plan::{plan_grid, require_positive};

/// A style the host draws its visible cells with.
pub trait LayerStyle<C> {
    fn draw_cells(
        &self,
        cells: &[C],
        view: &ViewState,
        resolution: f64,
        ctx: &mut dyn RenderContext,
    ) -> SmoothingResult<()>;
}

/// Why a draw returned without drawing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No input cell survived the pre-filter
    EmptyInput,
    /// The planned grid has zero area
    EmptyGrid,
}

/// Result of one draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Skipped(SkipReason),
    Drawn {
        /// Smoothed cells handed to the delegates
        cells: usize,
        stats: CompositeStats,
    },
}

/// Renders input cells as a kernel-smoothed layer through delegate styles.
///
/// Holds configuration only; every call recomputes the grid from scratch.
pub struct KernelSmoothingStyle<C, E = GaussianKde> {
    config: SmoothingConfig<C>,
    estimator: E,
}

impl<C: GridCell> KernelSmoothingStyle<C, GaussianKde> {
    /// Style using the default Gaussian estimator.
    pub fn new(config: SmoothingConfig<C>) -> SmoothingResult<Self> {
        Self::with_estimator(config, GaussianKde::default())
    }
}

impl<C: GridCell, E: DensityEstimator> KernelSmoothingStyle<C, E> {
    /// Style using a custom density estimator.
    pub fn with_estimator(config: SmoothingConfig<C>, estimator: E) -> SmoothingResult<Self> {
        config.validate()?;
        Ok(Self { config, estimator })
    }

    pub fn config(&self) -> &SmoothingConfig<C> {
        &self.config
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Compute the smoothed layer without drawing it.
    ///
    /// Returns `None` when the draw would be skipped.
    pub fn smooth(
        &self,
        cells: &[C],
        view: &ViewState,
        resolution: f64,
    ) -> SmoothingResult<Option<SmoothedLayer>> {
        Ok(self.build_layer(cells, view, resolution)?.ok())
    }

    /// Run the whole pipeline and draw the delegates onto `ctx`.
    pub fn draw(
        &self,
        cells: &[C],
        view: &ViewState,
        resolution: f64,
        ctx: &mut dyn RenderContext,
    ) -> SmoothingResult<DrawOutcome> {
        let layer = match self.build_layer(cells, view, resolution)? {
            Ok(layer) => layer,
            Err(reason) => {
                tracing::debug!(reason = ?reason, "Skipping smoothed layer draw");
                return Ok(DrawOutcome::Skipped(reason));
            }
        };

        let stats = composite(&layer, &self.config.styles, view, ctx)?;

        tracing::debug!(
            cells = layer.len(),
            styles_drawn = stats.drawn,
            styles_hidden = stats.hidden,
            "Drew smoothed layer"
        );

        Ok(DrawOutcome::Drawn {
            cells: layer.len(),
            stats,
        })
    }

    /// Steps shared by `smooth` and `draw`: filter, plan, estimate, materialize.
    fn build_layer(
        &self,
        cells: &[C],
        view: &ViewState,
        resolution: f64,
    ) -> SmoothingResult<Result<SmoothedLayer, SkipReason>> {
        view.validate()?;
        require_positive("resolution", resolution)?;

        let sigma = (self.config.sigma)(resolution, view.zoom);
        require_positive("sigma", sigma)?;

        let selected: Vec<&C> = match &self.config.filter {
            Some(keep) => cells.iter().filter(|c| keep(*c)).collect(),
            None => cells.iter().collect(),
        };

        if selected.is_empty() {
            return Ok(Err(SkipReason::EmptyInput));
        }

        let plan = plan_grid(
            resolution,
            view,
            &selected,
            &*self.config.resolution_smoothed,
            self.config.extent_policy,
        )?;

        if plan.is_empty() {
            return Ok(Err(SkipReason::EmptyGrid));
        }

        let value = &self.config.value;
        let samples = prepare_samples(
            &selected,
            resolution,
            &|c: &&C| value(*c),
            self.config.non_finite,
        )?;

        let grid = self.estimator.estimate(&samples, sigma, &plan)?;
        let smoothed = materialize(&grid, &plan, self.config.smoothed_filter())?;
        let layer =
            SmoothedLayer::collect_from(&self.config.smoothed_property, plan.cell_size, smoothed);

        tracing::debug!(
            input_cells = selected.len(),
            samples = samples.len(),
            sigma = sigma,
            grid_cells = plan.len(),
            smoothed_cells = layer.len(),
            "Built smoothed layer"
        );

        Ok(Ok(layer))
    }
}

impl<C: GridCell, E: DensityEstimator> LayerStyle<C> for KernelSmoothingStyle<C, E> {
    fn draw_cells(
        &self,
        cells: &[C],
        view: &ViewState,
        resolution: f64,
        ctx: &mut dyn RenderContext,
    ) -> SmoothingResult<()> {
        self.draw(cells, view, resolution, ctx).map(|_| ())
    }
}
