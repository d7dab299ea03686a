//! One render run: load inputs, smooth, draw, write outputs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kernel_smoothing::{
    DelegateStyle, DrawOutcome, KernelSmoothingStyle, SkipReason, SmoothingSettings,
};
use renderer::{ColorRamp, PixmapCanvas, SquareStyle, StyleConfig};
use smoothing_common::{BoundingBox, Cell, ViewState};
use tracing::{debug, info, warn};

/// Everything needed for one render.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub input: PathBuf,
    pub resolution: f64,
    pub value_field: String,
    pub width: u32,
    pub height: u32,
    pub bbox: Option<String>,
    pub styles: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub output: PathBuf,
    pub dump_cells: Option<PathBuf>,
}

/// What a render produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub input_cells: usize,
    pub smoothed_cells: usize,
    pub skipped: Option<SkipReason>,
}

impl RenderJob {
    pub fn run(&self) -> Result<RenderSummary> {
        let cells = load_cells(&self.input)?;
        let settings = self.load_settings()?;
        let estimator = settings.estimator()?;
        let styles = self.load_styles()?;
        let view = self.view(&cells)?;

        debug!(
            sigma_factor = settings.sigma_factor,
            resolution_divisor = settings.resolution_divisor,
            extent_policy = %settings.extent_policy,
            styles = styles.len(),
            zoom = view.zoom,
            "Prepared render"
        );

        let field = self.value_field.clone();
        let config = settings
            .into_config(move |c: &Cell| c.value(&field).unwrap_or(f64::NAN))?
            .with_styles(styles);
        let style = KernelSmoothingStyle::with_estimator(config, estimator)?;

        if let Some(path) = &self.dump_cells {
            let layer = style.smooth(&cells, &view, self.resolution)?;
            let json = match &layer {
                Some(layer) => serde_json::to_string_pretty(layer)?,
                None => "[]".to_string(),
            };
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote smoothed cells");
        }

        let mut canvas = PixmapCanvas::for_view(&view)?;
        let outcome = style.draw(&cells, &view, self.resolution, &mut canvas)?;
        canvas
            .save_png(&self.output)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        let (smoothed_cells, skipped) = match outcome {
            DrawOutcome::Drawn { cells, .. } => (cells, None),
            DrawOutcome::Skipped(reason) => {
                warn!(reason = ?reason, "Nothing drawn, wrote an empty image");
                (0, Some(reason))
            }
        };

        Ok(RenderSummary {
            input_cells: cells.len(),
            smoothed_cells,
            skipped,
        })
    }

    fn load_settings(&self) -> Result<SmoothingSettings> {
        let settings = match &self.settings {
            Some(path) => SmoothingSettings::from_file(&path.to_string_lossy())?,
            None => SmoothingSettings::from_env()?,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn load_styles(&self) -> Result<Vec<Box<dyn DelegateStyle>>> {
        match &self.styles {
            Some(path) => {
                let config = StyleConfig::from_file(&path.to_string_lossy())?;
                Ok(config.build_styles()?)
            }
            None => Ok(vec![Box::new(SquareStyle::new("density", ColorRamp::heat()))]),
        }
    }

    fn view(&self, cells: &[Cell]) -> Result<ViewState> {
        let bbox = match &self.bbox {
            Some(s) => BoundingBox::from_extent_string(s)
                .with_context(|| format!("Invalid --bbox '{}'", s))?,
            None => data_extent(cells, self.resolution).unwrap_or_else(|| {
                warn!("No finite cell positions, using a single-cell view");
                BoundingBox::new(0.0, 0.0, self.resolution, self.resolution)
            }),
        };

        let view = ViewState::fit_bbox(&bbox, self.width, self.height);
        view.validate()?;
        Ok(view)
    }
}

fn load_cells(path: &Path) -> Result<Vec<Cell>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cells: Vec<Cell> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cells from {}", path.display()))?;
    info!(cells = cells.len(), path = %path.display(), "Loaded cells");
    Ok(cells)
}

/// Extent covered by the cells, including their full footprint.
fn data_extent(cells: &[Cell], resolution: f64) -> Option<BoundingBox> {
    BoundingBox::from_points(
        cells
            .iter()
            .flat_map(|c| [(c.x, c.y), (c.x + resolution, c.y + resolution)]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELLS: &str = r#"[
        {"x": 0, "y": 0, "pop": 10},
        {"x": 10, "y": 0, "pop": 20},
        {"x": 0, "y": 10, "pop": 30},
        {"x": 10, "y": 10, "pop": 40}
    ]"#;

    fn job(dir: &Path) -> RenderJob {
        let input = dir.join("cells.json");
        std::fs::write(&input, CELLS).unwrap();
        let settings = dir.join("settings.json");
        std::fs::write(&settings, "{}").unwrap();

        RenderJob {
            input,
            resolution: 10.0,
            value_field: "pop".to_string(),
            width: 40,
            height: 40,
            bbox: None,
            styles: None,
            settings: Some(settings),
            output: dir.join("out.png"),
            dump_cells: None,
        }
    }

    #[test]
    fn test_render_writes_png_and_dump() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path());
        job.dump_cells = Some(dir.path().join("smoothed.json"));

        let summary = job.run().unwrap();
        assert_eq!(summary.input_cells, 4);
        assert_eq!(summary.smoothed_cells, 4);
        assert_eq!(summary.skipped, None);

        let png = std::fs::read(&job.output).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let dump: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("smoothed.json")).unwrap())
                .unwrap();
        let records = dump.as_array().unwrap();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.get("ksmval").is_some()));
    }

    #[test]
    fn test_empty_input_writes_empty_image() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        std::fs::write(&job.input, "[]").unwrap();

        let summary = job.run().unwrap();
        assert_eq!(summary.skipped, Some(SkipReason::EmptyInput));
        assert!(job.output.exists());
    }

    #[test]
    fn test_invalid_bbox_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path());
        job.bbox = Some("1,2,3".to_string());
        assert!(job.run().is_err());
    }

    #[test]
    fn test_data_extent_includes_footprint() {
        let cells = vec![Cell::new(0.0, 0.0), Cell::new(10.0, 20.0)];
        assert_eq!(
            data_extent(&cells, 10.0),
            Some(BoundingBox::new(0.0, 0.0, 20.0, 30.0))
        );
        assert_eq!(data_extent(&[], 10.0), None);
    }
}
