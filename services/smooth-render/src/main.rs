//! Kernel smoothing renderer.
//!
//! Reads gridded cells from JSON, smooths them onto a finer grid and writes
//! the result as a PNG:
//! - Settings from a JSON file or `SMOOTHING_*` environment variables
//! - Delegate styles from a JSON style file (heat-ramp squares by default)
//! - View from an explicit bbox or fitted to the data
//! - Optional dump of the smoothed cells as JSON

mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use render::RenderJob;

#[derive(Parser, Debug)]
#[command(name = "smooth-render")]
#[command(about = "Render gridded cells as a kernel-smoothed layer")]
struct Args {
    /// Input cells (JSON array of {"x", "y", <fields>...})
    #[arg(short, long)]
    input: PathBuf,

    /// Input grid resolution, in geographic units
    #[arg(short, long)]
    resolution: f64,

    /// Field holding the cell weight
    #[arg(long, default_value = "value")]
    value_field: String,

    /// Output image width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Output image height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// View extent as minx,miny,maxx,maxy (default: fit to data)
    #[arg(long)]
    bbox: Option<String>,

    /// Style configuration file
    #[arg(long, env = "SMOOTHING_STYLES")]
    styles: Option<PathBuf>,

    /// Smoothing settings file (default: SMOOTHING_* environment variables)
    #[arg(long, env = "SMOOTHING_SETTINGS")]
    settings: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,

    /// Also write the smoothed cells as JSON
    #[arg(long)]
    dump_cells: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!(input = %args.input.display(), "Starting smooth-render");

    let job = RenderJob {
        input: args.input,
        resolution: args.resolution,
        value_field: args.value_field,
        width: args.width,
        height: args.height,
        bbox: args.bbox,
        styles: args.styles,
        settings: args.settings,
        output: args.output,
        dump_cells: args.dump_cells,
    };

    let summary = job.run()?;

    info!(
        input_cells = summary.input_cells,
        smoothed_cells = summary.smoothed_cells,
        skipped = ?summary.skipped,
        output = %job.output.display(),
        "Render complete"
    );

    Ok(())
}
