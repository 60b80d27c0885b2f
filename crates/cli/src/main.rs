//! lstanom CLI - land surface temperature anomaly analysis

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lstanom_algorithms::collection::DirectoryCatalog;
use lstanom_algorithms::pipeline::{AnomalyPipeline, JobConfig, PipelineOutputs};
use lstanom_core::io::{read_aoi_geojson, read_geotiff, read_sample_points};
use lstanom_core::{AreaOfInterest, GridSpec, Raster, SamplePoint, CRS};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lstanom")]
#[command(author, version, about = "Land surface temperature anomaly analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an anomaly job and export its products
    Run {
        /// Job configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },
    /// Validate a job configuration without computing anything
    Check {
        /// Job configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the log subscriber")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn load_job(path: &Path) -> Result<JobConfig> {
    let job = JobConfig::load(path)
        .with_context(|| format!("Failed to load job config {}", path.display()))?;
    job.validate().context("Invalid job configuration")?;
    Ok(job)
}

/// Read the AOI and, if configured, the supplied sample points.
fn load_inputs(job: &JobConfig) -> Result<(AreaOfInterest, Option<Vec<SamplePoint>>)> {
    let inputs = &job.inputs;
    let aoi = read_aoi_geojson(&inputs.aoi, inputs.select_point.map(|[x, y]| (x, y)))
        .with_context(|| format!("Failed to read AOI {}", inputs.aoi.display()))?;
    let (min_x, min_y, max_x, max_y) = aoi.bounds();
    info!("AOI: ({:.3}, {:.3}) - ({:.3}, {:.3})", min_x, min_y, max_x, max_y);

    let points = match &inputs.points {
        Some(path) => {
            let points = read_sample_points(path, &inputs.x_column, &inputs.y_column)
                .with_context(|| format!("Failed to read sample points {}", path.display()))?;
            info!("Sample points: {}", points.len());
            job.analysis
                .validate_points(&points)
                .context("Sample points cannot support the requested clustering")?;
            Some(points)
        }
        None => None,
    };
    Ok((aoi, points))
}

fn summarize(outputs: &PipelineOutputs) {
    let report = &outputs.report;
    println!(
        "Historical {}: {} scenes ({} used)",
        report.historical.label, report.historical.scenes, report.historical.aggregation.scenes_used
    );
    println!(
        "Target {}: {} scenes ({} used)",
        report.target.label, report.target.scenes, report.target.aggregation.scenes_used
    );
    if let Some(t) = &report.historical.truncation {
        println!("  Historical series truncated: {} of {} scenes kept", t.kept, t.available);
    }
    if let Some(t) = &report.target.truncation {
        println!("  Target series truncated: {} of {} scenes kept", t.kept, t.available);
    }
    match &report.samples.statistics {
        Some(stats) => println!(
            "Anomaly sample: n={} mean={:.3} °C std={:.3} min={:.3} max={:.3}",
            stats.count, stats.mean, stats.std_dev, stats.min, stats.max
        ),
        None => println!("Anomaly sample: no defined values"),
    }
    if let Some(supplied) = &report.supplied_points {
        println!(
            "Supplied points: {} ({} positives clustered)",
            supplied.points, supplied.clustered_points
        );
        for (cluster, stats) in &supplied.cluster_statistics {
            println!("  Cluster {}: n={} mean={:.3} °C", cluster, stats.count, stats.mean);
        }
    }
}

fn print_raster_info(input: &Path, raster: &Raster<f64>) {
    let (rows, cols) = raster.shape();
    let bounds = raster.bounds();
    let stats = raster.statistics();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
    println!("Cell size: {}", raster.cell_size());
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    if let Some(crs) = raster.crs() {
        println!("CRS: {}", crs);
    }
    if let Some(nodata) = raster.nodata() {
        println!("NoData: {}", nodata);
    }
    println!("\nStatistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    let share = if raster.is_empty() {
        0.0
    } else {
        100.0 * stats.valid_count as f64 / raster.len() as f64
    };
    println!("  Valid cells: {} ({:.1}%)", stats.valid_count, share);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Run { config, output } => {
            let start = Instant::now();
            let job = load_job(&config)?;
            let (aoi, points) = load_inputs(&job)?;
            let catalog = DirectoryCatalog::open(&job.inputs.catalog).with_context(|| {
                format!("Failed to open scene catalog {}", job.inputs.catalog.display())
            })?;
            info!("Catalog: {} scenes", catalog.scenes().len());

            let mut pipeline = AnomalyPipeline::new(job.analysis, &catalog, aoi);
            if let Some(points) = points {
                pipeline = pipeline.with_points(points);
            }

            let pb = spinner("Computing anomaly...")?;
            let outputs = pipeline.run();
            pb.finish_and_clear();
            let outputs = outputs.context("Anomaly job failed")?;

            let pb = spinner("Writing outputs...")?;
            let files = outputs.export(&output);
            pb.finish_and_clear();
            let files = files
                .with_context(|| format!("Failed to write outputs to {}", output.display()))?;

            summarize(&outputs);
            println!("\nOutputs saved to: {}", output.display());
            for path in files.paths() {
                println!("  {}", path.display());
            }
            println!("  Processing time: {:.2?}", start.elapsed());
        }

        Commands::Check { config } => {
            let job = load_job(&config)?;
            let (aoi, _) = load_inputs(&job)?;
            let analysis = &job.analysis;
            let grid = GridSpec::from_extent(
                aoi.bounds(),
                analysis.resolution,
                analysis.epsg.map(CRS::from_epsg),
            )
            .context("Invalid analysis grid")?;
            println!("Configuration OK: {}", config.display());
            println!(
                "  Historical: {} ({} ranges)",
                analysis.historical_label()?,
                analysis.historical.len()
            );
            println!("  Target: {}", analysis.target_label()?);
            println!(
                "  Grid: {} x {} at {} m",
                grid.cols,
                grid.rows,
                grid.resolution()
            );
        }

        Commands::Info { input } => {
            let pb = spinner("Reading raster...")?;
            let raster: Raster<f64> = read_geotiff(&input).context("Failed to read raster")?;
            pb.finish_and_clear();
            print_raster_info(&input, &raster);
        }
    }

    Ok(())
}

