//! Floodmark CLI - surface-water detection for WorldView imagery

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use floodmark_algorithms::water::{
    detect_water, load_worldview_image, load_worldview_metadata, DetectionParams,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "floodmark")]
#[command(author, version, about = "Surface-water detection for WorldView imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a WorldView scene
    Info {
        /// Scene delivery files (.tif image plus sidecars)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Parse and print the scene calibration metadata
    Metadata {
        /// Scene delivery files (.imd metadata plus sidecars)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Classify every pixel as water, land or no-data
    Detect {
        /// Scene delivery files (.tif image and .imd metadata)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output classification raster
        #[arg(short, long)]
        output: PathBuf,
        /// NDWI decision threshold (provisional default)
        #[arg(short, long, default_value = "0.1")]
        threshold: f32,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { inputs } => {
            let pb = spinner("Reading scene...");
            let image = load_worldview_image(&inputs).context("Failed to read scene")?;
            pb.finish_and_clear();

            let (rows, cols) = image.shape();
            let bounds = image.transform().bounds(cols, rows);
            let valid = image.count_valid();

            println!("Dimensions: {} x {} ({} pixels)", cols, rows, image.len());
            println!("Bands: {}", image.num_bands());
            println!("Cell size: {}", image.transform().cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = image.crs() {
                println!("CRS: {}", crs);
            }
            println!(
                "Valid pixels: {} ({:.1}%)",
                valid,
                100.0 * valid as f64 / image.len() as f64
            );
        }

        // ── Metadata ─────────────────────────────────────────────────
        Commands::Metadata { inputs } => {
            let metadata =
                load_worldview_metadata(&inputs).context("Failed to read metadata")?;

            println!("Acquisition time: {}", metadata.acquisition_time);
            println!("Mean sun elevation: {:.4} deg", metadata.mean_sun_elevation);
            println!("Earth-Sun distance: {:.6} AU", metadata.earth_sun_distance);
            println!("Band  absCalFactor  effectiveBandwidth");
            for i in 0..metadata.abs_cal_factor.len() {
                println!(
                    "{:>4}  {:>12.6e}  {:>18.6e}",
                    i, metadata.abs_cal_factor[i], metadata.effective_bandwidth[i]
                );
            }
        }

        // ── Detect ───────────────────────────────────────────────────
        Commands::Detect {
            inputs,
            output,
            threshold,
        } => {
            let params = DetectionParams {
                ndwi_threshold: threshold,
            };
            info!(threshold, "detecting surface water");

            let start = Instant::now();
            let summary =
                detect_water(&inputs, &output, &params).context("Water detection failed")?;
            let elapsed = start.elapsed();

            let total = summary.water + summary.land + summary.nodata;
            println!("Classification saved to: {}", output.display());
            println!(
                "  Water: {} ({:.1}%)",
                summary.water,
                100.0 * summary.water as f64 / total.max(1) as f64
            );
            println!(
                "  Land: {} ({:.1}%)",
                summary.land,
                100.0 * summary.land as f64 / total.max(1) as f64
            );
            println!(
                "  NoData: {} ({:.1}%)",
                summary.nodata,
                100.0 * summary.nodata as f64 / total.max(1) as f64
            );
            println!("  Processing time: {:.2?}", elapsed);
        }
    }

    Ok(())
}
