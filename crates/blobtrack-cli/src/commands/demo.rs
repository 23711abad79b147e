use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use blobtrack_core::detection::summarize_tracks;
use blobtrack_core::field::RasterField;
use blobtrack_core::pipeline::{track_reported, PipelineStage, ProgressReporter, TrackConfig};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array1, Array3};
use tracing::debug;

use crate::summary::print_track_summary;

/// Radius used when neither a config file nor `--radius` is given; the demo
/// grid is coarse enough that the library default would erase its blobs.
const DEMO_RADIUS: usize = 2;

#[derive(Args)]
pub struct DemoArgs {
    /// Tracking config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of daily frames to generate
    #[arg(long, default_value = "12")]
    pub frames: usize,

    /// Grid spacing in degrees (must divide 180)
    #[arg(long, default_value = "3.0")]
    pub resolution: f64,

    /// Structuring element radius in grid cells
    #[arg(long)]
    pub radius: Option<usize>,

    /// Area percentile below which regions are discarded (0-1)
    #[arg(long)]
    pub area_quantile: Option<f64>,

    /// Seed for the speckle noise
    #[arg(long, default_value = "7")]
    pub seed: u64,
}

pub fn run(args: &DemoArgs) -> Result<()> {
    let mut config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid tracking config")?
    } else {
        TrackConfig {
            radius: DEMO_RADIUS,
            ..Default::default()
        }
    };
    if let Some(radius) = args.radius {
        config.radius = radius;
    }
    if let Some(q) = args.area_quantile {
        config.area_quantile = q;
    }

    let field = synthetic_field(args.frames, args.resolution, args.seed)
        .context("Failed to build synthetic field")?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = Arc::new(BarReporter { bar: pb.clone() });

    let output = track_reported(&field, &config, reporter).context("Tracking failed")?;
    pb.finish_with_message("Done");

    let summaries = summarize_tracks(&output.tracks, field.spacing());
    print_track_summary(&config, field.dim(), &output.metadata, &summaries);

    Ok(())
}

struct BarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(1) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
    }
}

/// Daily anomaly frames on a global grid: one blob drifting east, one
/// stationary blob centred on the prime meridian, plus speckle noise.
fn synthetic_field(frames: usize, resolution: f64, seed: u64) -> Result<RasterField> {
    let nlat = (180.0 / resolution).round() as usize;
    let nlon = (360.0 / resolution).round() as usize;
    let lat = Array1::from_shape_fn(nlat, |i| -90.0 + resolution * (i as f64 + 0.5));
    let lon = Array1::from_shape_fn(nlon, |j| resolution * j as f64);
    let time = Array1::from_shape_fn(frames, |t| t as f64);

    let blob = |lat0: f64, lon0: f64, sigma: f64, la: f64, lo: f64| -> f64 {
        let dlon = (lo - lon0 + 540.0).rem_euclid(360.0) - 180.0;
        let dlat = la - lat0;
        (-(dlat * dlat + dlon * dlon) / (2.0 * sigma * sigma)).exp()
    };

    let data = Array3::from_shape_fn((frames, nlat, nlon), |(t, i, j)| {
        let la = lat[i];
        let lo = lon[j];
        let drifting = blob(20.0, 60.0 + 6.0 * t as f64, 12.0, la, lo);
        let seam = blob(-30.0, 0.0, 10.0, la, lo);
        let noise = speckle(seed, t, i, j) * 0.9;
        (drifting + seam - 0.35 + noise) as f32
    });
    debug!(frames, nlat, nlon, seed, "Generated synthetic anomaly field");

    Ok(RasterField::new(data, time, lat, lon)?)
}

/// Deterministic noise in [-0.5, 0.5) from a splitmix64 hash of the cell.
fn speckle(seed: u64, t: usize, i: usize, j: usize) -> f64 {
    let mut z = seed
        .wrapping_add((t as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add((i as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9))
        .wrapping_add((j as u64).wrapping_mul(0x94D0_49BB_1331_11EB));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64 - 0.5
}
