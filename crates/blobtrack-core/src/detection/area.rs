use std::collections::{BTreeMap, HashSet};

use ndarray::{Array1, Array3};
use tracing::{debug, info};

use crate::consts::KM_PER_DEGREE;
use crate::error::{BlobTrackError, Result};
use crate::field::GridSpacing;

use super::map_frames;

/// Size of one labeled region.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRecord {
    pub label: u32,
    /// Number of member cells.
    pub pixels: usize,
    /// Summed cell area in km².
    pub area_km2: f64,
}

/// Outcome of the area threshold.
#[derive(Clone, Debug)]
pub struct AreaFilterResult {
    /// Cells belonging to regions at or above `min_area`.
    pub retained: Array3<bool>,
    /// Area threshold in km².
    pub min_area: f64,
    /// Fraction of the total labeled area that survived the threshold.
    pub percent_area_kept: f64,
    /// Every region considered, ascending by label.
    pub features: Vec<FeatureRecord>,
}

/// Equirectangular area of one grid cell centred at `lat_deg`, in km².
pub fn cell_area_km2(lat_deg: f64, spacing: GridSpacing) -> f64 {
    let dy = spacing.lat.abs() * KM_PER_DEGREE;
    let dx = spacing.lon.abs() * KM_PER_DEGREE * lat_deg.to_radians().cos();
    dy * dx
}

/// Per-region pixel counts and areas, ascending by label.
pub fn feature_areas(
    labels: &Array3<u32>,
    lat: &Array1<f64>,
    spacing: GridSpacing,
) -> Vec<FeatureRecord> {
    // Cell area depends only on the row, so compute it once per latitude.
    let row_area: Vec<f64> = lat.iter().map(|&l| cell_area_km2(l, spacing)).collect();

    let per_frame = map_frames(labels, |_, frame| {
        let mut acc = BTreeMap::<u32, (usize, f64)>::new();
        for ((row, _), &l) in frame.indexed_iter() {
            if l == 0 {
                continue;
            }
            let entry = acc.entry(l).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += row_area[row];
        }
        acc
    });

    let mut merged = BTreeMap::<u32, (usize, f64)>::new();
    for acc in per_frame {
        for (label, (pixels, area)) in acc {
            let entry = merged.entry(label).or_insert((0, 0.0));
            entry.0 += pixels;
            entry.1 += area;
        }
    }

    merged
        .into_iter()
        .map(|(label, (pixels, area_km2))| FeatureRecord {
            label,
            pixels,
            area_km2,
        })
        .collect()
}

/// Percentile of already sorted values, interpolating linearly between the
/// two closest ranks. `q` is a fraction in [0, 1].
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Discard regions smaller than the `area_quantile` percentile of the region
/// area distribution.
///
/// `area_quantile` is the fraction of regions (by rank) to drop, not the
/// fraction to keep: 0.75 retains only the largest quarter.
pub fn filter_by_area(
    labels: &Array3<u32>,
    lat: &Array1<f64>,
    spacing: GridSpacing,
    area_quantile: f64,
) -> Result<AreaFilterResult> {
    if !(0.0..1.0).contains(&area_quantile) {
        return Err(BlobTrackError::InvalidConfiguration(format!(
            "area_quantile must lie in [0, 1), got {area_quantile}"
        )));
    }
    if lat.len() != labels.dim().1 {
        return Err(BlobTrackError::InvalidInputShape(format!(
            "latitude axis of length {} does not match a label field {} rows tall",
            lat.len(),
            labels.dim().1
        )));
    }

    let features = feature_areas(labels, lat, spacing);

    let mut sorted: Vec<f64> = features.iter().map(|f| f.area_km2).collect();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let min_area = percentile(&sorted, area_quantile).ok_or_else(|| {
        BlobTrackError::EmptyDetection(
            "no labeled regions to derive an area threshold from".into(),
        )
    })?;
    info!(min_area_km2 = min_area, "Minimum retained area");

    let keep: HashSet<u32> = features
        .iter()
        .filter(|f| f.area_km2 >= min_area)
        .map(|f| f.label)
        .collect();

    let total: f64 = sorted.iter().sum();
    let discarded: f64 = features
        .iter()
        .filter(|f| f.area_km2 < min_area)
        .map(|f| f.area_km2)
        .sum();
    let percent_area_kept = if total > 0.0 {
        1.0 - discarded / total
    } else {
        1.0
    };

    debug!(
        regions = features.len(),
        kept = keep.len(),
        percent_area_kept,
        "Applied area threshold"
    );

    let retained = labels.mapv(|l| l > 0 && keep.contains(&l));
    Ok(AreaFilterResult {
        retained,
        min_area,
        percent_area_kept,
        features,
    })
}
