use std::collections::BTreeMap;

use ndarray::{Array3, Axis};
use tracing::debug;

use crate::error::Result;
use crate::field::{GridSpacing, TrackId, TrackedField};

use super::area::cell_area_km2;
use super::components::label_volume;
use super::meridian::fold_meridian;

/// Track labels folded back onto the original longitude extent.
#[derive(Clone, Debug)]
pub struct Tracks {
    /// 0 = background, 1..=count = track id.
    pub labels: Array3<u32>,
    pub count: usize,
}

/// Link retained regions into tracks.
///
/// The doubled-longitude mask is labeled as one (time, lat, lon) volume with
/// 26-connectivity, so regions that overlap (or touch diagonally) between
/// consecutive frames share an id. The result is then folded back to one
/// revolution.
pub fn track_features(retained: &Array3<bool>) -> Result<Tracks> {
    let (labels, count) = label_volume(&retained.view())?;
    debug!(tracks = count, "Labeled spatiotemporal volume");
    let labels = fold_meridian(&labels)?;
    Ok(Tracks { labels, count })
}

/// Lifetime and size statistics of one track.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackSummary {
    pub id: TrackId,
    pub first_frame: usize,
    pub last_frame: usize,
    /// Frames in which the track has at least one cell.
    pub frames_present: usize,
    pub pixels: usize,
    pub total_area_km2: f64,
    /// Largest single-frame area.
    pub peak_area_km2: f64,
}

impl TrackSummary {
    /// Number of frames from first to last appearance, inclusive.
    pub fn duration(&self) -> usize {
        self.last_frame - self.first_frame + 1
    }
}

/// Per-track statistics, ascending by id.
pub fn summarize_tracks(field: &TrackedField, spacing: GridSpacing) -> Vec<TrackSummary> {
    let row_area: Vec<f64> = field
        .lat()
        .iter()
        .map(|&l| cell_area_km2(l, spacing))
        .collect();

    let mut summaries = BTreeMap::<TrackId, TrackSummary>::new();
    for (t, frame) in field.ids().axis_iter(Axis(0)).enumerate() {
        let mut frame_totals = BTreeMap::<TrackId, (usize, f64)>::new();
        for ((row, _), id) in frame.indexed_iter() {
            if let Some(id) = *id {
                let entry = frame_totals.entry(id).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += row_area[row];
            }
        }

        for (id, (pixels, area)) in frame_totals {
            let summary = summaries.entry(id).or_insert(TrackSummary {
                id,
                first_frame: t,
                last_frame: t,
                frames_present: 0,
                pixels: 0,
                total_area_km2: 0.0,
                peak_area_km2: 0.0,
            });
            summary.last_frame = t;
            summary.frames_present += 1;
            summary.pixels += pixels;
            summary.total_area_km2 += area;
            summary.peak_area_km2 = summary.peak_area_km2.max(area);
        }
    }

    summaries.into_values().collect()
}
