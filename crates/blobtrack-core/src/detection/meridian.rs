use std::collections::HashSet;

use ndarray::{s, Array1, Array2, Array3};
use tracing::debug;

use crate::consts::SEAM_BAND_COLUMNS;
use crate::error::{BlobTrackError, Result};

use super::{map_frames, stack_frames};

/// Labels laid out on a longitude axis twice the original length.
///
/// The first half holds every region that does not touch the seam band; the
/// second half holds the regions that do, so a region cut by the seam has its
/// trailing part at the end of the first half and its leading part at the
/// start of the second.
#[derive(Clone, Debug)]
pub struct WrappedField {
    pub labels: Array3<u32>,
    pub lon: Array1<f64>,
}

impl WrappedField {
    pub fn mask(&self) -> Array3<bool> {
        self.labels.mapv(|l| l > 0)
    }
}

/// Move every region present in the first longitude columns into a second
/// copy of the domain appended after the original one.
pub fn wrap_meridian(labels: &Array3<u32>, lon: &Array1<f64>) -> Result<WrappedField> {
    let (_, _, w) = labels.dim();
    if lon.len() != w || w < 2 {
        return Err(BlobTrackError::InvalidInputShape(format!(
            "longitude axis of length {} does not match a label field {w} columns wide",
            lon.len()
        )));
    }

    let frames = map_frames(labels, |_, frame| {
        let band = SEAM_BAND_COLUMNS.min(w);
        let candidates: HashSet<u32> = frame
            .slice(s![.., ..band])
            .iter()
            .copied()
            .filter(|&l| l > 0)
            .collect();

        let (h, _) = frame.dim();
        let mut doubled = Array2::<u32>::zeros((h, 2 * w));
        for ((row, col), &l) in frame.indexed_iter() {
            if l == 0 {
                continue;
            }
            let target = if candidates.contains(&l) { w + col } else { col };
            doubled[[row, target]] = l;
        }
        (doubled, candidates.len())
    });

    let moved: usize = frames.iter().map(|(_, n)| n).sum();
    debug!(seam_regions = moved, "Moved seam-band regions to the wrapped half");

    let planes: Vec<Array2<u32>> = frames.into_iter().map(|(plane, _)| plane).collect();

    let step = (lon[w - 1] - lon[0]) / (w - 1) as f64;
    let start = lon[0];
    let wrapped_lon = Array1::from_shape_fn(2 * w, |k| start + k as f64 * step);

    Ok(WrappedField {
        labels: stack_frames(&planes),
        lon: wrapped_lon,
    })
}

/// Fold a doubled longitude domain back onto one revolution by adding its
/// two halves. Each original cell is nonzero in at most one half.
pub fn fold_meridian(doubled: &Array3<u32>) -> Result<Array3<u32>> {
    let (_, _, w2) = doubled.dim();
    if w2 % 2 != 0 {
        return Err(BlobTrackError::InvalidInputShape(format!(
            "cannot fold a longitude axis of odd length {w2}"
        )));
    }
    let half = w2 / 2;
    let first = doubled.slice(s![.., .., ..half]);
    let second = doubled.slice(s![.., .., half..]);
    debug_assert!(first
        .iter()
        .zip(second.iter())
        .all(|(&a, &b)| a == 0 || b == 0));
    Ok(&first + &second)
}
