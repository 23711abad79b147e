use std::collections::BTreeSet;
use std::num::NonZeroU32;

use ndarray::{Array1, Array3, ArrayD, Ix3};
use tracing::warn;

use crate::consts::{FULL_REVOLUTION_DEG, SPACING_TOLERANCE};
use crate::error::{BlobTrackError, Result};

/// Identifier of a persistent track in the final output.
pub type TrackId = NonZeroU32;

/// Signed coordinate steps of a uniform lat/lon grid, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpacing {
    pub lat: f64,
    pub lon: f64,
}

/// A georeferenced time series of scalar frames, shape = (time, lat, lon).
///
/// Positive values mark candidate signal; zero, negative and NaN samples are
/// background. Construction validates the axes, so every `RasterField` that
/// exists has monotonic, uniformly spaced lat/lon coordinates and a strictly
/// increasing time axis.
#[derive(Clone, Debug)]
pub struct RasterField {
    data: Array3<f32>,
    time: Array1<f64>,
    lat: Array1<f64>,
    lon: Array1<f64>,
    spacing: GridSpacing,
}

impl RasterField {
    pub fn new(
        data: Array3<f32>,
        time: Array1<f64>,
        lat: Array1<f64>,
        lon: Array1<f64>,
    ) -> Result<Self> {
        let (nt, nlat, nlon) = data.dim();
        if nt == 0 || nlat == 0 || nlon == 0 {
            return Err(BlobTrackError::InvalidInputShape(format!(
                "empty raster of shape ({nt}, {nlat}, {nlon})"
            )));
        }
        validate_time(&time, nt)?;
        let lat_step = uniform_step("lat", &lat, nlat)?;
        let lon_step = uniform_step("lon", &lon, nlon)?;

        let span = lon_step.abs() * nlon as f64;
        if (span - FULL_REVOLUTION_DEG).abs() > lon_step.abs() {
            warn!(
                span_deg = span,
                "Longitude axis does not cover one full revolution; seam correction assumes it does"
            );
        }

        Ok(Self {
            data,
            time,
            lat,
            lon,
            spacing: GridSpacing {
                lat: lat_step,
                lon: lon_step,
            },
        })
    }

    /// Build from an array of unknown dimensionality, rejecting anything that
    /// is not exactly (time, lat, lon).
    pub fn from_dyn(
        data: ArrayD<f32>,
        time: Array1<f64>,
        lat: Array1<f64>,
        lon: Array1<f64>,
    ) -> Result<Self> {
        let ndim = data.ndim();
        let data = data.into_dimensionality::<Ix3>().map_err(|_| {
            BlobTrackError::InvalidInputShape(format!(
                "expected 3 dimensions (time, lat, lon), got {ndim}"
            ))
        })?;
        Self::new(data, time, lat, lon)
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    pub fn lat(&self) -> &Array1<f64> {
        &self.lat
    }

    pub fn lon(&self) -> &Array1<f64> {
        &self.lon
    }

    pub fn spacing(&self) -> GridSpacing {
        self.spacing
    }

    /// (time, lat, lon) extents.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// True if any sample is strictly positive.
    pub fn has_signal(&self) -> bool {
        self.data.iter().any(|&v| v > 0.0)
    }
}

fn validate_time(time: &Array1<f64>, expected_len: usize) -> Result<()> {
    if time.len() != expected_len {
        return Err(BlobTrackError::InvalidInputShape(format!(
            "time axis has {} entries but the raster has {expected_len} frames",
            time.len()
        )));
    }
    if time.windows(2).into_iter().any(|w| !(w[1] > w[0])) {
        return Err(BlobTrackError::InvalidInputShape(
            "time axis is not strictly increasing".into(),
        ));
    }
    Ok(())
}

/// Return the mean step of a coordinate axis after checking its length,
/// monotonicity and uniformity.
fn uniform_step(axis: &'static str, coords: &Array1<f64>, expected_len: usize) -> Result<f64> {
    if coords.len() != expected_len {
        return Err(BlobTrackError::InvalidInputShape(format!(
            "{axis} axis has {} entries but the raster has {expected_len}",
            coords.len()
        )));
    }
    if coords.len() < 2 {
        return Err(BlobTrackError::InvalidInputShape(format!(
            "{axis} axis needs at least 2 entries to define a grid spacing"
        )));
    }
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(BlobTrackError::InvalidInputShape(format!(
            "{axis} axis contains non-finite coordinates"
        )));
    }

    let n = coords.len();
    let mean = (coords[n - 1] - coords[0]) / (n - 1) as f64;
    for w in coords.windows(2) {
        let step = w[1] - w[0];
        if step == 0.0 || step.signum() != mean.signum() {
            return Err(BlobTrackError::InvalidInputShape(format!(
                "{axis} axis is not strictly monotonic"
            )));
        }
        if (step - mean).abs() > SPACING_TOLERANCE * mean.abs() {
            return Err(BlobTrackError::CoordinateSpacingViolation {
                axis,
                expected: mean,
                found: step,
            });
        }
    }
    Ok(mean)
}

/// Final output of the tracker: one optional track id per grid cell.
///
/// `None` marks cells that belong to no feature. It is kept distinct from any
/// numeric value so that consumers never confuse "no track" with a zero.
#[derive(Clone, Debug)]
pub struct TrackedField {
    ids: Array3<Option<TrackId>>,
    time: Array1<f64>,
    lat: Array1<f64>,
    lon: Array1<f64>,
}

impl TrackedField {
    /// Wrap a label volume on the original grid, mapping label 0 to `None`.
    pub(crate) fn from_labels(
        labels: &Array3<u32>,
        time: Array1<f64>,
        lat: Array1<f64>,
        lon: Array1<f64>,
    ) -> Self {
        Self {
            ids: labels.mapv(NonZeroU32::new),
            time,
            lat,
            lon,
        }
    }

    pub fn ids(&self) -> &Array3<Option<TrackId>> {
        &self.ids
    }

    pub fn get(&self, t: usize, row: usize, col: usize) -> Option<TrackId> {
        self.ids.get((t, row, col)).copied().flatten()
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    pub fn lat(&self) -> &Array1<f64> {
        &self.lat
    }

    pub fn lon(&self) -> &Array1<f64> {
        &self.lon
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.ids.dim()
    }

    /// Distinct track ids, ascending.
    pub fn track_ids(&self) -> Vec<TrackId> {
        let set: BTreeSet<TrackId> = self.ids.iter().flatten().copied().collect();
        set.into_iter().collect()
    }

    /// Distinct track ids present in frame `t`, ascending.
    pub fn frame_track_ids(&self, t: usize) -> Vec<TrackId> {
        let set: BTreeSet<TrackId> = self
            .ids
            .index_axis(ndarray::Axis(0), t)
            .iter()
            .flatten()
            .copied()
            .collect();
        set.into_iter().collect()
    }

    /// Float rendering with NaN as the "no feature" sentinel.
    pub fn to_float(&self) -> Array3<f64> {
        self.ids
            .mapv(|id| id.map_or(f64::NAN, |id| f64::from(id.get())))
    }
}
