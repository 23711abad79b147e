#![allow(dead_code)]

use blobtrack_core::field::RasterField;
use ndarray::{Array1, Array3};

/// Latitudes centred on the equator, `step` degrees apart.
pub fn lat_axis(n: usize, step: f64) -> Array1<f64> {
    let start = -step * (n as f64 - 1.0) / 2.0;
    Array1::from_shape_fn(n, |i| start + step * i as f64)
}

/// Longitudes covering one full revolution starting at 0.
pub fn lon_axis(n: usize) -> Array1<f64> {
    let step = 360.0 / n as f64;
    Array1::from_shape_fn(n, |j| step * j as f64)
}

pub fn time_axis(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |t| t as f64)
}

/// Wrap raw values in a field on a global grid with 10 degree latitude rows.
pub fn field_from(data: Array3<f32>) -> RasterField {
    let (nt, nlat, nlon) = data.dim();
    RasterField::new(data, time_axis(nt), lat_axis(nlat, 10.0), lon_axis(nlon))
        .expect("valid test field")
}

/// Set a rectangular block of cells in frame `t` to `value`. Column ranges
/// may wrap: `cols` is a list of explicit column indices.
pub fn paint(data: &mut Array3<f32>, t: usize, rows: std::ops::Range<usize>, cols: &[usize], value: f32) {
    for row in rows {
        for &col in cols {
            data[[t, row, col]] = value;
        }
    }
}

/// Boolean volume with a filled rectangle in the given frames.
pub fn block_mask(
    dim: (usize, usize, usize),
    frames: &[usize],
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> Array3<bool> {
    let mut mask = Array3::from_elem(dim, false);
    for &t in frames {
        for row in rows.clone() {
            for col in cols.clone() {
                mask[[t, row, col]] = true;
            }
        }
    }
    mask
}
