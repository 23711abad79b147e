use ndarray::{s, Array2, Array3, ArrayView2};
use tracing::debug;

use crate::error::{BlobTrackError, Result};

use super::{map_frames, stack_frames};

/// Flat disk structuring element: every offset (dx, dy) with dx² + dy² < r².
#[derive(Clone, Debug)]
pub struct StructuringElement {
    radius: usize,
    offsets: Vec<(isize, isize)>,
}

impl StructuringElement {
    pub fn disk(radius: usize) -> Result<Self> {
        if radius == 0 {
            return Err(BlobTrackError::InvalidConfiguration(
                "structuring element radius must be positive".into(),
            ));
        }
        let r = radius as isize;
        let mut offsets = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy < r * r {
                    offsets.push((dy, dx));
                }
            }
        }
        Ok(Self { radius, offsets })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// (row, col) offsets of the member cells, relative to the centre.
    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }

    /// Footprint as a (2r+1) x (2r+1) boolean grid.
    pub fn to_array(&self) -> Array2<bool> {
        let size = 2 * self.radius + 1;
        let r = self.radius as isize;
        let mut grid = Array2::from_elem((size, size), false);
        for &(dy, dx) in &self.offsets {
            grid[[(dy + r) as usize, (dx + r) as usize]] = true;
        }
        grid
    }
}

/// Binary morphological operation selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphologyOp {
    Dilate,
    Erode,
    /// Dilation followed by erosion; fills gaps narrower than the element.
    Close,
    /// Erosion followed by dilation; removes specks smaller than the element.
    Open,
}

/// Apply a single morphological operation. Cells outside the mask count as
/// background.
pub fn apply(mask: &Array2<bool>, se: &StructuringElement, op: MorphologyOp) -> Array2<bool> {
    match op {
        MorphologyOp::Dilate => dilate(mask, se),
        MorphologyOp::Erode => erode(mask, se),
        MorphologyOp::Close => morphological_closing(mask, se),
        MorphologyOp::Open => morphological_opening(mask, se),
    }
}

pub fn morphological_closing(mask: &Array2<bool>, se: &StructuringElement) -> Array2<bool> {
    let dilated = dilate(mask, se);
    erode(&dilated, se)
}

pub fn morphological_opening(mask: &Array2<bool>, se: &StructuringElement) -> Array2<bool> {
    let eroded = erode(mask, se);
    dilate(&eroded, se)
}

/// Binary erosion: a pixel stays true only if every cell under the element is true.
pub fn erode(mask: &Array2<bool>, se: &StructuringElement) -> Array2<bool> {
    let (h, w) = mask.dim();
    let mut result = Array2::from_elem((h, w), false);

    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }
            result[[row, col]] = se.offsets().iter().all(|&(dy, dx)| {
                let nr = row as isize + dy;
                let nc = col as isize + dx;
                nr >= 0
                    && nr < h as isize
                    && nc >= 0
                    && nc < w as isize
                    && mask[[nr as usize, nc as usize]]
            });
        }
    }

    result
}

/// Binary dilation: a pixel becomes true if any cell under the element is true.
pub fn dilate(mask: &Array2<bool>, se: &StructuringElement) -> Array2<bool> {
    let (h, w) = mask.dim();
    let mut result = Array2::from_elem((h, w), false);

    // Scatter from foreground pixels; the disk is symmetric so this equals
    // the gather form.
    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }
            for &(dy, dx) in se.offsets() {
                let nr = row as isize + dy;
                let nc = col as isize + dx;
                if nr >= 0 && nr < h as isize && nc >= 0 && nc < w as isize {
                    result[[nr as usize, nc as usize]] = true;
                }
            }
        }
    }

    result
}

/// Mirror-pad a mask by `pad` cells on each side. The edge sample is not
/// repeated, and pads longer than the axis keep reflecting back and forth.
pub fn reflect_pad(mask: &ArrayView2<bool>, pad: usize) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h + 2 * pad, w + 2 * pad), |(row, col)| {
        let r = reflect_index(row as isize - pad as isize, h);
        let c = reflect_index(col as isize - pad as isize, w);
        mask[[r, c]]
    })
}

fn reflect_index(i: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = i.rem_euclid(period);
    if m < n as isize {
        m as usize
    } else {
        (period - m) as usize
    }
}

/// Binarize one frame (value > 0) and smooth it with closing then opening,
/// on a copy padded by twice the element radius so borders are not eroded.
pub fn smooth_frame(frame: ArrayView2<f32>, se: &StructuringElement) -> Array2<bool> {
    let (h, w) = frame.dim();
    let pad = 2 * se.radius();
    let binary = frame.mapv(|v| v > 0.0);

    let padded = reflect_pad(&binary.view(), pad);
    let closed = morphological_closing(&padded, se);
    let opened = morphological_opening(&closed, se);

    opened.slice(s![pad..pad + h, pad..pad + w]).to_owned()
}

/// Smooth every frame of the volume independently.
pub fn smooth_field(data: &Array3<f32>, radius: usize) -> Result<Array3<bool>> {
    let se = StructuringElement::disk(radius)?;
    debug!(
        radius,
        element_cells = se.offsets().len(),
        "Smoothing frames with disk element"
    );
    let frames = map_frames(data, |_, frame| smooth_frame(frame, &se));
    Ok(stack_frames(&frames))
}
