use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{BlobTrackError, Result};

use super::{map_frames, stack_frames};

/// Adjacency rule used when grouping foreground cells into components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectivity {
    /// 8-connectivity within a single frame (diagonals included).
    Planar,
    /// 26-connectivity across (time, lat, lon): any spatial 8-neighbour in
    /// the same, previous or next frame.
    Volumetric,
}

impl Connectivity {
    /// Neighbour offsets (dt, dr, dc) already visited by a raster scan.
    fn backward_offsets(self) -> Vec<(isize, isize, isize)> {
        let mut offsets = Vec::new();
        if self == Connectivity::Volumetric {
            for dr in -1..=1 {
                for dc in -1..=1 {
                    offsets.push((-1, dr, dc));
                }
            }
        }
        offsets.extend_from_slice(&[(0, -1, -1), (0, -1, 0), (0, -1, 1), (0, 0, -1)]);
        offsets
    }
}

/// Label one frame with 8-connectivity.
///
/// Components are numbered 1..=count in raster-scan order of their first
/// pixel; background stays 0.
pub fn label_frame(mask: &ArrayView2<bool>) -> Result<(Array2<u32>, usize)> {
    let volume = mask.view().insert_axis(Axis(0));
    let (labels, count) = label_connected(volume, Connectivity::Planar)?;
    Ok((labels.index_axis_move(Axis(0), 0), count))
}

/// Label a whole (time, lat, lon) volume with 26-connectivity in one pass.
pub fn label_volume(mask: &ArrayView3<bool>) -> Result<(Array3<u32>, usize)> {
    connected_components(mask, Connectivity::Volumetric)
}

/// Label a volume under the given adjacency rule.
///
/// With `Planar` no cell links across frames, but numbering still runs over
/// the whole volume in scan order, so ids are unique across time.
pub fn connected_components(
    mask: &ArrayView3<bool>,
    connectivity: Connectivity,
) -> Result<(Array3<u32>, usize)> {
    label_connected(mask.view(), connectivity)
}

/// Label every frame independently, then shift each frame's labels by the
/// number of components found in all earlier frames so that ids are unique
/// across the time axis.
///
/// Returns the label field and the total number of components.
pub fn label_frames(mask: &Array3<bool>) -> Result<(Array3<u32>, usize)> {
    let per_frame: Vec<(Array2<u32>, usize)> = map_frames(mask, |_, frame| label_frame(&frame))
        .into_iter()
        .collect::<Result<_>>()?;

    // Left-exclusive prefix sum over the per-frame counts.
    let mut offsets = Vec::with_capacity(per_frame.len());
    let mut running: u32 = 0;
    for (_, count) in &per_frame {
        offsets.push(running);
        running = u32::try_from(*count)
            .ok()
            .and_then(|c| running.checked_add(c))
            .ok_or_else(|| label_overflow(per_frame.len()))?;
    }

    let mut frames: Vec<Array2<u32>> = per_frame.into_iter().map(|(labels, _)| labels).collect();
    frames
        .par_iter_mut()
        .zip(offsets.par_iter())
        .for_each(|(labels, &offset)| {
            if offset > 0 {
                labels.mapv_inplace(|l| if l > 0 { l + offset } else { 0 });
            }
        });

    debug!(
        frames = frames.len(),
        components = running,
        "Labeled frames with cumulative offsets"
    );
    Ok((stack_frames(&frames), running as usize))
}

fn label_overflow(frames: usize) -> BlobTrackError {
    BlobTrackError::InvalidInputShape(format!(
        "component count over {frames} frames exceeds the 32-bit label range"
    ))
}

/// Two-pass union-find labeling over a volume.
fn label_connected(
    mask: ArrayView3<bool>,
    connectivity: Connectivity,
) -> Result<(Array3<u32>, usize)> {
    let (nt, h, w) = mask.dim();
    let mut labels = Array3::<u32>::zeros((nt, h, w));
    if mask.is_empty() {
        return Ok((labels, 0));
    }

    let offsets = connectivity.backward_offsets();
    let mut sets = DisjointSet::new();

    // Pass 1: provisional labels, recording equivalences.
    for t in 0..nt {
        for row in 0..h {
            for col in 0..w {
                if !mask[[t, row, col]] {
                    continue;
                }
                let mut current = 0u32;
                for &(dt, dr, dc) in &offsets {
                    let pt = t as isize + dt;
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    if pt < 0 || nr < 0 || nc < 0 || nr >= h as isize || nc >= w as isize {
                        continue;
                    }
                    let neighbor = labels[[pt as usize, nr as usize, nc as usize]];
                    if neighbor == 0 {
                        continue;
                    }
                    if current == 0 {
                        current = neighbor;
                    } else if current != neighbor {
                        sets.union(current, neighbor);
                    }
                }
                if current == 0 {
                    current = sets.make()?;
                }
                labels[[t, row, col]] = current;
            }
        }
    }

    // Pass 2: resolve to roots and renumber in scan order of first appearance.
    let mut final_ids = vec![0u32; sets.len()];
    let mut next: u32 = 0;
    for lbl in labels.iter_mut() {
        if *lbl == 0 {
            continue;
        }
        let root = sets.find(*lbl) as usize;
        if final_ids[root] == 0 {
            next += 1;
            final_ids[root] = next;
        }
        *lbl = final_ids[root];
    }

    Ok((labels, next as usize))
}

/// Union-find over provisional labels. Index 0 is unused; labels start at 1.
struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new() -> Self {
        Self { parent: vec![0] }
    }

    fn len(&self) -> usize {
        self.parent.len()
    }

    fn make(&mut self) -> Result<u32> {
        let id = u32::try_from(self.parent.len()).map_err(|_| {
            BlobTrackError::InvalidInputShape(
                "provisional component count exceeds the 32-bit label range".into(),
            )
        })?;
        self.parent.push(id);
        Ok(id)
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Merge larger root into smaller root to keep labels consistent.
            let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[big as usize] = small;
        }
    }
}
