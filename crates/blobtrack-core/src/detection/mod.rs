pub mod area;
pub mod components;
pub mod meridian;
pub mod morphology;
pub mod tracks;

pub use area::{filter_by_area, AreaFilterResult, FeatureRecord};
pub use components::{
    connected_components, label_frame, label_frames, label_volume, Connectivity,
};
pub use meridian::{fold_meridian, wrap_meridian, WrappedField};
pub use morphology::{smooth_field, MorphologyOp, StructuringElement};
pub use tracks::{summarize_tracks, track_features, TrackSummary, Tracks};

use ndarray::{Array2, Array3, ArrayView2, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_FRAME_THRESHOLD;

/// Apply `f` to every frame of a (time, lat, lon) volume, in parallel once
/// there are enough frames to make it worthwhile. Results keep frame order.
pub(crate) fn map_frames<A, T, F>(volume: &Array3<A>, f: F) -> Vec<T>
where
    A: Sync,
    T: Send,
    F: Fn(usize, ArrayView2<'_, A>) -> T + Sync + Send,
{
    let n = volume.len_of(Axis(0));
    if n >= PARALLEL_FRAME_THRESHOLD {
        (0..n)
            .into_par_iter()
            .map(|t| f(t, volume.index_axis(Axis(0), t)))
            .collect()
    } else {
        (0..n)
            .map(|t| f(t, volume.index_axis(Axis(0), t)))
            .collect()
    }
}

/// Reassemble per-frame planes into a (time, lat, lon) volume.
pub(crate) fn stack_frames<T: Clone + Default>(frames: &[Array2<T>]) -> Array3<T> {
    let (h, w) = frames.first().map(|f| f.dim()).unwrap_or((0, 0));
    let mut out = Array3::<T>::default((frames.len(), h, w));
    for (t, frame) in frames.iter().enumerate() {
        out.index_axis_mut(Axis(0), t).assign(frame);
    }
    out
}
