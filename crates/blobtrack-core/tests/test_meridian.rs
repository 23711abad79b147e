mod common;

use approx::assert_relative_eq;
use ndarray::{Array1, Array3};

use blobtrack_core::detection::components::label_frames;
use blobtrack_core::detection::meridian::{fold_meridian, wrap_meridian};

use common::{block_mask, lon_axis};

#[test]
fn test_wrap_doubles_lon_axis_at_same_spacing() {
    let mask = block_mask((1, 4, 10), &[0], 1..3, 4..6);
    let (labels, _) = label_frames(&mask).unwrap();
    let wrapped = wrap_meridian(&labels, &lon_axis(10)).unwrap();

    assert_eq!(wrapped.labels.dim(), (1, 4, 20));
    assert_eq!(wrapped.lon.len(), 20);
    assert_relative_eq!(wrapped.lon[0], 0.0);
    assert_relative_eq!(wrapped.lon[10], 360.0);
    assert_relative_eq!(wrapped.lon[19], 684.0);
}

#[test]
fn test_wrap_moves_seam_regions_to_second_half() {
    let mut mask = Array3::from_elem((1, 5, 10), false);
    // Touches column 1 (inside the seam band).
    mask[[0, 1, 1]] = true;
    mask[[0, 1, 2]] = true;
    // Interior region.
    mask[[0, 3, 6]] = true;
    let (labels, _) = label_frames(&mask).unwrap();
    let wrapped = wrap_meridian(&labels, &lon_axis(10)).unwrap();

    assert_eq!(wrapped.labels[[0, 1, 1]], 0);
    assert_ne!(wrapped.labels[[0, 1, 11]], 0);
    assert_ne!(wrapped.labels[[0, 1, 12]], 0);
    assert_ne!(wrapped.labels[[0, 3, 6]], 0);
    assert_eq!(wrapped.labels[[0, 3, 16]], 0);
}

#[test]
fn test_round_trip_without_seam_features() {
    let mut mask = Array3::from_elem((3, 6, 12), false);
    mask[[0, 1, 4]] = true;
    mask[[0, 2, 5]] = true;
    mask[[1, 3, 9]] = true;
    mask[[1, 3, 10]] = true;
    mask[[2, 5, 6]] = true;
    let (labels, _) = label_frames(&mask).unwrap();

    let wrapped = wrap_meridian(&labels, &lon_axis(12)).unwrap();
    let folded = fold_meridian(&wrapped.labels).unwrap();
    assert_eq!(folded, labels);
    assert_eq!(folded.mapv(|l| l > 0), mask);
}

#[test]
fn test_round_trip_with_seam_features() {
    let mut mask = Array3::from_elem((2, 6, 12), false);
    mask[[0, 2, 0]] = true;
    mask[[0, 2, 11]] = true;
    mask[[1, 4, 1]] = true;
    let (labels, _) = label_frames(&mask).unwrap();

    let wrapped = wrap_meridian(&labels, &lon_axis(12)).unwrap();
    let folded = fold_meridian(&wrapped.labels).unwrap();
    assert_eq!(folded, labels);
}

#[test]
fn test_seam_crossing_region_becomes_one_component() {
    // One region cut in two by the seam: columns 8..10 and 0..2.
    let mut mask = Array3::from_elem((1, 6, 10), false);
    for row in 2..5 {
        for col in [8, 9, 0, 1] {
            mask[[0, row, col]] = true;
        }
    }
    let (labels, count) = label_frames(&mask).unwrap();
    assert_eq!(count, 2);

    let wrapped = wrap_meridian(&labels, &lon_axis(10)).unwrap();
    let (relabeled, recount) = label_frames(&wrapped.mask()).unwrap();
    assert_eq!(recount, 1);

    let folded = fold_meridian(&relabeled).unwrap();
    assert_eq!(folded[[0, 3, 9]], folded[[0, 3, 0]]);
    assert_ne!(folded[[0, 3, 0]], 0);
}

#[test]
fn test_wrap_rejects_mismatched_lon() {
    let labels = Array3::<u32>::zeros((1, 3, 8));
    let lon = Array1::from_vec(vec![0.0, 45.0, 90.0]);
    assert!(wrap_meridian(&labels, &lon).is_err());
}

#[test]
fn test_fold_rejects_odd_width() {
    let labels = Array3::<u32>::zeros((1, 3, 7));
    assert!(fold_meridian(&labels).is_err());
}
