mod common;

use ndarray::{Array2, Array3, Axis};

use blobtrack_core::detection::components::{label_frame, label_frames, label_volume};

use common::block_mask;

#[test]
fn test_label_frame_empty() {
    let mask = Array2::from_elem((6, 6), false);
    let (labels, count) = label_frame(&mask.view()).unwrap();
    assert_eq!(count, 0);
    assert!(labels.iter().all(|&l| l == 0));
}

#[test]
fn test_label_frame_diagonal_is_connected() {
    let mut mask = Array2::from_elem((4, 4), false);
    mask[[0, 0]] = true;
    mask[[1, 1]] = true;
    mask[[2, 2]] = true;
    mask[[1, 3]] = true;
    // Anti-diagonal neighbour of (2, 2) is (1, 3).
    let (labels, count) = label_frame(&mask.view()).unwrap();
    assert_eq!(count, 1);
    assert_eq!(labels[[0, 0]], labels[[1, 3]]);
}

#[test]
fn test_label_frame_scan_order_numbering() {
    let mut mask = Array2::from_elem((5, 7), false);
    // Component first seen at (0, 5) should be 1, then (2, 0) -> 2.
    mask[[0, 5]] = true;
    mask[[1, 5]] = true;
    mask[[2, 0]] = true;
    mask[[4, 3]] = true;
    let (labels, count) = label_frame(&mask.view()).unwrap();
    assert_eq!(count, 3);
    assert_eq!(labels[[0, 5]], 1);
    assert_eq!(labels[[1, 5]], 1);
    assert_eq!(labels[[2, 0]], 2);
    assert_eq!(labels[[4, 3]], 3);
}

#[test]
fn test_label_frame_has_no_seam_awareness() {
    // Cells in the first and last column are not neighbours.
    let mut mask = Array2::from_elem((3, 6), false);
    mask[[1, 0]] = true;
    mask[[1, 5]] = true;
    let (_, count) = label_frame(&mask.view()).unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_label_frames_unique_across_time() {
    let mut mask = Array3::from_elem((4, 8, 8), false);
    // Frame 0: two components; frame 1: none; frame 2: one; frame 3: two.
    mask[[0, 1, 1]] = true;
    mask[[0, 6, 6]] = true;
    mask[[2, 3, 3]] = true;
    mask[[3, 0, 0]] = true;
    mask[[3, 7, 7]] = true;

    let (labels, total) = label_frames(&mask).unwrap();
    assert_eq!(total, 5);
    assert_eq!(labels[[0, 1, 1]], 1);
    assert_eq!(labels[[0, 6, 6]], 2);
    // The empty frame contributes nothing to the offset.
    assert_eq!(labels[[2, 3, 3]], 3);
    assert_eq!(labels[[3, 0, 0]], 4);
    assert_eq!(labels[[3, 7, 7]], 5);
}

#[test]
fn test_later_frames_have_strictly_greater_labels() {
    let mut mask = Array3::from_elem((6, 10, 10), false);
    for t in 0..6 {
        for k in 0..=t {
            mask[[t, k, (2 * k) % 10]] = true;
        }
    }
    let (labels, _) = label_frames(&mask).unwrap();

    let frame_labels: Vec<Vec<u32>> = labels
        .axis_iter(Axis(0))
        .map(|f| f.iter().copied().filter(|&l| l > 0).collect())
        .collect();
    for t1 in 0..6 {
        for t2 in (t1 + 1)..6 {
            let max1 = frame_labels[t1].iter().max().copied().unwrap_or(0);
            let min2 = frame_labels[t2].iter().min().copied().unwrap_or(u32::MAX);
            assert!(max1 < min2, "frame {t1} max {max1} vs frame {t2} min {min2}");
        }
    }
}

#[test]
fn test_label_frames_keeps_background_zero() {
    let mask = block_mask((3, 6, 6), &[0, 1, 2], 1..3, 1..3);
    let (labels, total) = label_frames(&mask).unwrap();
    assert_eq!(total, 3);
    for ((t, row, col), &l) in labels.indexed_iter() {
        assert_eq!(l == 0, !mask[[t, row, col]]);
    }
}

#[test]
fn test_label_volume_links_consecutive_frames() {
    let mask = block_mask((3, 8, 8), &[0, 1, 2], 2..5, 2..5);
    let (labels, count) = label_volume(&mask.view()).unwrap();
    assert_eq!(count, 1);
    assert_eq!(labels[[0, 2, 2]], labels[[2, 4, 4]]);
}

#[test]
fn test_label_volume_diagonal_in_time() {
    let mut mask = Array3::from_elem((2, 5, 5), false);
    mask[[0, 1, 1]] = true;
    mask[[1, 2, 2]] = true;
    let (_, count) = label_volume(&mask.view()).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_label_volume_gap_frame_splits() {
    let mask = block_mask((3, 8, 8), &[0, 2], 2..5, 2..5);
    let (labels, count) = label_volume(&mask.view()).unwrap();
    assert_eq!(count, 2);
    assert_ne!(labels[[0, 3, 3]], labels[[2, 3, 3]]);
}

#[test]
fn test_planar_volume_numbering_matches_offsets() {
    use blobtrack_core::detection::components::{connected_components, Connectivity};

    let mask = block_mask((3, 6, 6), &[0, 1, 2], 1..4, 1..4);
    let (planar, count) = connected_components(&mask.view(), Connectivity::Planar).unwrap();
    let (offset, total) = label_frames(&mask).unwrap();
    assert_eq!(count, 3);
    assert_eq!(planar, offset);
    assert_eq!(total, count);
}
