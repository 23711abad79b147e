use std::sync::Arc;

use tracing::info;

use crate::detection::{
    filter_by_area, label_frames, smooth_field, track_features, wrap_meridian,
};
use crate::error::{BlobTrackError, Result};
use crate::field::{RasterField, TrackedField};

use super::config::TrackConfig;
use super::types::{NoOpReporter, PipelineStage, ProgressReporter, TrackMetadata, TrackOutput};

/// Detect, filter and track anomaly regions with a thread-safe progress reporter.
pub fn track_reported(
    field: &RasterField,
    config: &TrackConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<TrackOutput> {
    config.validate()?;
    if !field.has_signal() {
        return Err(BlobTrackError::EmptyDetection(
            "input contains no positive values".into(),
        ));
    }

    let (frames, nlat, nlon) = field.dim();
    info!(
        frames,
        lat = nlat,
        lon = nlon,
        radius = config.radius,
        area_quantile = config.area_quantile,
        "Tracking anomaly regions"
    );

    reporter.begin_stage(PipelineStage::Smoothing, Some(frames));
    let smoothed = smooth_field(field.data(), config.radius)?;
    reporter.advance(frames);
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Labeling, Some(frames));
    let (labels, raw_count) = label_frames(&smoothed)?;
    drop(smoothed);
    reporter.advance(frames);
    reporter.finish_stage();
    if raw_count == 0 {
        return Err(BlobTrackError::EmptyDetection(format!(
            "no regions survive smoothing with radius {}",
            config.radius
        )));
    }

    reporter.begin_stage(PipelineStage::MeridianWrap, Some(frames));
    let wrapped = wrap_meridian(&labels, field.lon())?;
    drop(labels);
    let (wrapped_labels, wrapped_count) = label_frames(&wrapped.mask())?;
    reporter.advance(frames);
    reporter.finish_stage();
    info!(
        before = raw_count,
        after = wrapped_count,
        "Relabeled after meridian wrap"
    );

    reporter.begin_stage(PipelineStage::AreaFiltering, Some(frames));
    let area = filter_by_area(
        &wrapped_labels,
        field.lat(),
        field.spacing(),
        config.area_quantile,
    )?;
    drop(wrapped_labels);
    let (features, initial_features) = label_frames(&area.retained)?;
    reporter.advance(frames);
    reporter.finish_stage();
    info!(initial_features, "Initial features identified");

    reporter.begin_stage(PipelineStage::Tracking, None);
    let tracks = track_features(&features.mapv(|l| l > 0))?;
    reporter.finish_stage();
    info!(final_features = tracks.count, "Final features tracked");

    let tracked = TrackedField::from_labels(
        &tracks.labels,
        field.time().clone(),
        field.lat().clone(),
        field.lon().clone(),
    );

    Ok(TrackOutput {
        tracks: tracked,
        metadata: TrackMetadata {
            min_area: area.min_area,
            percent_area_kept: area.percent_area_kept,
            initial_features,
            final_features: tracks.count,
        },
    })
}

/// Detect, filter and track anomaly regions.
pub fn track(field: &RasterField, config: &TrackConfig) -> Result<TrackOutput> {
    track_reported(field, config, Arc::new(NoOpReporter))
}
