use crate::field::TrackedField;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Smoothing,
    Labeling,
    MeridianWrap,
    AreaFiltering,
    Tracking,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smoothing => write!(f, "Smoothing frames"),
            Self::Labeling => write!(f, "Labeling regions"),
            Self::MeridianWrap => write!(f, "Wrapping meridian"),
            Self::AreaFiltering => write!(f, "Filtering by area"),
            Self::Tracking => write!(f, "Tracking"),
        }
    }
}

/// Diagnostics attached to the tracked output.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackMetadata {
    /// Area threshold in km² below which regions were discarded.
    pub min_area: f64,
    /// Fraction of the total labeled area that survived the threshold.
    pub percent_area_kept: f64,
    /// Per-frame regions left after the area threshold.
    pub initial_features: usize,
    /// Distinct track ids after spatiotemporal linking.
    pub final_features: usize,
}

/// Result of a tracking run.
#[derive(Clone, Debug)]
pub struct TrackOutput {
    pub tracks: TrackedField,
    pub metadata: TrackMetadata,
}

/// Receives stage and frame progress from a tracking run.
///
/// Called from worker threads, hence `Send + Sync`. Every hook defaults to
/// doing nothing.
pub trait ProgressReporter: Send + Sync {
    /// Entering `stage`; `total_items` is the frame count when the stage
    /// works frame by frame.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// `items_done` more frames of the current stage are complete.
    fn advance(&self, _items_done: usize) {}

    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `track` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
