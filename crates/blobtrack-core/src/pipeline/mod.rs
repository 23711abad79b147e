pub mod config;
mod orchestrator;
mod types;

pub use config::TrackConfig;
pub use orchestrator::{track, track_reported};
pub use types::{PipelineStage, ProgressReporter, TrackMetadata, TrackOutput};
