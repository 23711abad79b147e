use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobTrackError {
    #[error("Invalid input shape: {0}")]
    InvalidInputShape(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No features detected: {0}")]
    EmptyDetection(String),

    #[error("Non-uniform {axis} spacing: expected {expected}, found {found}")]
    CoordinateSpacingViolation {
        axis: &'static str,
        expected: f64,
        found: f64,
    },
}

pub type Result<T> = std::result::Result<T, BlobTrackError>;
