use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_AREA_QUANTILE, DEFAULT_RADIUS};
use crate::error::{BlobTrackError, Result};

/// Tunable parameters of the tracking pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Radius, in grid cells, of the disk used for closing and opening.
    #[serde(default = "default_radius")]
    pub radius: usize,
    /// Percentile (as a fraction in [0, 1)) of the region-area distribution
    /// below which regions are discarded.
    #[serde(default = "default_area_quantile")]
    pub area_quantile: f64,
}

fn default_radius() -> usize {
    DEFAULT_RADIUS
}
fn default_area_quantile() -> f64 {
    DEFAULT_AREA_QUANTILE
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            area_quantile: DEFAULT_AREA_QUANTILE,
        }
    }
}

impl TrackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(BlobTrackError::InvalidConfiguration(
                "radius must be a positive number of grid cells".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.area_quantile) {
            return Err(BlobTrackError::InvalidConfiguration(format!(
                "area_quantile must lie in [0, 1), got {}",
                self.area_quantile
            )));
        }
        Ok(())
    }
}
