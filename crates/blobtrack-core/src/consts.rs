/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Default radius (grid cells) of the disk used for closing and opening.
pub const DEFAULT_RADIUS: usize = 8;

/// Default percentile (as a fraction) of the region-area distribution below
/// which regions are discarded. 0.75 keeps the largest quarter.
pub const DEFAULT_AREA_QUANTILE: f64 = 0.75;

/// Kilometres per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;

/// Number of leading longitude columns whose labels are treated as possible
/// continuations of regions cut by the seam.
pub const SEAM_BAND_COLUMNS: usize = 2;

/// Relative tolerance on coordinate steps before the grid is rejected as
/// non-uniform.
pub const SPACING_TOLERANCE: f64 = 1e-3;

/// Degrees in one revolution of the longitude axis.
pub const FULL_REVOLUTION_DEG: f64 = 360.0;
