//! Built-in journey parameters and engine-wide limits.

/// Smallest duration the sampler will ever hand out, in milliseconds.
pub const MIN_SEGMENT_MS: f64 = 100.0;

/// Number of discrete rating levels.
pub const RATING_LEVEL_COUNT: usize = 5;

/// Cutoffs per threshold table (one fewer than the rating levels).
pub const THRESHOLD_CUTOFFS: usize = RATING_LEVEL_COUNT - 1;

/// Per-segment mean durations in milliseconds (Start → London, London → Tokyo, Tokyo → End).
pub const DEFAULT_SEGMENT_MEANS_MS: [f64; 3] = [485.28, 2198.38, 2145.91];

/// Per-segment standard deviations in milliseconds.
pub const DEFAULT_SEGMENT_STD_DEVS_MS: [f64; 3] = [245.48, 120.45, 129.14];

/// Display names for the four waypoints bounding the default three segments.
pub const DEFAULT_WAYPOINTS: [&str; 4] = ["Start", "London", "Tokyo", "End"];

/// Total-journey cutoffs in seconds.
pub const DEFAULT_TOTAL_THRESHOLDS_S: [f64; THRESHOLD_CUTOFFS] = [4.453, 4.624, 4.992, 5.203];

/// Per-segment cutoffs in seconds.
pub const DEFAULT_SEGMENT_THRESHOLDS_S: [[f64; THRESHOLD_CUTOFFS]; 3] = [
    [0.166, 0.308, 0.674, 0.826],
    [2.038, 2.128, 2.285, 2.358],
    [1.978, 2.043, 2.253, 2.317],
];

/// Samples drawn per axis when building reference populations.
pub const DEFAULT_POPULATION_SIZE: usize = 1_000;

/// Lower bounds (inclusive) of the percentile bands, best level first.
pub const PERCENTILE_BANDS: [f64; THRESHOLD_CUTOFFS] = [90.0, 75.0, 25.0, 10.0];

/// Frame cadence used by the bundled clocks, in milliseconds.
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 16.0;
