//! Immutable journey configuration: segment statistics, threshold tables and strategy switches.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::constants::{
    DEFAULT_POPULATION_SIZE, DEFAULT_SEGMENT_MEANS_MS, DEFAULT_SEGMENT_STD_DEVS_MS,
    DEFAULT_SEGMENT_THRESHOLDS_S, DEFAULT_TOTAL_THRESHOLDS_S, DEFAULT_WAYPOINTS,
    THRESHOLD_CUTOFFS,
};

/// Classification axis: the whole journey or one segment of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Total,
    Segment(usize),
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total => write!(f, "total"),
            Self::Segment(index) => write!(f, "segment {index}"),
        }
    }
}

/// Distribution parameters for one segment, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentStat {
    pub mean: f64,
    #[serde(alias = "stdDev")]
    pub std_dev: f64,
}

impl SegmentStat {
    #[must_use]
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    fn validate(&self, segment: usize) -> Result<(), ConfigError> {
        if !self.mean.is_finite() || self.mean <= 0.0 {
            return Err(ConfigError::NonPositiveMean {
                segment,
                value: self.mean,
            });
        }
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(ConfigError::NegativeStdDev {
                segment,
                value: self.std_dev,
            });
        }
        Ok(())
    }
}

/// Ascending cutoffs in seconds; cutoff `i` is the upper bound (inclusive) of level `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable(Vec<f64>);

impl ThresholdTable {
    #[must_use]
    pub const fn new(cutoffs: Vec<f64>) -> Self {
        Self(cutoffs)
    }

    #[must_use]
    pub fn cutoffs(&self) -> &[f64] {
        &self.0
    }

    /// Check the table against the rating scale.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the table is empty, has the wrong length, or descends.
    pub fn validate(&self, axis: Axis) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::EmptyThresholds { axis });
        }
        if self.0.len() != THRESHOLD_CUTOFFS {
            return Err(ConfigError::ThresholdCount {
                axis,
                expected: THRESHOLD_CUTOFFS,
                got: self.0.len(),
            });
        }
        if let Some(index) = self.0.iter().position(|cutoff| !cutoff.is_finite()) {
            return Err(ConfigError::NonFiniteThreshold { axis, index });
        }
        for (index, pair) in self.0.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(ConfigError::DescendingThresholds {
                    axis,
                    index: index + 1,
                    previous: pair[0],
                    value: pair[1],
                });
            }
        }
        Ok(())
    }
}

impl From<[f64; THRESHOLD_CUTOFFS]> for ThresholdTable {
    fn from(value: [f64; THRESHOLD_CUTOFFS]) -> Self {
        Self(value.to_vec())
    }
}

/// Threshold tables for the total axis and each segment axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub total: ThresholdTable,
    pub segments: Vec<ThresholdTable>,
}

impl ThresholdConfig {
    /// Table for `axis`, if configured.
    #[must_use]
    pub fn table(&self, axis: Axis) -> Option<&ThresholdTable> {
        match axis {
            Axis::Total => Some(&self.total),
            Axis::Segment(index) => self.segments.get(index),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            total: DEFAULT_TOTAL_THRESHOLDS_S.into(),
            segments: DEFAULT_SEGMENT_THRESHOLDS_S
                .iter()
                .copied()
                .map(ThresholdTable::from)
                .collect(),
        }
    }
}

/// Which classification strategy rates finished journeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    Threshold,
    Percentile,
}

impl ClassifierKind {
    /// Name matching [`Classifier::name`](crate::classifier::Classifier::name).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Percentile => "percentile",
        }
    }
}

/// Ground truth recorded for each finished segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSource {
    /// The sampled duration; display and rating never disagree.
    #[default]
    Generated,
    /// Elapsed clock time between segment start and its completion wakeup.
    WallClock,
}

impl TimingSource {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::WallClock => "wall_clock",
        }
    }
}

/// Complete journey configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyConfig {
    #[serde(default = "JourneyConfig::default_segments")]
    pub segments: Vec<SegmentStat>,
    #[serde(default = "JourneyConfig::default_waypoints")]
    pub waypoints: Vec<String>,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub classifier: ClassifierKind,
    #[serde(default)]
    pub timing: TimingSource,
    #[serde(default = "JourneyConfig::default_population_size")]
    pub population_size: usize,
}

impl JourneyConfig {
    #[must_use]
    pub fn default_segments() -> Vec<SegmentStat> {
        DEFAULT_SEGMENT_MEANS_MS
            .iter()
            .zip(DEFAULT_SEGMENT_STD_DEVS_MS)
            .map(|(&mean, std_dev)| SegmentStat::new(mean, std_dev))
            .collect()
    }

    #[must_use]
    pub fn default_waypoints() -> Vec<String> {
        DEFAULT_WAYPOINTS.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub const fn default_population_size() -> usize {
        DEFAULT_POPULATION_SIZE
    }

    /// Parse a JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and any validation error otherwise.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of segments (N).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of regions (N + 1 waypoints).
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.segments.len() + 1
    }

    /// Label such as `London → Tokyo` for `segment`.
    #[must_use]
    pub fn segment_label(&self, segment: usize) -> String {
        match (self.waypoints.get(segment), self.waypoints.get(segment + 1)) {
            (Some(from), Some(to)) => format!("{from} → {to}"),
            _ => format!("Segment {}", segment + 1),
        }
    }

    #[must_use]
    pub const fn with_classifier(mut self, classifier: ClassifierKind) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub const fn with_timing(mut self, timing: TimingSource) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub const fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Validate configuration invariants before any run starts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segments.is_empty() {
            return Err(ConfigError::NoSegments);
        }
        for (segment, stat) in self.segments.iter().enumerate() {
            stat.validate(segment)?;
        }
        if self.thresholds.segments.len() != self.segments.len() {
            return Err(ConfigError::SegmentTableCount {
                segments: self.segments.len(),
                tables: self.thresholds.segments.len(),
            });
        }
        self.thresholds.total.validate(Axis::Total)?;
        for (segment, table) in self.thresholds.segments.iter().enumerate() {
            table.validate(Axis::Segment(segment))?;
        }
        if self.waypoints.len() != self.region_count() {
            return Err(ConfigError::WaypointCount {
                expected: self.region_count(),
                got: self.waypoints.len(),
            });
        }
        Ok(())
    }
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            segments: Self::default_segments(),
            waypoints: Self::default_waypoints(),
            thresholds: ThresholdConfig::default(),
            classifier: ClassifierKind::default(),
            timing: TimingSource::default(),
            population_size: Self::default_population_size(),
        }
    }
}

/// Errors raised when journey configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration must define at least one segment")]
    NoSegments,
    #[error("segment {segment} mean must be positive (got {value})")]
    NonPositiveMean { segment: usize, value: f64 },
    #[error("segment {segment} standard deviation must be non-negative (got {value})")]
    NegativeStdDev { segment: usize, value: f64 },
    #[error("{axis} threshold table is empty")]
    EmptyThresholds { axis: Axis },
    #[error("{axis} threshold table needs {expected} cutoffs (got {got})")]
    ThresholdCount {
        axis: Axis,
        expected: usize,
        got: usize,
    },
    #[error("{axis} threshold {index} is not a finite number")]
    NonFiniteThreshold { axis: Axis, index: usize },
    #[error("{axis} threshold {index} descends ({value} after {previous})")]
    DescendingThresholds {
        axis: Axis,
        index: usize,
        previous: f64,
        value: f64,
    },
    #[error("{segments} segments configured but {tables} segment threshold tables")]
    SegmentTableCount { segments: usize, tables: usize },
    #[error("expected {expected} waypoint names (got {got})")]
    WaypointCount { expected: usize, got: usize },
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}
