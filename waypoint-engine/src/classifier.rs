//! Mapping durations to rating levels.
//!
//! Two interchangeable strategies implement [`Classifier`]: fixed threshold tables
//! ([`ThresholdClassifier`]) and percentile rank against a synthetic reference
//! population ([`PercentileClassifier`]). The state machine and presenter only see
//! the trait.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{Axis, JourneyConfig, ThresholdConfig, ThresholdTable};
use crate::constants::PERCENTILE_BANDS;
use crate::numbers::{ms_to_seconds, usize_to_f64};
use crate::population::{PopulationSet, ReferencePopulation};
use crate::rating::RatingLevel;
use crate::sampler::DurationSampler;

/// Outcome of classifying one observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub level: RatingLevel,
    /// Percentile rank, present only for population-based strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
    /// Size of the population the percentile was computed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_size: Option<usize>,
}

impl Classification {
    #[must_use]
    pub const fn from_level(level: RatingLevel) -> Self {
        Self {
            level,
            percentile: None,
            population_size: None,
        }
    }
}

/// Capability shared by every classification strategy.
pub trait Classifier {
    /// Rate `duration_ms` on `axis`.
    fn classify(&self, axis: Axis, duration_ms: f64) -> Classification;

    /// Short strategy name for logs and reports.
    fn name(&self) -> &'static str;
}

impl fmt::Debug for dyn Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("name", &self.name())
            .finish()
    }
}

impl<T: Classifier + ?Sized> Classifier for Box<T> {
    fn classify(&self, axis: Axis, duration_ms: f64) -> Classification {
        (**self).classify(axis, duration_ms)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// First level whose cutoff is `>=` the duration in seconds; the worst level otherwise.
#[must_use]
pub fn classify_by_threshold(duration_ms: f64, thresholds: &ThresholdTable) -> RatingLevel {
    let seconds = ms_to_seconds(duration_ms);
    thresholds
        .cutoffs()
        .iter()
        .position(|&cutoff| seconds <= cutoff)
        .map_or(RatingLevel::WORST, RatingLevel::from_index)
}

/// `100 × (elements <= duration) / size`; 0 for an empty population.
#[must_use]
pub fn calculate_percentile(duration_ms: f64, population: &ReferencePopulation) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let at_or_below = usize_to_f64(population.count_at_or_below(duration_ms));
    100.0 * at_or_below / usize_to_f64(population.len())
}

/// Band a percentile: `[90,100]` best, `[75,90)`, `[25,75)`, `[10,25)`, `[0,10)` worst.
#[must_use]
pub fn rating_for_percentile(percentile: f64) -> RatingLevel {
    PERCENTILE_BANDS
        .iter()
        .position(|&floor| percentile >= floor)
        .map_or(RatingLevel::WORST, RatingLevel::from_index)
}

/// Percentile rank and its band.
#[must_use]
pub fn classify_by_percentile(
    duration_ms: f64,
    population: &ReferencePopulation,
) -> (f64, RatingLevel) {
    let percentile = calculate_percentile(duration_ms, population);
    (percentile, rating_for_percentile(percentile))
}

/// Fixed threshold-table strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdClassifier {
    thresholds: ThresholdConfig,
}

impl ThresholdClassifier {
    #[must_use]
    pub const fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }
}

impl Classifier for ThresholdClassifier {
    fn classify(&self, axis: Axis, duration_ms: f64) -> Classification {
        let level = self.thresholds.table(axis).map_or_else(
            || {
                log::warn!("no threshold table for {axis}; rating as worst");
                RatingLevel::WORST
            },
            |table| classify_by_threshold(duration_ms, table),
        );
        Classification::from_level(level)
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}

/// Percentile-against-reference-population strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileClassifier {
    populations: PopulationSet,
}

impl PercentileClassifier {
    #[must_use]
    pub const fn new(populations: PopulationSet) -> Self {
        Self { populations }
    }

    /// Sample fresh populations for every axis in `config`.
    pub fn build<R: Rng>(config: &JourneyConfig, sampler: &mut DurationSampler<R>) -> Self {
        Self::new(PopulationSet::build(config, sampler))
    }

    #[must_use]
    pub const fn populations(&self) -> &PopulationSet {
        &self.populations
    }
}

impl Classifier for PercentileClassifier {
    fn classify(&self, axis: Axis, duration_ms: f64) -> Classification {
        let empty = ReferencePopulation::default();
        let population = self.populations.get(axis).unwrap_or(&empty);
        let (percentile, level) = classify_by_percentile(duration_ms, population);
        Classification {
            level,
            percentile: Some(percentile),
            population_size: Some(population.len()),
        }
    }

    fn name(&self) -> &'static str {
        "percentile"
    }
}
