//! Synthetic reference populations used to rank a journey by percentile.
use rand::Rng;

use crate::config::{Axis, JourneyConfig, SegmentStat};
use crate::sampler::DurationSampler;

/// Sorted (ascending) sample of simulated durations for one axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferencePopulation {
    sorted: Vec<f64>,
}

impl ReferencePopulation {
    /// Build from arbitrary durations, sorting them ascending.
    #[must_use]
    pub fn from_durations(mut durations: Vec<f64>) -> Self {
        durations.retain(|d| d.is_finite());
        durations.sort_by(f64::total_cmp);
        Self { sorted: durations }
    }

    /// Draw `sample_count` independent samples for one segment.
    pub fn build<R: Rng>(
        stat: &SegmentStat,
        sample_count: usize,
        sampler: &mut DurationSampler<R>,
    ) -> Self {
        let samples = (0..sample_count).map(|_| sampler.sample(stat)).collect();
        Self::from_durations(samples)
    }

    /// Draw `sample_count` journey totals, each the sum of one fresh sample per segment.
    pub fn build_total<R: Rng>(
        stats: &[SegmentStat],
        sample_count: usize,
        sampler: &mut DurationSampler<R>,
    ) -> Self {
        let samples = (0..sample_count)
            .map(|_| stats.iter().map(|stat| sampler.sample(stat)).sum())
            .collect();
        Self::from_durations(samples)
    }

    /// Number of elements `<= duration_ms`.
    #[must_use]
    pub fn count_at_or_below(&self, duration_ms: f64) -> usize {
        self.sorted.partition_point(|&value| value <= duration_ms)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.sorted
    }
}

/// Reference populations for the total axis and every segment axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationSet {
    pub total: ReferencePopulation,
    pub segments: Vec<ReferencePopulation>,
}

impl PopulationSet {
    /// Sample every axis described by `config`.
    pub fn build<R: Rng>(config: &JourneyConfig, sampler: &mut DurationSampler<R>) -> Self {
        let size = config.population_size;
        let segments = config
            .segments
            .iter()
            .map(|stat| ReferencePopulation::build(stat, size, sampler))
            .collect();
        let total = ReferencePopulation::build_total(&config.segments, size, sampler);
        log::debug!(
            "built reference populations: {} segments x {size} samples",
            config.segments.len()
        );
        Self { total, segments }
    }

    /// Population for `axis`, if present.
    #[must_use]
    pub fn get(&self, axis: Axis) -> Option<&ReferencePopulation> {
        match axis {
            Axis::Total => Some(&self.total),
            Axis::Segment(index) => self.segments.get(index),
        }
    }
}
