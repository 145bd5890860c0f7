//! Randomized segment durations drawn from a floored normal distribution.
use rand::Rng;
use rand::distributions::OpenClosed01;
use std::f64::consts::PI;

use crate::config::SegmentStat;
use crate::constants::MIN_SEGMENT_MS;

/// Standard-normal deviate from two uniforms via the Box–Muller transform.
///
/// `u1` must lie in (0, 1]; zero would send the logarithm to infinity.
#[must_use]
pub fn box_muller(u1: f64, u2: f64) -> f64 {
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Duration for `stat` given two uniforms, floored at [`MIN_SEGMENT_MS`].
#[must_use]
pub fn duration_from_uniforms(stat: &SegmentStat, u1: f64, u2: f64) -> f64 {
    let z = box_muller(u1, u2);
    let raw = z.mul_add(stat.std_dev, stat.mean);
    if raw.is_nan() {
        return MIN_SEGMENT_MS;
    }
    raw.max(MIN_SEGMENT_MS)
}

/// Anything able to hand the state machine the duration for a segment.
pub trait DurationSource {
    /// Duration in milliseconds for `segment`, whose configured statistics are `stat`.
    fn next_duration(&mut self, segment: usize, stat: &SegmentStat) -> f64;
}

impl<T: DurationSource + ?Sized> DurationSource for Box<T> {
    fn next_duration(&mut self, segment: usize, stat: &SegmentStat) -> f64 {
        (**self).next_duration(segment, stat)
    }
}

/// Random sampler backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct DurationSampler<R> {
    rng: R,
}

impl<R: Rng> DurationSampler<R> {
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one duration for `stat`.
    pub fn sample(&mut self, stat: &SegmentStat) -> f64 {
        let u1: f64 = self.rng.sample(OpenClosed01);
        let u2: f64 = self.rng.sample(OpenClosed01);
        duration_from_uniforms(stat, u1, u2)
    }

    /// Borrow the underlying generator.
    #[must_use]
    pub const fn rng(&self) -> &R {
        &self.rng
    }
}

impl<R: Rng> DurationSource for DurationSampler<R> {
    fn next_duration(&mut self, _segment: usize, stat: &SegmentStat) -> f64 {
        self.sample(stat)
    }
}

/// Replays a fixed list of durations, cycling when exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedDurations {
    durations: Vec<f64>,
    cursor: usize,
}

impl ScriptedDurations {
    /// Script the given durations; non-finite entries are floored like sampled ones.
    #[must_use]
    pub fn new(durations: Vec<f64>) -> Self {
        let durations = durations
            .into_iter()
            .map(|ms| if ms.is_finite() { ms.max(MIN_SEGMENT_MS) } else { MIN_SEGMENT_MS })
            .collect();
        Self {
            durations,
            cursor: 0,
        }
    }
}

impl DurationSource for ScriptedDurations {
    fn next_duration(&mut self, _segment: usize, stat: &SegmentStat) -> f64 {
        if self.durations.is_empty() {
            return stat.mean.max(MIN_SEGMENT_MS);
        }
        let value = self.durations[self.cursor % self.durations.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::CountingRng;

    #[test]
    fn box_muller_known_points() {
        assert!(box_muller(1.0, 0.25).abs() < 1e-12);
        let z = box_muller((-0.5f64).exp(), 0.0);
        assert!((z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn floor_applies_to_low_draws() {
        let stat = SegmentStat::new(485.28, 245.48);
        // z ≈ -3.03 pushes far below zero before flooring.
        let d = duration_from_uniforms(&stat, 0.01, 0.5);
        assert!((d - MIN_SEGMENT_MS).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_std_dev_returns_mean() {
        let stat = SegmentStat::new(2_000.0, 0.0);
        let mut sampler = DurationSampler::new(CountingRng::new(3));
        for _ in 0..32 {
            assert!((sampler.sample(&stat) - 2_000.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn samples_never_drop_below_floor() {
        let stat = SegmentStat::new(150.0, 500.0);
        let mut sampler = DurationSampler::new(CountingRng::new(11));
        for _ in 0..2_000 {
            assert!(sampler.sample(&stat) >= MIN_SEGMENT_MS);
        }
        assert_eq!(sampler.rng().draws(), 4_000);
    }

    #[test]
    fn scripted_durations_cycle_and_floor() {
        let stat = SegmentStat::new(500.0, 10.0);
        let mut script = ScriptedDurations::new(vec![600.0, 20.0]);
        assert!((script.next_duration(0, &stat) - 600.0).abs() < f64::EPSILON);
        assert!((script.next_duration(1, &stat) - MIN_SEGMENT_MS).abs() < f64::EPSILON);
        assert!((script.next_duration(2, &stat) - 600.0).abs() < f64::EPSILON);

        let mut empty = ScriptedDurations::new(Vec::new());
        assert!((empty.next_duration(0, &stat) - 500.0).abs() < f64::EPSILON);
    }
}
