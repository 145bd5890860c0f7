//! Seeded, fully wired journey: config, duration source and classifier in one place.
use rand::rngs::SmallRng;

use super::{JourneyError, JourneyMachine, run_journey};
use crate::classifier::{Classifier, PercentileClassifier, ThresholdClassifier};
use crate::clock::EventLoop;
use crate::config::{ClassifierKind, ConfigError, JourneyConfig, SegmentStat};
use crate::presenter::ResultsReport;
use crate::rng::{CountingRng, RngStreams};
use crate::sampler::{DurationSampler, DurationSource, ScriptedDurations};
use crate::sink::PresentationSink;

/// Duration source chosen for a session.
#[derive(Debug, Clone)]
pub enum SessionDurations {
    Sampled(DurationSampler<CountingRng<SmallRng>>),
    Scripted(ScriptedDurations),
}

impl SessionDurations {
    /// Random draws consumed so far; scripted sources draw nothing.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        match self {
            Self::Sampled(sampler) => sampler.rng().draws(),
            Self::Scripted(_) => 0,
        }
    }
}

impl DurationSource for SessionDurations {
    fn next_duration(&mut self, segment: usize, stat: &SegmentStat) -> f64 {
        match self {
            Self::Sampled(sampler) => sampler.next_duration(segment, stat),
            Self::Scripted(script) => script.next_duration(segment, stat),
        }
    }
}

pub type SessionMachine = JourneyMachine<SessionDurations, Box<dyn Classifier>>;

/// A machine built from one user seed.
///
/// The seed feeds two HMAC-derived streams: `journey` for live segment durations and
/// `population` for the percentile strategy's reference populations. Sampling the
/// populations therefore never perturbs the durations a seed produces.
#[derive(Debug)]
pub struct JourneySession {
    seed: u64,
    population_draws: u64,
    machine: SessionMachine,
}

impl JourneySession {
    /// Session with sampled durations.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation.
    pub fn new(config: JourneyConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::build(config, seed, None)
    }

    /// Session replaying `durations` instead of sampling.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation.
    pub fn with_durations(
        config: JourneyConfig,
        seed: u64,
        durations: ScriptedDurations,
    ) -> Result<Self, ConfigError> {
        Self::build(config, seed, Some(durations))
    }

    fn build(
        config: JourneyConfig,
        seed: u64,
        script: Option<ScriptedDurations>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (journey_rng, population_rng) = RngStreams::from_user_seed(seed).into_parts();

        let mut population_draws = 0;
        let classifier: Box<dyn Classifier> = match config.classifier {
            ClassifierKind::Threshold => {
                Box::new(ThresholdClassifier::new(config.thresholds.clone()))
            }
            ClassifierKind::Percentile => {
                let mut sampler = DurationSampler::new(population_rng);
                let classifier = PercentileClassifier::build(&config, &mut sampler);
                population_draws = sampler.rng().draws();
                Box::new(classifier)
            }
        };

        let durations = script.map_or_else(
            || SessionDurations::Sampled(DurationSampler::new(journey_rng)),
            SessionDurations::Scripted,
        );
        log::debug!(
            "session seed {seed}: {} classifier, {population_draws} population draws",
            classifier.name()
        );

        Ok(Self {
            seed,
            population_draws,
            machine: JourneyMachine::new(config, durations, classifier)?,
        })
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub const fn machine_mut(&mut self) -> &mut SessionMachine {
        &mut self.machine
    }

    /// Draws consumed by the journey and population streams combined.
    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.population_draws + self.machine.durations().draws()
    }

    /// Run one journey to completion.
    ///
    /// # Errors
    ///
    /// See [`run_journey`].
    pub fn run<E, S>(
        &mut self,
        event_loop: &mut E,
        sink: &mut S,
    ) -> Result<ResultsReport, JourneyError>
    where
        E: EventLoop + ?Sized,
        S: PresentationSink + ?Sized,
    {
        run_journey(&mut self.machine, event_loop, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::sink::MemorySink;

    #[test]
    fn same_seed_replays_same_durations() {
        let run = |seed| {
            let mut session = JourneySession::new(JourneyConfig::default(), seed).unwrap();
            let mut clock = VirtualClock::new();
            let mut sink = MemorySink::new(3);
            session.run(&mut clock, &mut sink).unwrap()
        };
        assert_eq!(run(1337), run(1337));
        assert_ne!(run(1337).total_ms, run(7).total_ms);
    }

    #[test]
    fn percentile_populations_do_not_shift_journey_durations() {
        let threshold_config = JourneyConfig::default();
        let percentile_config =
            JourneyConfig::default().with_classifier(ClassifierKind::Percentile);

        let mut threshold = JourneySession::new(threshold_config, 42).unwrap();
        let mut percentile = JourneySession::new(percentile_config, 42).unwrap();
        let a = threshold
            .run(&mut VirtualClock::new(), &mut MemorySink::new(3))
            .unwrap();
        let b = percentile
            .run(&mut VirtualClock::new(), &mut MemorySink::new(3))
            .unwrap();
        assert!((a.total_ms - b.total_ms).abs() < f64::EPSILON);
        assert_eq!(b.classifier, "percentile");
        assert!(b.total.description.is_some());
        // 1000 samples per segment plus 3×1000 for the totals, two draws each.
        assert_eq!(percentile.rng_draws(), 2 * 6_000 + 2 * 3);
    }

    #[test]
    fn scripted_session_uses_no_randomness() {
        let mut session = JourneySession::with_durations(
            JourneyConfig::default(),
            1,
            ScriptedDurations::new(vec![600.0, 2_200.0, 2_100.0]),
        )
        .unwrap();
        let report = session
            .run(&mut VirtualClock::new(), &mut MemorySink::new(3))
            .unwrap();
        assert_eq!(report.total_text, "4.900s");
        assert_eq!(session.rng_draws(), 0);
        assert_eq!(session.seed(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = JourneyConfig {
            segments: Vec::new(),
            ..JourneyConfig::default()
        };
        assert!(matches!(
            JourneySession::new(config, 1),
            Err(ConfigError::NoSegments)
        ));
    }
}
