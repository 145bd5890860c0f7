//! Segment-sequencing state machine.
//!
//! `Idle → Running(0) → … → Running(N-1) → Completed → Idle`. Each segment samples a
//! duration, schedules a one-shot wakeup for when it elapses and keeps a per-frame
//! tick alive that writes the elapsed total and the segment's progress to the sink.
//! Wakeups carry the run generation that scheduled them; anything from an older run,
//! or arriving after the run stopped, is dropped.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::classifier::Classifier;
use crate::clock::{Clock, EventLoop, Scheduler, Wakeup, WakeupKind};
use crate::config::{ConfigError, JourneyConfig, TimingSource};
use crate::constants::MIN_SEGMENT_MS;
use crate::numbers::{format_seconds, percent_of};
use crate::presenter::{ResultsPresenter, ResultsReport};
use crate::sampler::DurationSource;
use crate::sink::{PresentationSink, RegionState, SinkElement, SinkError};

pub mod session;
pub use session::{JourneySession, SessionDurations};

/// Where the state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyPhase {
    #[default]
    Idle,
    Running {
        segment: usize,
    },
    /// Transient: held only while the finished run is presented. The completing call
    /// returns with the machine back in `Idle`, so callers never observe it.
    Completed,
}

impl JourneyPhase {
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { run_id: u64 },
    /// A run is already in progress; nothing changed.
    AlreadyRunning,
}

/// Mutable record of one execution of the sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyRun {
    run_id: u64,
    segment_durations: Vec<f64>,
    running: bool,
    current_segment_index: usize,
    current_segment_start: f64,
    current_segment_duration: f64,
}

impl JourneyRun {
    fn begin(run_id: u64) -> Self {
        Self {
            run_id,
            running: true,
            ..Self::default()
        }
    }

    /// A completed run with the given recorded durations.
    #[must_use]
    pub fn finished(run_id: u64, segment_durations: Vec<f64>) -> Self {
        Self {
            run_id,
            current_segment_index: segment_durations.len().saturating_sub(1),
            current_segment_duration: segment_durations.last().copied().unwrap_or(0.0),
            segment_durations,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Recorded durations, one per completed segment.
    #[must_use]
    pub fn segment_durations(&self) -> &[f64] {
        &self.segment_durations
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn current_segment_index(&self) -> usize {
        self.current_segment_index
    }

    #[must_use]
    pub const fn current_segment_start(&self) -> f64 {
        self.current_segment_start
    }

    #[must_use]
    pub const fn current_segment_duration(&self) -> f64 {
        self.current_segment_duration
    }

    /// Sum of recorded segment durations.
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.segment_durations.iter().sum()
    }
}

#[derive(Debug, Error)]
pub enum JourneyError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("results could not be presented: {0}")]
    Results(#[from] SinkError),
    #[error("run {run_id} stalled with no pending wakeups")]
    Stalled { run_id: u64 },
}

/// The journey state machine, parameterized by duration source and classifier.
#[derive(Debug)]
pub struct JourneyMachine<D, C> {
    config: JourneyConfig,
    durations: D,
    classifier: C,
    presenter: ResultsPresenter,
    phase: JourneyPhase,
    run: JourneyRun,
    generation: u64,
    last_report: Option<ResultsReport>,
    degraded: HashSet<SinkElement>,
}

impl<D, C> JourneyMachine<D, C>
where
    D: DurationSource,
    C: Classifier,
{
    /// Build an idle machine.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation.
    pub fn new(config: JourneyConfig, durations: D, classifier: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let presenter = ResultsPresenter::from_config(&config);
        Ok(Self {
            config,
            durations,
            classifier,
            presenter,
            phase: JourneyPhase::Idle,
            run: JourneyRun::default(),
            generation: 0,
            last_report: None,
            degraded: HashSet::new(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &JourneyConfig {
        &self.config
    }

    #[must_use]
    pub const fn phase(&self) -> JourneyPhase {
        self.phase
    }

    #[must_use]
    pub const fn run(&self) -> &JourneyRun {
        &self.run
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.phase.is_running()
    }

    #[must_use]
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }

    #[must_use]
    pub const fn durations(&self) -> &D {
        &self.durations
    }

    #[must_use]
    pub const fn presenter(&self) -> &ResultsPresenter {
        &self.presenter
    }

    /// Most recent results, if a run has completed and presented successfully.
    #[must_use]
    pub const fn last_report(&self) -> Option<&ResultsReport> {
        self.last_report.as_ref()
    }

    /// Completed segments plus progress into the current one, capped at its duration.
    #[must_use]
    pub fn elapsed_ms(&self, now: f64) -> f64 {
        let completed = self.run.total_ms();
        if !self.run.running || self.run.current_segment_duration <= 0.0 {
            return completed;
        }
        let into_segment = (now - self.run.current_segment_start).max(0.0);
        completed + into_segment.min(self.run.current_segment_duration)
    }

    /// Begin a new run. A request while running is a no-op.
    pub fn start<E, S>(&mut self, clock: &mut E, sink: &mut S) -> StartOutcome
    where
        E: Clock + Scheduler + ?Sized,
        S: PresentationSink + ?Sized,
    {
        if self.phase.is_running() {
            log::debug!("start ignored: run {} still in progress", self.run.run_id);
            return StartOutcome::AlreadyRunning;
        }

        self.generation = self.generation.wrapping_add(1);
        self.run = JourneyRun::begin(self.generation);
        self.degraded.clear();
        log::debug!("run {} starting", self.generation);

        self.reset_sink(sink);
        self.cosmetic(sink.set_start_enabled(false));
        self.cosmetic(sink.set_timer_visible(true));
        self.cosmetic(sink.set_results_visible(false));
        self.cosmetic(sink.set_region_state(0, RegionState::Active));

        self.begin_segment(0, clock);
        self.tick(clock.now(), sink);
        clock.request_frame(Wakeup::frame(self.generation));
        StartOutcome::Started {
            run_id: self.generation,
        }
    }

    /// Deliver a wakeup. Returns the results report once the run completes.
    ///
    /// # Errors
    ///
    /// Returns `JourneyError::Results` when the results panel cannot be written. The
    /// machine is back in `Idle` either way.
    pub fn handle<E, S>(
        &mut self,
        wakeup: Wakeup,
        clock: &mut E,
        sink: &mut S,
    ) -> Result<Option<ResultsReport>, JourneyError>
    where
        E: Clock + Scheduler + ?Sized,
        S: PresentationSink + ?Sized,
    {
        if wakeup.run != self.generation || !self.run.running {
            log::trace!("dropping stale wakeup {wakeup:?}");
            return Ok(None);
        }
        match wakeup.kind {
            WakeupKind::Frame => {
                self.tick(clock.now(), sink);
                clock.request_frame(Wakeup::frame(self.generation));
                Ok(None)
            }
            WakeupKind::SegmentElapsed { segment } => {
                if segment != self.run.current_segment_index {
                    log::trace!("dropping wakeup for segment {segment}");
                    return Ok(None);
                }
                self.complete_segment(segment, clock, sink)
            }
        }
    }

    fn begin_segment<E>(&mut self, segment: usize, clock: &mut E)
    where
        E: Clock + Scheduler + ?Sized,
    {
        let stat = self.config.segments[segment];
        let sampled = self.durations.next_duration(segment, &stat);
        let duration = if sampled.is_finite() {
            sampled.max(MIN_SEGMENT_MS)
        } else {
            MIN_SEGMENT_MS
        };

        self.run.current_segment_index = segment;
        self.run.current_segment_start = clock.now();
        self.run.current_segment_duration = duration;
        self.phase = JourneyPhase::Running { segment };
        clock.after(duration, Wakeup::segment_elapsed(self.generation, segment));
        log::debug!(
            "run {} segment {segment} ({}) sampled {duration:.2} ms",
            self.generation,
            self.config.segment_label(segment)
        );
    }

    fn tick<S: PresentationSink + ?Sized>(&mut self, now: f64, sink: &mut S) {
        let total = self.elapsed_ms(now);
        self.cosmetic(sink.set_elapsed_text(&format_seconds(total)));

        let segment = self.run.current_segment_index;
        let duration = self.run.current_segment_duration;
        if segment < self.config.segment_count() && duration > 0.0 {
            let into_segment = (now - self.run.current_segment_start).max(0.0);
            self.cosmetic(sink.set_progress(segment, percent_of(into_segment, duration)));
        }
    }

    fn complete_segment<E, S>(
        &mut self,
        segment: usize,
        clock: &mut E,
        sink: &mut S,
    ) -> Result<Option<ResultsReport>, JourneyError>
    where
        E: Clock + Scheduler + ?Sized,
        S: PresentationSink + ?Sized,
    {
        let recorded = match self.config.timing {
            TimingSource::Generated => self.run.current_segment_duration,
            TimingSource::WallClock => (clock.now() - self.run.current_segment_start).max(0.0),
        };
        debug_assert!(self.run.segment_durations.len() < self.config.segment_count());
        self.run.segment_durations.push(recorded);
        log::debug!(
            "run {} segment {segment} done in {recorded:.2} ms",
            self.generation
        );

        self.cosmetic(sink.set_progress(segment, 100.0));
        self.cosmetic(sink.set_region_state(segment, RegionState::Completed));
        self.cosmetic(sink.set_region_state(segment + 1, RegionState::Active));

        let next = segment + 1;
        if next < self.config.segment_count() {
            self.begin_segment(next, clock);
            return Ok(None);
        }
        self.complete(sink).map(Some)
    }

    fn complete<S: PresentationSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<ResultsReport, JourneyError> {
        self.run.running = false;
        self.phase = JourneyPhase::Completed;
        let total_text = format_seconds(self.run.total_ms());
        let final_region = self.config.segment_count();
        self.cosmetic(sink.set_elapsed_text(&total_text));
        self.cosmetic(sink.set_region_state(final_region, RegionState::Completed));
        self.cosmetic(sink.set_timer_visible(false));

        let presented = self.presenter.present(&self.run, &self.classifier, sink);

        self.phase = JourneyPhase::Idle;
        self.cosmetic(sink.set_start_enabled(true));

        let report = presented?;
        log::debug!(
            "run {} complete: {} rated {} ({})",
            self.generation,
            report.total_text,
            report.total.label,
            self.classifier.name()
        );
        self.last_report = Some(report.clone());
        Ok(report)
    }

    fn reset_sink<S: PresentationSink + ?Sized>(&mut self, sink: &mut S) {
        for region in 0..self.config.region_count() {
            self.cosmetic(sink.set_region_state(region, RegionState::Pending));
        }
        for segment in 0..self.config.segment_count() {
            self.cosmetic(sink.set_progress(segment, 0.0));
        }
        self.cosmetic(sink.set_elapsed_text(&format_seconds(0.0)));
    }

    // Cosmetic updates never abort a run; warn once per element per run.
    fn cosmetic(&mut self, result: Result<(), SinkError>) {
        if let Err(SinkError::MissingElement(element)) = result {
            if self.degraded.insert(element) {
                log::warn!(
                    "run {}: skipping updates to missing element `{element}`",
                    self.generation
                );
            } else {
                log::trace!("run {}: `{element}` still missing", self.generation);
            }
        }
    }
}

/// Drive one run from start to its results using `event_loop`.
///
/// If a run is already in progress the call joins it instead of starting another.
///
/// # Errors
///
/// Returns `JourneyError::Results` when presentation fails and `JourneyError::Stalled`
/// if the event loop runs dry before the run completes.
pub fn run_journey<D, C, E, S>(
    machine: &mut JourneyMachine<D, C>,
    event_loop: &mut E,
    sink: &mut S,
) -> Result<ResultsReport, JourneyError>
where
    D: DurationSource,
    C: Classifier,
    E: EventLoop + ?Sized,
    S: PresentationSink + ?Sized,
{
    if machine.start(event_loop, sink) == StartOutcome::AlreadyRunning {
        log::debug!("joining run {} already in progress", machine.run().run_id());
    }
    let run_id = machine.run().run_id();
    while let Some(wakeup) = event_loop.next_wakeup() {
        if let Some(report) = machine.handle(wakeup, event_loop, sink)? {
            return Ok(report);
        }
    }
    Err(JourneyError::Stalled { run_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ThresholdClassifier;
    use crate::clock::VirtualClock;
    use crate::config::ThresholdConfig;
    use crate::rating::RatingLevel;
    use crate::sampler::ScriptedDurations;
    use crate::sink::MemorySink;

    type TestMachine = JourneyMachine<ScriptedDurations, ThresholdClassifier>;

    fn machine(durations: Vec<f64>, timing: TimingSource) -> TestMachine {
        let config = JourneyConfig::default().with_timing(timing);
        JourneyMachine::new(
            config,
            ScriptedDurations::new(durations),
            ThresholdClassifier::new(ThresholdConfig::default()),
        )
        .unwrap()
    }

    #[test]
    fn start_resets_sink_and_activates_first_region() {
        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::Generated);
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(3);
        sink.progress = vec![100.0; 3];
        sink.results_visible = true;

        assert_eq!(
            m.start(&mut clock, &mut sink),
            StartOutcome::Started { run_id: 1 }
        );
        assert_eq!(m.phase(), JourneyPhase::Running { segment: 0 });
        assert_eq!(sink.regions[0], RegionState::Active);
        assert!(sink.regions[1..].iter().all(|r| *r == RegionState::Pending));
        assert!(sink.progress.iter().all(|p| p.abs() < f64::EPSILON));
        assert_eq!(sink.elapsed_text, "0.000s");
        assert!(!sink.start_enabled);
        assert!(sink.timer_visible);
        assert!(!sink.results_visible);
        assert!((m.run().current_segment_duration() - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn double_start_is_a_no_op() {
        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::Generated);
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(3);
        m.start(&mut clock, &mut sink);
        let wakeup = clock.next_wakeup().unwrap();
        m.handle(wakeup, &mut clock, &mut sink).unwrap();
        let before = m.run().clone();
        let pending = clock.pending();

        assert_eq!(m.start(&mut clock, &mut sink), StartOutcome::AlreadyRunning);
        assert_eq!(m.run(), &before);
        assert_eq!(clock.pending(), pending);
    }

    #[test]
    fn ticks_track_elapsed_time_and_progress() {
        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::Generated);
        let mut clock = VirtualClock::with_frame_interval(100.0);
        let mut sink = MemorySink::new(3);
        m.start(&mut clock, &mut sink);

        for _ in 0..3 {
            let wakeup = clock.next_wakeup().unwrap();
            assert_eq!(wakeup.kind, WakeupKind::Frame);
            m.handle(wakeup, &mut clock, &mut sink).unwrap();
        }
        assert!((clock.now() - 300.0).abs() < f64::EPSILON);
        assert_eq!(sink.elapsed_text, "0.300s");
        assert!((sink.progress[0] - 50.0).abs() < 1e-9);
        assert!((m.elapsed_ms(clock.now()) - 300.0).abs() < 1e-9);
        assert!((m.elapsed_ms(10_000.0) - 600.0).abs() < 1e-9);
    }

    #[test]
    fn segments_advance_in_order_and_record_once() {
        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::Generated);
        let mut clock = VirtualClock::with_frame_interval(50.0);
        let mut sink = MemorySink::new(3);
        m.start(&mut clock, &mut sink);

        let mut lengths = vec![0];
        let mut report = None;
        while let Some(wakeup) = clock.next_wakeup() {
            let before = m.run().segment_durations().len();
            if let Some(done) = m.handle(wakeup, &mut clock, &mut sink).unwrap() {
                report = Some(done);
            }
            let after = m.run().segment_durations().len();
            assert!(after == before || after == before + 1);
            assert!(after <= 3);
            if after != before {
                lengths.push(after);
            }
        }
        assert_eq!(lengths, vec![0, 1, 2, 3]);

        let report = report.unwrap();
        assert_eq!(report.total_text, "4.900s");
        assert_eq!(report.total.level, RatingLevel::Average);
        assert_eq!(m.phase(), JourneyPhase::Idle);
        assert!(sink.regions.iter().all(|r| *r == RegionState::Completed));
        assert!(sink.progress.iter().all(|p| (p - 100.0).abs() < f64::EPSILON));
        assert!(sink.start_enabled);
        assert!(!sink.timer_visible);
        assert!(sink.results_visible);
        assert_eq!(m.last_report(), Some(&report));
    }

    #[test]
    fn completion_passes_through_completed_back_to_idle() {
        assert!(!JourneyPhase::Completed.is_running());
        assert!(JourneyPhase::Running { segment: 2 }.is_running());

        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::Generated);
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(3);
        m.start(&mut clock, &mut sink);
        let mut phases = vec![m.phase()];
        while let Some(wakeup) = clock.next_wakeup() {
            let done = m.handle(wakeup, &mut clock, &mut sink).unwrap();
            if phases.last() != Some(&m.phase()) {
                phases.push(m.phase());
            }
            if done.is_some() {
                break;
            }
        }
        assert_eq!(
            phases,
            vec![
                JourneyPhase::Running { segment: 0 },
                JourneyPhase::Running { segment: 1 },
                JourneyPhase::Running { segment: 2 },
                JourneyPhase::Idle,
            ]
        );
        assert_eq!(
            m.start(&mut clock, &mut sink),
            StartOutcome::Started { run_id: 2 }
        );
    }

    #[test]
    fn region_transitions_follow_the_route() {
        let mut m = machine(vec![300.0, 300.0, 300.0], TimingSource::Generated);
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(3);
        run_journey(&mut m, &mut clock, &mut sink).unwrap();

        let transitions: Vec<_> = sink
            .region_log
            .iter()
            .filter(|(_, state)| *state != RegionState::Pending)
            .copied()
            .collect();
        assert_eq!(
            transitions,
            vec![
                (0, RegionState::Active),
                (0, RegionState::Completed),
                (1, RegionState::Active),
                (1, RegionState::Completed),
                (2, RegionState::Active),
                (2, RegionState::Completed),
                (3, RegionState::Active),
                (3, RegionState::Completed),
            ]
        );
    }

    #[test]
    fn missing_cosmetic_elements_do_not_abort() {
        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::Generated);
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(3)
            .without(SinkElement::Region(2))
            .without(SinkElement::Progress(1))
            .without(SinkElement::ElapsedTime)
            .without(SinkElement::StartControl);
        let report = run_journey(&mut m, &mut clock, &mut sink).unwrap();
        assert_eq!(report.segments.len(), 3);
        assert_eq!(sink.regions[2], RegionState::Pending);
        assert_eq!(sink.elapsed_updates, 0);
        assert!(sink.results_visible);
    }

    #[test]
    fn missing_results_panel_surfaces_error_and_returns_to_idle() {
        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::Generated);
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(3).without(SinkElement::TotalTime);
        let err = run_journey(&mut m, &mut clock, &mut sink).unwrap_err();
        assert!(matches!(
            err,
            JourneyError::Results(SinkError::MissingElement(SinkElement::TotalTime))
        ));
        assert_eq!(m.phase(), JourneyPhase::Idle);
        assert!(sink.start_enabled);
        assert!(m.last_report().is_none());

        sink.restore(SinkElement::TotalTime);
        let report = run_journey(&mut m, &mut clock, &mut sink).unwrap();
        assert_eq!(report.segments.len(), 3);
        assert_eq!(m.run().run_id(), 2);
    }

    #[test]
    fn wall_clock_timing_records_measured_time() {
        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::WallClock);
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(3);
        m.start(&mut clock, &mut sink);

        // The page was suspended: the first segment's wakeup lands late.
        clock.advance(1_000.0);
        let mut report = None;
        while let Some(wakeup) = clock.next_wakeup() {
            if let Some(done) = m.handle(wakeup, &mut clock, &mut sink).unwrap() {
                report = Some(done);
            }
        }
        let report = report.unwrap();
        assert!((report.segments[0].duration_ms - 1_000.0).abs() < 1e-6);
        assert!((report.segments[1].duration_ms - 2_200.0).abs() < 1e-6);
        assert!((report.total_ms - 5_300.0).abs() < 1e-6);
    }

    #[test]
    fn generated_timing_ignores_late_wakeups() {
        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::Generated);
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(3);
        m.start(&mut clock, &mut sink);
        clock.advance(1_000.0);
        let mut report = None;
        while let Some(wakeup) = clock.next_wakeup() {
            if let Some(done) = m.handle(wakeup, &mut clock, &mut sink).unwrap() {
                report = Some(done);
            }
        }
        assert!((report.unwrap().total_ms - 4_900.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stale_wakeups_from_previous_runs_are_ignored() {
        let mut m = machine(vec![600.0, 2_200.0, 2_100.0], TimingSource::Generated);
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(3);
        run_journey(&mut m, &mut clock, &mut sink).unwrap();

        let stale = Wakeup::segment_elapsed(1, 0);
        assert!(m.handle(stale, &mut clock, &mut sink).unwrap().is_none());
        let frame = Wakeup::frame(1);
        assert!(m.handle(frame, &mut clock, &mut sink).unwrap().is_none());
        assert_eq!(m.run().segment_durations().len(), 3);

        let second = run_journey(&mut m, &mut clock, &mut sink).unwrap();
        assert_eq!(m.run().run_id(), 2);
        assert_eq!(second.segments.len(), 3);
    }

    #[test]
    fn invalid_config_fails_before_any_run() {
        let mut config = JourneyConfig::default();
        config.segments[0].std_dev = -5.0;
        let result = JourneyMachine::new(
            config,
            ScriptedDurations::new(Vec::new()),
            ThresholdClassifier::new(ThresholdConfig::default()),
        );
        assert!(matches!(result, Err(ConfigError::NegativeStdDev { .. })));
    }

    #[test]
    fn stalled_loop_is_reported() {
        struct DeadLoop(VirtualClock);
        impl Clock for DeadLoop {
            fn now(&self) -> f64 {
                self.0.now()
            }
        }
        impl Scheduler for DeadLoop {
            fn after(&mut self, _delay_ms: f64, _wakeup: Wakeup) {}
            fn request_frame(&mut self, _wakeup: Wakeup) {}
        }
        impl EventLoop for DeadLoop {
            fn next_wakeup(&mut self) -> Option<Wakeup> {
                None
            }
        }

        let mut m = machine(vec![600.0], TimingSource::Generated);
        let mut sink = MemorySink::new(3);
        let err = run_journey(&mut m, &mut DeadLoop(VirtualClock::new()), &mut sink).unwrap_err();
        assert!(matches!(err, JourneyError::Stalled { run_id: 1 }));
    }
}
