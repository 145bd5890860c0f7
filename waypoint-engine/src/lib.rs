//! Waypoint Engine
//!
//! Platform-agnostic core of the waypoint journey simulator: a travel animation across
//! a fixed route whose segment durations are drawn from per-segment normal
//! distributions, then rated against threshold tables or a synthetic reference
//! population. Front ends supply a clock, a scheduler and a presentation sink.

pub mod classifier;
pub mod clock;
pub mod config;
pub mod constants;
pub mod journey;
pub mod numbers;
pub mod population;
pub mod presenter;
pub mod rating;
pub mod rng;
pub mod sampler;
pub mod sink;

// Re-export commonly used types
pub use classifier::{
    Classification, Classifier, PercentileClassifier, ThresholdClassifier, calculate_percentile,
    classify_by_percentile, classify_by_threshold, rating_for_percentile,
};
pub use clock::{Clock, EventLoop, Scheduler, TaskQueue, VirtualClock, Wakeup, WakeupKind};
pub use config::{
    Axis, ClassifierKind, ConfigError, JourneyConfig, SegmentStat, ThresholdConfig,
    ThresholdTable, TimingSource,
};
pub use journey::{
    JourneyError, JourneyMachine, JourneyPhase, JourneyRun, JourneySession, SessionDurations,
    StartOutcome, run_journey,
};
pub use numbers::format_seconds;
pub use population::{PopulationSet, ReferencePopulation};
pub use presenter::{ResultsPresenter, ResultsReport, SegmentReport};
pub use rating::RatingLevel;
pub use rng::{CountingRng, RngStreams};
pub use sampler::{DurationSampler, DurationSource, ScriptedDurations, box_muller};
pub use sink::{
    Emphasis, MemorySink, PresentationSink, RatingBlock, RegionState, SinkElement, SinkError,
};
