//! Final results: classify the finished run and write it to the sink.
use serde::{Deserialize, Serialize};

use crate::classifier::{Classification, Classifier};
use crate::config::{Axis, JourneyConfig};
use crate::journey::JourneyRun;
use crate::numbers::format_seconds;
use crate::sink::{Emphasis, PresentationSink, RatingBlock, SinkError};

/// Formatted result for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentReport {
    pub index: usize,
    pub label: String,
    pub duration_ms: f64,
    pub time_text: String,
    pub rating: RatingBlock,
}

/// Everything shown on the results panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsReport {
    pub classifier: String,
    pub total_ms: f64,
    pub total_text: String,
    pub total: RatingBlock,
    pub segments: Vec<SegmentReport>,
}

/// Stateless formatter between the classifier and the sink.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsPresenter {
    segment_labels: Vec<String>,
}

impl ResultsPresenter {
    #[must_use]
    pub const fn new(segment_labels: Vec<String>) -> Self {
        Self { segment_labels }
    }

    #[must_use]
    pub fn from_config(config: &JourneyConfig) -> Self {
        Self::new(
            (0..config.segment_count())
                .map(|segment| config.segment_label(segment))
                .collect(),
        )
    }

    /// Classify the run without touching any sink.
    #[must_use]
    pub fn summarize<C: Classifier + ?Sized>(
        &self,
        run: &JourneyRun,
        classifier: &C,
    ) -> ResultsReport {
        let total_ms = run.total_ms();
        let total = rating_block(
            classifier.classify(Axis::Total, total_ms),
            Emphasis::Primary,
        );
        let segments = run
            .segment_durations()
            .iter()
            .enumerate()
            .map(|(index, &duration_ms)| SegmentReport {
                index,
                label: self
                    .segment_labels
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("Segment {}", index + 1)),
                duration_ms,
                time_text: format_seconds(duration_ms),
                rating: rating_block(
                    classifier.classify(Axis::Segment(index), duration_ms),
                    Emphasis::Secondary,
                ),
            })
            .collect();
        ResultsReport {
            classifier: classifier.name().to_string(),
            total_ms,
            total_text: format_seconds(total_ms),
            total,
            segments,
        }
    }

    /// Classify the run and write the results panel.
    ///
    /// # Errors
    ///
    /// Returns the first `SinkError` hit; a results panel that cannot be fully written
    /// aborts presentation.
    pub fn present<C, S>(
        &self,
        run: &JourneyRun,
        classifier: &C,
        sink: &mut S,
    ) -> Result<ResultsReport, SinkError>
    where
        C: Classifier + ?Sized,
        S: PresentationSink + ?Sized,
    {
        let report = self.summarize(run, classifier);
        write_report(&report, sink).inspect_err(|err| {
            log::error!("results presentation aborted for run {}: {err}", run.run_id());
        })?;
        Ok(report)
    }
}

fn write_report<S: PresentationSink + ?Sized>(
    report: &ResultsReport,
    sink: &mut S,
) -> Result<(), SinkError> {
    sink.set_total_time(&report.total_text)?;
    sink.set_total_rating(&report.total)?;
    for segment in &report.segments {
        sink.set_segment_time(segment.index, &segment.time_text)?;
        sink.set_segment_rating(segment.index, &segment.rating)?;
    }
    sink.set_results_visible(true)
}

fn rating_block(classification: Classification, emphasis: Emphasis) -> RatingBlock {
    let description = match (classification.percentile, classification.population_size) {
        (Some(percentile), Some(size)) => Some(format!(
            "{percentile:.1}% of {size} simulated journeys finished at or under this time"
        )),
        _ => None,
    };
    RatingBlock {
        level: classification.level,
        stars: classification.level.stars(),
        label: classification.level.label().to_string(),
        percentile: classification.percentile,
        description,
        emphasis,
    }
}
