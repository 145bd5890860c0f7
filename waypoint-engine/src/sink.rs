//! Presentation sink: the surface the engine writes progress and results to.
//!
//! The engine never looks up page elements itself. A front end implements
//! [`PresentationSink`] and reports [`SinkError::MissingElement`] when a target it was
//! asked to update does not exist.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::rating::RatingLevel;

/// Visual state of a waypoint region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionState {
    #[default]
    Pending,
    Active,
    Completed,
}

/// Visual weight of a rating block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    /// Headline rating for the whole journey.
    Primary,
    /// Smaller, dimmer per-segment rating.
    Secondary,
}

/// Stars, label and optional percentile description ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBlock {
    pub level: RatingLevel,
    pub stars: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub emphasis: Emphasis,
}

/// Addressable presentation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkElement {
    Region(usize),
    Progress(usize),
    ElapsedTime,
    TimingDisplay,
    ResultsPanel,
    TotalTime,
    TotalRating,
    SegmentTime(usize),
    SegmentRating(usize),
    StartControl,
}

impl fmt::Display for SinkElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region(i) => write!(f, "region {i}"),
            Self::Progress(i) => write!(f, "progress bar {i}"),
            Self::ElapsedTime => write!(f, "elapsed time"),
            Self::TimingDisplay => write!(f, "timing display"),
            Self::ResultsPanel => write!(f, "results panel"),
            Self::TotalTime => write!(f, "total time"),
            Self::TotalRating => write!(f, "total rating"),
            Self::SegmentTime(i) => write!(f, "segment time {i}"),
            Self::SegmentRating(i) => write!(f, "segment rating {i}"),
            Self::StartControl => write!(f, "start control"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("presentation element `{0}` not found")]
    MissingElement(SinkElement),
}

/// Everything the engine needs from a front end.
pub trait PresentationSink {
    /// # Errors
    ///
    /// `SinkError::MissingElement` when the region does not exist.
    fn set_region_state(&mut self, region: usize, state: RegionState) -> Result<(), SinkError>;

    /// Set a segment progress bar to `percent` (0..=100).
    ///
    /// # Errors
    ///
    /// `SinkError::MissingElement` when the progress bar does not exist.
    fn set_progress(&mut self, segment: usize, percent: f64) -> Result<(), SinkError>;

    /// # Errors
    ///
    /// `SinkError::MissingElement` when the elapsed-time text does not exist.
    fn set_elapsed_text(&mut self, text: &str) -> Result<(), SinkError>;

    /// # Errors
    ///
    /// `SinkError::MissingElement` when the timing display does not exist.
    fn set_timer_visible(&mut self, visible: bool) -> Result<(), SinkError>;

    /// # Errors
    ///
    /// `SinkError::MissingElement` when the results panel does not exist.
    fn set_results_visible(&mut self, visible: bool) -> Result<(), SinkError>;

    /// # Errors
    ///
    /// `SinkError::MissingElement` when the start control does not exist.
    fn set_start_enabled(&mut self, enabled: bool) -> Result<(), SinkError>;

    /// # Errors
    ///
    /// `SinkError::MissingElement` when the total-time text does not exist.
    fn set_total_time(&mut self, text: &str) -> Result<(), SinkError>;

    /// # Errors
    ///
    /// `SinkError::MissingElement` when the primary rating block does not exist.
    fn set_total_rating(&mut self, block: &RatingBlock) -> Result<(), SinkError>;

    /// # Errors
    ///
    /// `SinkError::MissingElement` when the segment time text does not exist.
    fn set_segment_time(&mut self, segment: usize, text: &str) -> Result<(), SinkError>;

    /// # Errors
    ///
    /// `SinkError::MissingElement` when the segment rating block does not exist.
    fn set_segment_rating(&mut self, segment: usize, block: &RatingBlock)
    -> Result<(), SinkError>;
}

/// In-memory sink recording every update; elements can be marked missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySink {
    pub regions: Vec<RegionState>,
    pub progress: Vec<f64>,
    pub elapsed_text: String,
    pub elapsed_updates: usize,
    pub timer_visible: bool,
    pub results_visible: bool,
    pub start_enabled: bool,
    pub total_time: Option<String>,
    pub total_rating: Option<RatingBlock>,
    pub segment_times: Vec<Option<String>>,
    pub segment_ratings: Vec<Option<RatingBlock>>,
    pub region_log: Vec<(usize, RegionState)>,
    missing: HashSet<SinkElement>,
}

impl MemorySink {
    /// Sink with every element present for `segments` segments.
    #[must_use]
    pub fn new(segments: usize) -> Self {
        Self {
            regions: vec![RegionState::Pending; segments + 1],
            progress: vec![0.0; segments],
            start_enabled: true,
            segment_times: vec![None; segments],
            segment_ratings: vec![None; segments],
            ..Self::default()
        }
    }

    /// Mark `element` as absent so updates to it fail.
    #[must_use]
    pub fn without(mut self, element: SinkElement) -> Self {
        self.missing.insert(element);
        self
    }

    /// Make a previously missing element available again.
    pub fn restore(&mut self, element: SinkElement) {
        self.missing.remove(&element);
    }

    fn check(&self, element: SinkElement) -> Result<(), SinkError> {
        if self.missing.contains(&element) {
            return Err(SinkError::MissingElement(element));
        }
        Ok(())
    }

    fn slot<T>(slots: &mut [T], index: usize, element: SinkElement) -> Result<&mut T, SinkError> {
        slots
            .get_mut(index)
            .ok_or(SinkError::MissingElement(element))
    }
}

impl PresentationSink for MemorySink {
    fn set_region_state(&mut self, region: usize, state: RegionState) -> Result<(), SinkError> {
        let element = SinkElement::Region(region);
        self.check(element)?;
        *Self::slot(&mut self.regions, region, element)? = state;
        self.region_log.push((region, state));
        Ok(())
    }

    fn set_progress(&mut self, segment: usize, percent: f64) -> Result<(), SinkError> {
        let element = SinkElement::Progress(segment);
        self.check(element)?;
        *Self::slot(&mut self.progress, segment, element)? = percent.clamp(0.0, 100.0);
        Ok(())
    }

    fn set_elapsed_text(&mut self, text: &str) -> Result<(), SinkError> {
        self.check(SinkElement::ElapsedTime)?;
        text.clone_into(&mut self.elapsed_text);
        self.elapsed_updates += 1;
        Ok(())
    }

    fn set_timer_visible(&mut self, visible: bool) -> Result<(), SinkError> {
        self.check(SinkElement::TimingDisplay)?;
        self.timer_visible = visible;
        Ok(())
    }

    fn set_results_visible(&mut self, visible: bool) -> Result<(), SinkError> {
        self.check(SinkElement::ResultsPanel)?;
        self.results_visible = visible;
        Ok(())
    }

    fn set_start_enabled(&mut self, enabled: bool) -> Result<(), SinkError> {
        self.check(SinkElement::StartControl)?;
        self.start_enabled = enabled;
        Ok(())
    }

    fn set_total_time(&mut self, text: &str) -> Result<(), SinkError> {
        self.check(SinkElement::TotalTime)?;
        self.total_time = Some(text.to_string());
        Ok(())
    }

    fn set_total_rating(&mut self, block: &RatingBlock) -> Result<(), SinkError> {
        self.check(SinkElement::TotalRating)?;
        self.total_rating = Some(block.clone());
        Ok(())
    }

    fn set_segment_time(&mut self, segment: usize, text: &str) -> Result<(), SinkError> {
        let element = SinkElement::SegmentTime(segment);
        self.check(element)?;
        *Self::slot(&mut self.segment_times, segment, element)? = Some(text.to_string());
        Ok(())
    }

    fn set_segment_rating(
        &mut self,
        segment: usize,
        block: &RatingBlock,
    ) -> Result<(), SinkError> {
        let element = SinkElement::SegmentRating(segment);
        self.check(element)?;
        *Self::slot(&mut self.segment_ratings, segment, element)? = Some(block.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_updates() {
        let mut sink = MemorySink::new(3);
        assert_eq!(sink.regions.len(), 4);
        sink.set_region_state(0, RegionState::Active).unwrap();
        sink.set_progress(1, 140.0).unwrap();
        sink.set_elapsed_text("1.234s").unwrap();
        assert_eq!(sink.regions[0], RegionState::Active);
        assert!((sink.progress[1] - 100.0).abs() < f64::EPSILON);
        assert_eq!(sink.elapsed_text, "1.234s");
        assert_eq!(sink.elapsed_updates, 1);
        assert_eq!(sink.region_log, vec![(0, RegionState::Active)]);
    }

    #[test]
    fn missing_and_out_of_range_elements_fail() {
        let mut sink = MemorySink::new(3).without(SinkElement::ElapsedTime);
        assert_eq!(
            sink.set_elapsed_text("0.000s"),
            Err(SinkError::MissingElement(SinkElement::ElapsedTime))
        );
        assert_eq!(
            sink.set_region_state(7, RegionState::Active),
            Err(SinkError::MissingElement(SinkElement::Region(7)))
        );
        sink.restore(SinkElement::ElapsedTime);
        sink.set_elapsed_text("0.000s").unwrap();
    }

    #[test]
    fn element_names_are_plain_words() {
        let err = SinkError::MissingElement(SinkElement::SegmentTime(2));
        assert_eq!(err.to_string(), "presentation element `segment time 2` not found");
        assert_eq!(SinkElement::ElapsedTime.to_string(), "elapsed time");
        assert_eq!(SinkElement::TotalTime.to_string(), "total time");
        assert_eq!(SinkElement::Progress(0).to_string(), "progress bar 0");
        assert_eq!(SinkElement::Region(3).to_string(), "region 3");
    }
}
