use colored::Colorize;
use std::io::Write;

use waypoint_engine::{
    Emphasis, JourneyConfig, MemorySink, PresentationSink, RatingBlock, RegionState, SinkError,
};

const BAR_WIDTH: usize = 20;
const PERCENT_PER_CELL: f64 = 5.0;

/// Terminal front end: records updates in a [`MemorySink`] and redraws one status line.
pub struct TerminalSink<W: Write> {
    inner: MemorySink,
    waypoints: Vec<String>,
    segment_labels: Vec<String>,
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(config: &JourneyConfig, out: W) -> Self {
        let segments = config.segment_count();
        Self {
            inner: MemorySink::new(segments),
            waypoints: config.waypoints.clone(),
            segment_labels: (0..segments)
                .map(|segment| config.segment_label(segment))
                .collect(),
            out,
        }
    }

    pub const fn state(&self) -> &MemorySink {
        &self.inner
    }

    fn status_line(&self) -> String {
        let mut line = String::new();
        for (index, name) in self.waypoints.iter().enumerate() {
            let marker = match self.inner.regions.get(index).copied().unwrap_or_default() {
                RegionState::Pending => format!("○ {name}").dimmed(),
                RegionState::Active => format!("◉ {name}").bright_yellow().bold(),
                RegionState::Completed => format!("● {name}").green(),
            };
            line.push_str(&marker.to_string());
            if let Some(&percent) = self.inner.progress.get(index) {
                line.push_str(&format!(" [{}] ", progress_bar(percent)));
            }
        }
        format!("{line}  {}", self.inner.elapsed_text.bold())
    }

    fn redraw(&mut self) {
        if !self.inner.timer_visible {
            return;
        }
        let line = self.status_line();
        if let Err(err) = write!(self.out, "\r\x1b[2K{line}").and_then(|()| self.out.flush()) {
            log::debug!("terminal redraw failed: {err}");
        }
    }

    fn print_results(&mut self) -> Result<(), std::io::Error> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "🏁 Journey complete".bright_cyan().bold())?;
        if let (Some(total), Some(rating)) = (&self.inner.total_time, &self.inner.total_rating) {
            writeln!(self.out, "   Total {}  {}", total.bold(), rating_text(rating))?;
        }
        for ((label, time), rating) in self
            .segment_labels
            .iter()
            .zip(&self.inner.segment_times)
            .zip(&self.inner.segment_ratings)
        {
            if let (Some(time), Some(rating)) = (time, rating) {
                writeln!(self.out, "   {label:<20} {time}  {}", rating_text(rating))?;
            }
        }
        self.out.flush()
    }
}

fn progress_bar(percent: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = (percent.clamp(0.0, 100.0) / PERCENT_PER_CELL).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "·".repeat(BAR_WIDTH - filled))
}

fn rating_text(block: &RatingBlock) -> String {
    let mut text = format!("{} {}", block.stars, block.label);
    if let Some(description) = &block.description {
        text.push_str(&format!(" ({description})"));
    }
    match block.emphasis {
        Emphasis::Primary => text.bold().to_string(),
        Emphasis::Secondary => text.dimmed().to_string(),
    }
}

impl<W: Write> PresentationSink for TerminalSink<W> {
    fn set_region_state(&mut self, region: usize, state: RegionState) -> Result<(), SinkError> {
        self.inner.set_region_state(region, state)?;
        self.redraw();
        Ok(())
    }

    fn set_progress(&mut self, segment: usize, percent: f64) -> Result<(), SinkError> {
        self.inner.set_progress(segment, percent)
    }

    fn set_elapsed_text(&mut self, text: &str) -> Result<(), SinkError> {
        self.inner.set_elapsed_text(text)?;
        self.redraw();
        Ok(())
    }

    fn set_timer_visible(&mut self, visible: bool) -> Result<(), SinkError> {
        self.inner.set_timer_visible(visible)
    }

    fn set_results_visible(&mut self, visible: bool) -> Result<(), SinkError> {
        self.inner.set_results_visible(visible)?;
        if visible && let Err(err) = self.print_results() {
            log::warn!("could not print results: {err}");
        }
        Ok(())
    }

    fn set_start_enabled(&mut self, enabled: bool) -> Result<(), SinkError> {
        self.inner.set_start_enabled(enabled)
    }

    fn set_total_time(&mut self, text: &str) -> Result<(), SinkError> {
        self.inner.set_total_time(text)
    }

    fn set_total_rating(&mut self, block: &RatingBlock) -> Result<(), SinkError> {
        self.inner.set_total_rating(block)
    }

    fn set_segment_time(&mut self, segment: usize, text: &str) -> Result<(), SinkError> {
        self.inner.set_segment_time(segment, text)
    }

    fn set_segment_rating(
        &mut self,
        segment: usize,
        block: &RatingBlock,
    ) -> Result<(), SinkError> {
        self.inner.set_segment_rating(segment, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_engine::{
        JourneyConfig, JourneyMachine, ScriptedDurations, ThresholdClassifier, ThresholdConfig,
        VirtualClock, run_journey,
    };

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0), "·".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(100.0), "█".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(250.0), "█".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(50.0).chars().filter(|&c| c == '█').count(), 10);
    }

    #[test]
    fn journey_renders_status_and_results() {
        let config = JourneyConfig::default();
        let mut machine = JourneyMachine::new(
            config.clone(),
            ScriptedDurations::new(vec![300.0, 300.0, 300.0]),
            ThresholdClassifier::new(ThresholdConfig::default()),
        )
        .unwrap();
        let mut buf = Vec::new();
        let mut sink = TerminalSink::new(&config, &mut buf);
        let report = run_journey(&mut machine, &mut VirtualClock::new(), &mut sink).unwrap();
        assert!(sink.state().results_visible);
        drop(sink);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Journey complete"));
        assert!(text.contains(&report.total_text));
        assert!(text.contains("London → Tokyo"));
        assert!(text.contains("0.300s"));
    }

    #[test]
    fn results_use_configured_segment_labels() {
        let config = JourneyConfig::from_json(
            r#"{
                "segments": [{"mean": 300.0, "std_dev": 0.0}, {"mean": 700.0, "std_dev": 0.0}],
                "waypoints": ["Here", "Midway", "There"],
                "thresholds": {
                    "total": [0.5, 0.8, 1.1, 1.5],
                    "segments": [[0.1, 0.2, 0.3, 0.4], [0.7, 0.8, 0.9, 1.0]]
                }
            }"#,
        )
        .unwrap();
        let mut machine = JourneyMachine::new(
            config.clone(),
            ScriptedDurations::new(Vec::new()),
            ThresholdClassifier::new(config.thresholds.clone()),
        )
        .unwrap();
        let mut buf = Vec::new();
        let mut sink = TerminalSink::new(&config, &mut buf);
        run_journey(&mut machine, &mut VirtualClock::new(), &mut sink).unwrap();
        assert_eq!(sink.segment_labels, [config.segment_label(0), config.segment_label(1)]);
        drop(sink);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Here → Midway"));
        assert!(text.contains("Midway → There"));
    }
}
