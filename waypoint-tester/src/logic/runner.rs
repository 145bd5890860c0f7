use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use waypoint_engine::constants::MIN_SEGMENT_MS;
use waypoint_engine::{
    JourneyConfig, JourneySession, MemorySink, RatingLevel, ResultsReport, ScriptedDurations,
    VirtualClock,
};

/// One journey executed by the batch runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub iteration: usize,
    pub run_seed: u64,
    pub rng_draws: u64,
    pub report: ResultsReport,
    pub failures: Vec<String>,
}

impl RunRecord {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Aggregated outcome for one base seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResult {
    pub seed: u64,
    pub classifier: String,
    pub passed: bool,
    pub runs: usize,
    pub successful_runs: usize,
    pub failures: Vec<String>,
    pub mean_total_ms: f64,
    pub min_total_ms: f64,
    pub max_total_ms: f64,
    pub mean_segment_ms: Vec<f64>,
    pub total_ratings: BTreeMap<RatingLevel, usize>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    pub records: Vec<RunRecord>,
}

/// Runs batches of headless journeys on a virtual clock.
pub struct JourneyTester {
    config: JourneyConfig,
    durations: Option<Vec<f64>>,
    verbose: bool,
    progress_to_stderr: bool,
}

impl JourneyTester {
    #[must_use]
    pub const fn new(config: JourneyConfig, durations: Option<Vec<f64>>, verbose: bool) -> Self {
        Self {
            config,
            durations,
            verbose,
            progress_to_stderr: false,
        }
    }

    /// Send verbose progress to stderr so stdout carries only the report.
    #[must_use]
    pub const fn with_progress_to_stderr(mut self, enabled: bool) -> Self {
        self.progress_to_stderr = enabled;
        self
    }

    fn progress(&self, line: fmt::Arguments<'_>) {
        if self.progress_to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    pub fn run_seeds(&self, seeds: &[u64], runs: usize) -> Vec<SeedResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    self.progress(format_args!(
                        "🧪 Running {} journeys (classifier: {}, timing: {}, seed: {})",
                        runs.to_string().bright_white(),
                        self.config.classifier.label(),
                        self.config.timing.label(),
                        seed
                    ));
                }
                self.run_seed(seed, runs)
            })
            .collect()
    }

    fn run_seed(&self, seed: u64, runs: usize) -> SeedResult {
        let mut records = Vec::with_capacity(runs);
        let mut failures = Vec::new();
        let mut timings = Vec::with_capacity(runs);

        for i in 0..runs {
            let started = Instant::now();
            let run_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            match self.run_once(i, run_seed) {
                Ok(record) => {
                    timings.push(started.elapsed());
                    for failure in &record.failures {
                        failures.push(format!("Run {} (seed {run_seed}): {failure}", i + 1));
                    }
                    if self.verbose {
                        self.log_record(&record, runs);
                    }
                    records.push(record);
                }
                Err(err) => {
                    failures.push(format!("Run {} (seed {run_seed}): {err}", i + 1));
                    if self.verbose {
                        self.progress(format_args!(
                            "  ❌ Run {}/{runs} aborted: {}",
                            i + 1,
                            err.red()
                        ));
                    }
                }
            }
        }

        let average_duration = if timings.is_empty() {
            Duration::ZERO
        } else {
            timings.iter().sum::<Duration>() / u32::try_from(timings.len()).unwrap_or(1)
        };
        let successful_runs = records.iter().filter(|r| r.passed()).count();

        SeedResult {
            seed,
            classifier: self.config.classifier.label().to_string(),
            passed: failures.is_empty(),
            runs,
            successful_runs,
            failures,
            mean_total_ms: mean(records.iter().map(|r| r.report.total_ms)),
            min_total_ms: records
                .iter()
                .map(|r| r.report.total_ms)
                .reduce(f64::min)
                .unwrap_or(0.0),
            max_total_ms: records
                .iter()
                .map(|r| r.report.total_ms)
                .reduce(f64::max)
                .unwrap_or(0.0),
            mean_segment_ms: (0..self.config.segment_count())
                .map(|segment| {
                    mean(
                        records
                            .iter()
                            .filter_map(|r| r.report.segments.get(segment))
                            .map(|s| s.duration_ms),
                    )
                })
                .collect(),
            total_ratings: count_ratings(&records),
            average_duration,
            records,
        }
    }

    fn run_once(&self, iteration: usize, run_seed: u64) -> Result<RunRecord, String> {
        let mut session = match &self.durations {
            Some(script) => JourneySession::with_durations(
                self.config.clone(),
                run_seed,
                ScriptedDurations::new(script.clone()),
            ),
            None => JourneySession::new(self.config.clone(), run_seed),
        }
        .map_err(|err| err.to_string())?;

        let segments = self.config.segment_count();
        let mut clock = VirtualClock::new();
        let mut sink = MemorySink::new(segments);
        let report = session
            .run(&mut clock, &mut sink)
            .map_err(|err| err.to_string())?;

        let mut failures = check_run(&session, &report, &sink);
        failures.extend(check_presentation(&session, &report));

        Ok(RunRecord {
            iteration,
            run_seed,
            rng_draws: session.rng_draws(),
            report,
            failures,
        })
    }

    fn log_record(&self, record: &RunRecord, runs: usize) {
        let status = if record.passed() { "✅" } else { "❌" };
        let segments = record
            .report
            .segments
            .iter()
            .map(|s| s.time_text.as_str())
            .collect::<Vec<_>>()
            .join(" + ");
        self.progress(format_args!(
            "  {status} Run {}/{runs} {} = {} {} ({} draws)",
            record.iteration + 1,
            segments,
            record.report.total_text.bold(),
            record.report.total.level,
            record.rng_draws
        ));
        for failure in &record.failures {
            self.progress(format_args!("     • {}", failure.red()));
        }
    }
}

/// Invariants every completed run must satisfy.
fn check_run(session: &JourneySession, report: &ResultsReport, sink: &MemorySink) -> Vec<String> {
    let machine = session.machine();
    let expected = machine.config().segment_count();
    let recorded = machine.run().segment_durations();
    let mut failures = Vec::new();

    if recorded.len() != expected {
        failures.push(format!(
            "recorded {} segments, expected {expected}",
            recorded.len()
        ));
    }
    if report.segments.len() != expected {
        failures.push(format!(
            "report lists {} segments, expected {expected}",
            report.segments.len()
        ));
    }
    for (segment, &duration) in recorded.iter().enumerate() {
        if duration.is_nan() || duration < MIN_SEGMENT_MS {
            failures.push(format!(
                "segment {segment} lasted {duration:.3} ms, below the {MIN_SEGMENT_MS} ms floor"
            ));
        }
    }
    let sum: f64 = recorded.iter().sum();
    if (report.total_ms - sum).abs() > 1e-6 * sum.abs().max(1.0) {
        failures.push(format!(
            "total {:.3} ms differs from segment sum {sum:.3} ms",
            report.total_ms
        ));
    }
    if sink.total_time.as_deref() != Some(report.total_text.as_str()) {
        failures.push("results panel shows a different total".to_string());
    }
    if !sink.results_visible || !sink.start_enabled || sink.timer_visible {
        failures.push("presentation did not settle into the results view".to_string());
    }
    failures
}

/// Presenting the finished run again must give identical output.
fn check_presentation(session: &JourneySession, report: &ResultsReport) -> Vec<String> {
    let machine = session.machine();
    let segments = machine.config().segment_count();
    let mut first = MemorySink::new(segments);
    let mut second = MemorySink::new(segments);
    let presenter = machine.presenter();

    let outcome = presenter
        .present(machine.run(), machine.classifier(), &mut first)
        .and_then(|a| {
            presenter
                .present(machine.run(), machine.classifier(), &mut second)
                .map(|b| (a, b))
        });
    match outcome {
        Ok((a, b)) if a == b && first == second && &a == report => Vec::new(),
        Ok(_) => vec!["presenting the same run twice gave different output".to_string()],
        Err(err) => vec![format!("re-presenting failed: {err}")],
    }
}

fn count_ratings(records: &[RunRecord]) -> BTreeMap<RatingLevel, usize> {
    let mut counts: BTreeMap<RatingLevel, usize> =
        RatingLevel::ALL.iter().map(|&level| (level, 0)).collect();
    for record in records {
        *counts.entry(record.report.total.level).or_default() += 1;
    }
    counts
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_engine::{ClassifierKind, TimingSource};

    #[test]
    fn scripted_batch_passes_and_aggregates() {
        let tester = JourneyTester::new(
            JourneyConfig::default(),
            Some(vec![600.0, 2_200.0, 2_100.0]),
            false,
        );
        let results = tester.run_seeds(&[1, 2], 3);
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert_eq!(result.successful_runs, 3);
            assert_eq!(result.records.len(), 3);
            assert!((result.mean_total_ms - 4_900.0).abs() < 1e-9);
            assert!((result.min_total_ms - result.max_total_ms).abs() < f64::EPSILON);
            assert_eq!(result.total_ratings[&RatingLevel::Average], 3);
            assert_eq!(result.total_ratings[&RatingLevel::Fast], 0);
            assert_eq!(result.mean_segment_ms.len(), 3);
            assert_eq!(result.classifier, "threshold");
        }
    }

    #[test]
    fn sampled_batch_uses_distinct_run_seeds() {
        let config = JourneyConfig::default().with_timing(TimingSource::WallClock);
        let tester = JourneyTester::new(config, None, false);
        let result = &tester.run_seeds(&[1337], 4)[0];
        assert!(result.passed, "{:?}", result.failures);
        let seeds: Vec<_> = result.records.iter().map(|r| r.run_seed).collect();
        assert_eq!(seeds, vec![1337, 1338, 1339, 1340]);
        assert!(result.records.iter().all(|r| r.rng_draws == 6));
        assert_eq!(result.total_ratings.values().sum::<usize>(), 4);
    }

    #[test]
    fn percentile_batch_reports_population_draws() {
        let config = JourneyConfig::default()
            .with_classifier(ClassifierKind::Percentile)
            .with_population_size(50);
        let tester = JourneyTester::new(config, None, false);
        let result = &tester.run_seeds(&[9], 2)[0];
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.classifier, "percentile");
        // 50 per segment plus 50 three-segment totals, two draws per sample, plus the run.
        assert!(result.records.iter().all(|r| r.rng_draws == 2 * 300 + 6));
        assert!(result.records[0].report.total.percentile.is_some());
    }

    #[test]
    fn zero_runs_yields_empty_result() {
        let tester = JourneyTester::new(JourneyConfig::default(), None, false);
        let result = &tester.run_seeds(&[5], 0)[0];
        assert!(result.passed);
        assert!(result.records.is_empty());
        assert!(result.mean_total_ms.abs() < f64::EPSILON);
        assert_eq!(result.average_duration, Duration::ZERO);
    }

    #[test]
    fn seed_result_serializes_rating_keys() {
        let tester = JourneyTester::new(
            JourneyConfig::default(),
            Some(vec![600.0, 2_200.0, 2_100.0]),
            false,
        );
        let result = &tester.run_seeds(&[1], 1)[0];
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value["total_ratings"]["average"], 1);
        assert_eq!(value["records"][0]["report"]["total_text"], "4.900s");
    }
}
