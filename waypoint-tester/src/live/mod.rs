//! Live mode: one animated journey per seed, in real time.
pub mod clock;
pub mod terminal;

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;

use waypoint_engine::{JourneyConfig, JourneySession, ResultsReport, ScriptedDurations};

pub use clock::RealtimeClock;
pub use terminal::TerminalSink;

/// Animate one journey per seed on `out` and return each report.
pub fn run_live<W: Write + ?Sized>(
    config: &JourneyConfig,
    seeds: &[u64],
    durations: Option<&[f64]>,
    out: &mut W,
) -> Result<Vec<ResultsReport>> {
    writeln!(out, "{}", "🚀 Live journeys".bright_blue().bold())?;
    writeln!(out, "{}", "-".repeat(30).blue())?;

    let mut reports = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        let mut session = match durations {
            Some(script) => JourneySession::with_durations(
                config.clone(),
                seed,
                ScriptedDurations::new(script.to_vec()),
            ),
            None => JourneySession::new(config.clone(), seed),
        }
        .context("invalid journey configuration")?;

        writeln!(out, "Seed {}", seed.to_string().bold())?;
        let mut sink = TerminalSink::new(config, &mut *out);
        let report = session
            .run(&mut RealtimeClock::new(), &mut sink)
            .with_context(|| format!("live journey for seed {seed} failed"))?;
        log::debug!(
            "seed {seed}: {} timer redraws",
            sink.state().elapsed_updates
        );
        drop(sink);
        writeln!(out)?;
        reports.push(report);
    }
    out.flush()?;
    Ok(reports)
}
