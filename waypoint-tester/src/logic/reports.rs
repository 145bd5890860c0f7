use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use waypoint_engine::{RatingLevel, format_seconds};

use super::SeedResult;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    results: &'a [SeedResult],
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[SeedResult],
    total_duration: Duration,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Journey Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==========================".cyan())?;
    writeln!(out, "Generated: {}", generated_at.to_rfc3339())?;

    let total_seeds = results.len();
    let passed_seeds = results.iter().filter(|r| r.passed).count();
    let failed_seeds = total_seeds - passed_seeds;
    let total_runs: usize = results.iter().map(|r| r.runs).sum();

    writeln!(out, "Seeds: {total_seeds}")?;
    writeln!(out, "Journeys: {total_runs}")?;
    writeln!(out, "Passed: {}", passed_seeds.to_string().green())?;
    writeln!(out, "Failed: {}", failed_seeds.to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} seed {} ({})",
            status,
            result.seed.to_string().bold(),
            result.classifier
        )?;
        writeln!(
            out,
            "   Journeys: {}/{} clean",
            result.successful_runs, result.runs
        )?;
        writeln!(
            out,
            "   Total: mean {} (min {}, max {})",
            format_seconds(result.mean_total_ms),
            format_seconds(result.min_total_ms),
            format_seconds(result.max_total_ms)
        )?;
        let segments = result
            .mean_segment_ms
            .iter()
            .map(|&ms| format_seconds(ms))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "   Segment means: {segments}")?;
        writeln!(out, "   Average run time: {:?}", result.average_duration)?;
        for level in RatingLevel::ALL {
            let count = result.total_ratings.get(&level).copied().unwrap_or(0);
            if count > 0 {
                writeln!(out, "   {:<28} {count}", level.to_string())?;
            }
        }

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[SeedResult],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let report = JsonReport {
        generated_at: generated_at.to_rfc3339(),
        results,
    };
    let json_output = serde_json::to_string_pretty(&report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[SeedResult],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    writeln!(out, "# Waypoint Journey Results\n")?;
    writeln!(out, "_Generated {}_\n", generated_at.to_rfc3339())?;

    let total_seeds = results.len();
    let passed_seeds = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Seeds**: {total_seeds}")?;
    writeln!(out, "- **Passed**: {passed_seeds}")?;
    writeln!(out, "- **Failed**: {}\n", total_seeds - passed_seeds)?;

    writeln!(out, "## Ratings\n")?;
    let header = RatingLevel::ALL
        .iter()
        .map(|level| level.label())
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(out, "| Seed | Classifier | Mean total | {header} |")?;
    writeln!(out, "|---|---|---|{}", "---|".repeat(RatingLevel::ALL.len()))?;
    for result in results {
        let counts = RatingLevel::ALL
            .iter()
            .map(|level| {
                result
                    .total_ratings
                    .get(level)
                    .copied()
                    .unwrap_or(0)
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(
            out,
            "| {} | {} | {} | {counts} |",
            result.seed,
            result.classifier,
            format_seconds(result.mean_total_ms)
        )?;
    }
    writeln!(out)?;

    let failing: Vec<_> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out, "## Failures\n")?;
        for result in failing {
            writeln!(out, "### ❌ Seed {}\n", result.seed)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
