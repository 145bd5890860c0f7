mod common;
mod live;
mod logic;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stderr, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use common::{parse_durations, parse_seeds};
use logic::{JourneyTester, SeedResult};
use waypoint_engine::{ClassifierKind, JourneyConfig, TimingSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClassifierArg {
    /// Fixed per-axis threshold tables
    Threshold,
    /// Percentile rank against sampled reference populations
    Percentile,
}

impl From<ClassifierArg> for ClassifierKind {
    fn from(value: ClassifierArg) -> Self {
        match value {
            ClassifierArg::Threshold => Self::Threshold,
            ClassifierArg::Percentile => Self::Percentile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimingArg {
    /// Record the sampled duration for each segment
    Generated,
    /// Record measured time between segment start and completion
    WallClock,
}

impl From<TimingArg> for TimingSource {
    fn from(value: TimingArg) -> Self {
        match value {
            TimingArg::Generated => Self::Generated,
            TimingArg::WallClock => Self::WallClock,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "waypoint-tester", version = "0.1.0")]
#[command(about = "Batch and live runner for Waypoint journeys with rating reports")]
struct Args {
    /// Journeys to run per seed
    #[arg(long, default_value_t = 10)]
    runs: usize,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Classification strategy (overrides the config file)
    #[arg(long, value_enum)]
    classifier: Option<ClassifierArg>,

    /// Ground truth recorded per segment (overrides the config file)
    #[arg(long, value_enum)]
    timing: Option<TimingArg>,

    /// Samples per reference population (overrides the config file)
    #[arg(long)]
    population_size: Option<usize>,

    /// JSON journey configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay these segment durations in milliseconds instead of sampling (comma-separated)
    #[arg(long)]
    durations: Option<String>,

    /// Animate one live journey per seed in the terminal before the batch
    #[arg(long)]
    realtime: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json", "markdown"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if shows_banner(&args) {
        announce_banner();
    }

    let start_time = Instant::now();
    let config = load_config(&args)?;
    let seeds = parse_seeds(&args.seeds)?;
    let durations = args.durations.as_deref().map(parse_durations).transpose()?;

    let stdout_is_report = stdout_carries_report(&args);
    if args.realtime {
        if stdout_is_report {
            live::run_live(&config, &seeds, durations.as_deref(), &mut stderr().lock())?;
        } else {
            live::run_live(&config, &seeds, durations.as_deref(), &mut stdout().lock())?;
        }
    }

    let tester = JourneyTester::new(config, durations, args.verbose)
        .with_progress_to_stderr(stdout_is_report);
    let results = tester.run_seeds(&seeds, args.runs);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

/// A JSON or Markdown report printed to stdout must be the only thing on stdout.
fn stdout_carries_report(args: &Args) -> bool {
    args.output.is_none() && args.report != "console"
}

fn shows_banner(args: &Args) -> bool {
    !stdout_carries_report(args)
}

fn announce_banner() {
    println!("{}", "🧭 Waypoint Journey Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn load_config(args: &Args) -> Result<JourneyConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => JourneyConfig::default(),
    };
    if let Some(classifier) = args.classifier {
        config.classifier = classifier.into();
    }
    if let Some(timing) = args.timing {
        config.timing = timing.into();
    }
    if let Some(size) = args.population_size {
        config.population_size = size;
    }
    config
        .validate()
        .context("invalid journey configuration")?;
    log::debug!(
        "journey config: {} segments, classifier {}, timing {}",
        config.segment_count(),
        config.classifier.label(),
        config.timing.label()
    );
    Ok(config)
}

fn read_config(path: &Path) -> Result<JourneyConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    JourneyConfig::from_json(&text).with_context(|| format!("failed to load {}", path.display()))
}

fn write_reports(args: &Args, results: &[SeedResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let generated_at = Utc::now();

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results, generated_at)?,
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, results, generated_at)?;
        }
        _ => {
            logic::reports::generate_console_report(
                &mut output_target,
                results,
                start_time.elapsed(),
                generated_at,
            )?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
