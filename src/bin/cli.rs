//! territory-cli - Debug tool for territory capture
//!
//! Usage:
//!   territory-cli replay <file.gpx> [--config <file.json>] [--interval-ms <ms>]
//!   territory-cli simulate [--shape <shape>] [--size <m>] [--noise <m>] [--seed <n>]
//!   territory-cli advise --state <state> [--battery <percent>]
//!
//! Feeds a GPS trail through the capture orchestrator and prints the
//! captured territories as JSON, with verbose logging of every decision.

use clap::{Parser, Subcommand, ValueEnum};
use gpx::{Gpx, read};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use territory_capture::{
    ActivityState, CaptureConfig, CaptureError, CaptureEvent, CaptureOrchestrator, GeoPoint,
    GpsFix, IngestOutcome, ManualClock, Result, Territory,
    capture::{AUTO_FINALIZE_DELAY_MS, LoggingObserver},
    recommend_tracking,
    synthetic::{LoopScenario, LoopShape},
};

/// Accuracy assumed for GPX points without HDOP, in meters.
const DEFAULT_GPX_ACCURACY: f64 = 5.0;

/// Meters of horizontal error per unit of HDOP.
const HDOP_TO_METERS: f64 = 5.0;

#[derive(Parser)]
#[command(name = "territory-cli")]
#[command(about = "Debug tool for GPS territory capture", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a GPX track through the capture pipeline
    Replay {
        /// GPX file containing the track
        file: PathBuf,

        /// JSON capture configuration (camelCase keys, all optional)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Time between consecutive track points
        #[arg(long, default_value = "2000")]
        interval_ms: i64,

        /// Run fixes through the signal conditioner first
        #[arg(long)]
        condition: bool,
    },

    /// Walk a synthetic loop through the capture pipeline
    Simulate {
        #[arg(long, value_enum, default_value = "rectangle")]
        shape: ShapeArg,

        /// Width (and height) of the shape in meters
        #[arg(long, default_value = "100")]
        size: f64,

        /// GPS noise standard deviation in meters
        #[arg(long, default_value = "0")]
        noise: f64,

        #[arg(long, default_value = "42")]
        seed: u64,

        /// JSON capture configuration (camelCase keys, all optional)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the recommended tracking settings
    Advise {
        #[arg(long, value_enum)]
        state: StateArg,

        /// Battery level, 0-100
        #[arg(long, default_value = "100")]
        battery: u8,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Rectangle,
    Circle,
    FigureEight,
}

#[derive(Clone, Copy, ValueEnum)]
enum StateArg {
    Capturing,
    Idle,
    Background,
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay {
            file,
            config,
            interval_ms,
            condition,
        } => run_replay(&file, config.as_deref(), interval_ms, condition, cli.verbose),
        Commands::Simulate {
            shape,
            size,
            noise,
            seed,
            config,
        } => run_simulate(shape, size, noise, seed, config.as_deref(), cli.verbose),
        Commands::Advise { state, battery } => run_advise(state, battery),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load a capture configuration, or the defaults when no file is given
fn load_config(path: Option<&Path>) -> Result<CaptureConfig> {
    let Some(path) = path else {
        return Ok(CaptureConfig::default());
    };
    let reader = BufReader::new(File::open(path)?);
    let config: CaptureConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

/// Read track points from a GPX file as fixes spaced `interval_ms` apart
fn load_gpx_fixes(path: &Path, interval_ms: i64) -> Result<Vec<GpsFix>> {
    let reader = BufReader::new(File::open(path)?);
    let gpx: Gpx = read(reader).map_err(|e| CaptureError::Gpx(e.to_string()))?;

    let fixes: Vec<GpsFix> = gpx
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .flat_map(|segment| &segment.points)
        .enumerate()
        .map(|(i, pt)| {
            let position = pt.point();
            let accuracy = pt.hdop.map_or(DEFAULT_GPX_ACCURACY, |h| h * HDOP_TO_METERS);
            GpsFix::new(position.y(), position.x(), accuracy, i as i64 * interval_ms)
        })
        .collect();

    if fixes.is_empty() {
        return Err(CaptureError::Gpx("No track points found".to_string()));
    }
    Ok(fixes)
}

fn run_replay(
    file: &Path,
    config: Option<&Path>,
    interval_ms: i64,
    condition: bool,
    verbose: bool,
) -> Result<()> {
    println!("\n{}", "=".repeat(60));
    println!("Replaying: {}", file.display());
    println!("{}", "=".repeat(60));

    let config = load_config(config)?;
    let fixes = load_gpx_fixes(file, interval_ms)?;
    println!("  Loaded {} track points", fixes.len());

    let territories = drive(&fixes, config, condition, verbose)?;
    print_territories(&territories)
}

fn run_simulate(
    shape: ShapeArg,
    size: f64,
    noise: f64,
    seed: u64,
    config: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let shape = match shape {
        ShapeArg::Rectangle => LoopShape::Rectangle {
            width_meters: size,
            height_meters: size,
        },
        ShapeArg::Circle => LoopShape::Circle {
            radius_meters: size / 2.0,
        },
        ShapeArg::FigureEight => LoopShape::FigureEight { width_meters: size },
    };

    let scenario =
        LoopScenario::new(GeoPoint::new(21.1458, 79.0882), shape).with_noise(noise, seed);
    let fixes = scenario.generate();

    println!("\n{}", "=".repeat(60));
    println!("Simulating {:?} ({} fixes)", scenario.shape, fixes.len());
    println!("{}", "=".repeat(60));

    let config = load_config(config)?;
    let territories = drive(&fixes, config, false, verbose)?;
    print_territories(&territories)
}

fn run_advise(state: StateArg, battery: u8) -> Result<()> {
    let activity = match state {
        StateArg::Capturing => ActivityState::Capturing,
        StateArg::Idle => ActivityState::Idle,
        StateArg::Background => ActivityState::Background,
    };
    let profile = recommend_tracking(activity, battery);
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

/// Feed fixes through an orchestrator on a manual clock.
///
/// A capture starts at the first fix and again at the first fix after each
/// capture ends. A capture still open when the fixes run out is completed.
fn drive(
    fixes: &[GpsFix],
    config: CaptureConfig,
    condition: bool,
    verbose: bool,
) -> Result<Vec<Territory>> {
    let clock = ManualClock::new(0);
    let mut orchestrator = CaptureOrchestrator::with_clock(config, Box::new(clock.clone()))?;

    let (tx, rx) = mpsc::channel();
    orchestrator.subscribe(Box::new(tx));
    if verbose {
        orchestrator.subscribe(Box::new(LoggingObserver));
    }

    for fix in fixes {
        clock.set(fix.timestamp);
        orchestrator.poll();

        if !orchestrator.is_capturing() {
            let status = orchestrator.start_capture(fix);
            if verbose {
                println!("  start @ {}ms: {}", fix.timestamp, status);
            }
            continue;
        }

        if condition {
            match orchestrator.ingest(fix) {
                IngestOutcome::Rejected(reason) if verbose => {
                    println!("  drop @ {}ms: {}", fix.timestamp, reason)
                }
                IngestOutcome::Point(result) if verbose && !result.added => {
                    println!("  skip @ {}ms: {}", fix.timestamp, result.reason)
                }
                _ => {}
            }
        } else {
            let result = orchestrator.add_point(fix);
            if verbose && !result.added {
                println!("  skip @ {}ms: {}", fix.timestamp, result.reason);
            }
        }
    }

    clock.advance(AUTO_FINALIZE_DELAY_MS);
    orchestrator.poll();
    if orchestrator.is_capturing() {
        orchestrator.complete_capture();
    }

    let events: Vec<CaptureEvent> = rx.try_iter().collect();
    let failures = events
        .iter()
        .filter(|e| matches!(e, CaptureEvent::CaptureFailure { .. }))
        .count();
    let loops = events
        .iter()
        .filter(|e| matches!(e, CaptureEvent::LoopDetected { .. }))
        .count();
    let stats = orchestrator.stats();

    println!(
        "\n  {} events, {} loops, {} captured, {} failed",
        events.len(),
        loops,
        stats.capture_count,
        failures
    );
    println!("  Total area: {:.0} m²", stats.total_area_sq_meters);

    for event in &events {
        if let CaptureEvent::CaptureFailure { reason, area, .. } = event {
            println!("  [FAIL] {} ({:.0} m²)", reason, area);
        }
    }

    Ok(orchestrator.captured_territories().to_vec())
}

fn print_territories(territories: &[Territory]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(territories)?);
    Ok(())
}
