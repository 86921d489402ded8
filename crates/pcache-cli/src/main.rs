//! PCache CLI - Command Line Interface
//!
//! Command-line tool for exercising the pcache engine and its timeseries
//! representations.
//!
//! Key Features:
//! - End-to-end namespace / structure / instance walkthrough
//! - Tick string inspection
//! - Densifying `timestamp=value` points into a fixed-stride series
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use pcache_common::{LoggingConfig, PCacheConfig, PCacheError, Result};
use pcache_engine::CacheEngine;
use pcache_timeseries::{parse_tick, FixedTimeseries, Timeseries};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "pcache")]
#[command(author = "AutomataNexus Development Team")]
#[command(version = "0.1.0")]
#[command(about = "Structured in-memory timeseries cache", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, rename and populate a namespace, then read the series back
    Demo,
    /// Print the number of milliseconds in a tick string
    Tick { tick: String },
    /// Build a fixed-stride series from TIMESTAMP=VALUE points
    Densify {
        #[arg(short, long)]
        tick: String,
        /// Value written to slots without a source point
        #[arg(short, long, default_value = "null")]
        null: String,
        /// Sort points by timestamp before building
        #[arg(long)]
        unordered: bool,
        /// Print the series as JSON
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        points: Vec<String>,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_ref().map(|path| PCacheConfig::from_file(path)) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
        None => PCacheConfig::default(),
    };

    init_tracing(&config.logging);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(command: Commands, config: &PCacheConfig) -> Result<()> {
    match command {
        Commands::Demo => {
            for line in demo(config)? {
                println!("{}", line);
            }
            Ok(())
        }
        Commands::Tick { tick } => {
            println!("{}", parse_tick(&tick)?);
            Ok(())
        }
        Commands::Densify {
            tick,
            null,
            unordered,
            json,
            points,
        } => densify(&tick, null, unordered, json, &points),
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Walk the store lifecycle and return the retrieved series as output lines.
fn demo(config: &PCacheConfig) -> Result<Vec<String>> {
    let series = Timeseries::new(
        &[
            "1970-01-01T00:00:01Z",
            "1970-01-01T00:00:02Z",
            "1970-01-01T00:00:03Z",
        ],
        vec!["x".to_string(), "y".to_string(), "z".to_string()],
    )?;

    let engine = CacheEngine::with_config(config.engine.clone());

    engine.add_namespace("sentinel")?;
    engine.rename_namespace("sentinel", "xentinel")?;

    engine.add_structure("xentinel", "filmstrip", "tid,sid")?;
    engine.rename_structure("xentinel", "filmstrip", "xilmstrip")?;

    engine.add_structure_instance("xentinel", "xilmstrip", "tid=1, sid=1", series)?;

    let stored = engine.get_timeseries("xentinel", "xilmstrip", "tid=1,sid=1")?;

    let mut lines = vec![format!("Cache initialized | {}", stored.len())];
    lines.extend(
        stored
            .points()
            .iter()
            .map(|p| format!("{}\t{}", format_millis(p.timestamp), p.value)),
    );
    Ok(lines)
}

fn format_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

fn densify(tick: &str, null: String, unordered: bool, json: bool, points: &[String]) -> Result<()> {
    let mut timestamps = Vec::with_capacity(points.len());
    let mut values = Vec::with_capacity(points.len());
    for point in points {
        let (timestamp, value) = point.split_once('=').ok_or_else(|| {
            PCacheError::Format(format!("expected TIMESTAMP=VALUE, got '{}'", point))
        })?;
        timestamps.push(timestamp.to_string());
        values.push(value.to_string());
    }

    let series = if unordered {
        FixedTimeseries::build_unordered(&timestamps, values, tick, null)?
    } else {
        FixedTimeseries::build(&timestamps, values, tick, null)?
    };

    if json {
        let out = serde_json::to_string_pretty(&series)
            .map_err(|e| PCacheError::Format(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    for (millis, value) in series.iter() {
        println!("{}\t{}", format_millis(millis), value);
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
