//! AlphaWave CLI — signal, tape, scan, and params commands.
//!
//! Commands:
//! - `signal` — evaluate the latest bar of a CSV file and print the decision
//! - `tape` — replay a CSV file bar by bar and write the signal tape
//! - `scan` — evaluate the latest bar across a universe (TOML or synthetic)
//! - `params` — print the default strategy parameters as TOML

use alphawave_core::{SignalEngine, StrategyParams};
use alphawave_runner::synthetic::{random_walk, seed_for_symbol};
use alphawave_runner::{
    load_csv, load_params, replay, scan_latest, scan_to_json, tape_to_csv, tape_to_json,
    write_tape_csv, Instrument, LoadOptions, PredictionTable, ScanConfig,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(
    name = "alphawave",
    about = "AlphaWave CLI — bar-by-bar trading signal engine"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the latest bar of a CSV file and print the decision as JSON.
    Signal {
        /// Bar file (timestamp, open, high, low, close, volume).
        #[arg(long)]
        csv: PathBuf,

        /// Strategy parameter overrides (TOML).
        #[arg(long)]
        params: Option<PathBuf>,

        /// Precomputed predictions (timestamp, direction, confidence).
        #[arg(long)]
        predictions: Option<PathBuf>,

        /// Drop malformed rows instead of failing.
        #[arg(long, default_value_t = false)]
        skip_invalid: bool,
    },
    /// Replay a CSV file bar by bar and write the signal tape.
    Tape {
        #[arg(long)]
        csv: PathBuf,

        #[arg(long)]
        params: Option<PathBuf>,

        #[arg(long)]
        predictions: Option<PathBuf>,

        /// Symbol recorded in the tape. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,

        /// Output file. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = TapeFormat::Csv)]
        format: TapeFormat,

        #[arg(long, default_value_t = false)]
        skip_invalid: bool,
    },
    /// Evaluate the latest bar for every instrument in a universe.
    Scan {
        /// Scan config (TOML with [params] and [[instruments]]).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scan this many synthetic random-walk instruments instead.
        #[arg(long)]
        synthetic: Option<usize>,

        /// Bars per synthetic instrument.
        #[arg(long, default_value_t = 500)]
        bars: usize,
    },
    /// Print the default strategy parameters as TOML.
    Params,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TapeFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Signal {
            csv,
            params,
            predictions,
            skip_invalid,
        } => run_signal(&csv, params.as_deref(), predictions.as_deref(), skip_invalid),
        Commands::Tape {
            csv,
            params,
            predictions,
            symbol,
            out,
            format,
            skip_invalid,
        } => run_tape(
            &csv,
            params.as_deref(),
            predictions.as_deref(),
            symbol,
            out.as_deref(),
            format,
            skip_invalid,
        ),
        Commands::Scan {
            config,
            synthetic,
            bars,
        } => run_scan(config.as_deref(), synthetic, bars),
        Commands::Params => {
            print!("{}", StrategyParams::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn build_engine(params: Option<&Path>, predictions: Option<&Path>) -> Result<SignalEngine> {
    let params = match params {
        Some(path) => load_params(path)?,
        None => StrategyParams::default(),
    };
    let mut engine = SignalEngine::new(params)?;
    if let Some(path) = predictions {
        let table = PredictionTable::from_csv_path(path)
            .with_context(|| format!("failed to load predictions from {}", path.display()))?;
        info!(rows = table.len(), "loaded prediction table");
        engine = engine.with_predictor(Arc::new(table));
    }
    Ok(engine)
}

fn run_signal(
    csv: &Path,
    params: Option<&Path>,
    predictions: Option<&Path>,
    skip_invalid: bool,
) -> Result<()> {
    let engine = build_engine(params, predictions)?;
    let opts = LoadOptions {
        skip_invalid_rows: skip_invalid,
    };
    let history = load_csv(csv, &opts)?;
    let decision = engine.evaluate(&history)?;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

fn run_tape(
    csv: &Path,
    params: Option<&Path>,
    predictions: Option<&Path>,
    symbol: Option<String>,
    out: Option<&Path>,
    format: TapeFormat,
    skip_invalid: bool,
) -> Result<()> {
    let engine = build_engine(params, predictions)?;
    let opts = LoadOptions {
        skip_invalid_rows: skip_invalid,
    };
    let history = load_csv(csv, &opts)?;
    let symbol = symbol.unwrap_or_else(|| {
        csv.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    });

    let tape = replay(&engine, &symbol, &history);
    let summary = tape.summary();
    info!(
        symbol = %tape.symbol,
        bars = summary.bars,
        long_entries = summary.long_entries,
        short_entries = summary.short_entries,
        vetoed = summary.vetoed,
        "tape complete"
    );

    match (out, format) {
        (Some(path), TapeFormat::Csv) => write_tape_csv(&tape, path)?,
        (Some(path), TapeFormat::Json) => std::fs::write(path, tape_to_json(&tape)?)
            .with_context(|| format!("failed to write {}", path.display()))?,
        (None, TapeFormat::Csv) => print!("{}", tape_to_csv(&tape)?),
        (None, TapeFormat::Json) => println!("{}", tape_to_json(&tape)?),
    }
    if let Some(path) = out {
        println!("Tape saved to: {}", path.display());
    }
    Ok(())
}

fn run_scan(config: Option<&Path>, synthetic: Option<usize>, bars: usize) -> Result<()> {
    let (engine, universe) = match (config, synthetic) {
        (Some(_), Some(_)) => bail!("--config and --synthetic are mutually exclusive"),
        (None, None) => bail!("one of --config or --synthetic is required"),
        (Some(path), None) => {
            let config = ScanConfig::load(path)?;
            let universe = config.load_universe()?;
            (SignalEngine::new(config.params)?, universe)
        }
        (None, Some(count)) => {
            let universe = (0..count)
                .map(|i| {
                    let symbol = format!("SYN{i:03}");
                    let bars = random_walk(bars, 100.0, seed_for_symbol(&symbol));
                    Instrument::new(symbol, bars)
                })
                .collect();
            (SignalEngine::new(StrategyParams::default())?, universe)
        }
    };

    let results = scan_latest(&engine, &universe);
    println!("{}", scan_to_json(&results)?);
    Ok(())
}
