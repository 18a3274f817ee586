//! AlphaWave Runner — everything around the signal engine that touches data.
//!
//! This crate builds on `alphawave-core` to provide:
//! - CSV bar loading and deterministic synthetic bars
//! - Signal tapes (bar-by-bar replay, no fills)
//! - Parallel universe scans (one rayon task per instrument)
//! - Predictor adapters: replayed prediction tables and voting ensembles
//! - CSV/JSON export and TOML configuration files

pub mod config;
pub mod data_loader;
pub mod export;
pub mod predictors;
pub mod scan;
pub mod synthetic;
pub mod tape;

pub use config::{load_params, InstrumentSource, ScanConfig};
pub use data_loader::{load_csv, parse_timestamp, read_bars, LoadError, LoadOptions};
pub use export::{scan_to_json, tape_from_json, tape_to_csv, tape_to_json, write_tape_csv};
pub use predictors::{EnsemblePredictor, PredictionTable, PredictionTableError, Voting};
pub use scan::{scan_latest, scan_tapes, Instrument, ScanOutcome, ScanResult};
pub use tape::{replay, SignalTape, TapeRow, TapeSummary};
