//! Runner configuration files.
//!
//! A parameter file is a flat TOML table of `StrategyParams` fields. A scan
//! file wraps the same table under `[params]` and lists instruments:
//!
//! ```toml
//! [params]
//! stop_atr_length = 14
//!
//! [[instruments]]
//! symbol = "SPY"
//! path = "data/spy.csv"
//! ```

use std::path::{Path, PathBuf};

use alphawave_core::StrategyParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data_loader::{load_csv, LoadOptions};
use crate::scan::Instrument;

/// Load and validate a flat parameter file.
pub fn load_params(path: impl AsRef<Path>) -> Result<StrategyParams> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    StrategyParams::from_toml_str(&text)
        .with_context(|| format!("invalid parameters in {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentSource {
    pub symbol: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    #[serde(default)]
    pub params: StrategyParams,
    #[serde(default)]
    pub skip_invalid_rows: bool,
    pub instruments: Vec<InstrumentSource>,
}

impl ScanConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("invalid scan configuration")?;
        config.params.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config =
            Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))?;
        // Relative data paths are resolved against the config file's directory.
        if let Some(dir) = path.parent() {
            for source in &mut config.instruments {
                if source.path.is_relative() {
                    source.path = dir.join(&source.path);
                }
            }
        }
        Ok(config)
    }

    /// Read every instrument's CSV.
    pub fn load_universe(&self) -> Result<Vec<Instrument>> {
        let opts = LoadOptions {
            skip_invalid_rows: self.skip_invalid_rows,
        };
        self.instruments
            .iter()
            .map(|source| {
                let history = load_csv(&source.path, &opts)
                    .with_context(|| format!("loading {}", source.symbol))?;
                Ok(Instrument::new(source.symbol.clone(), history.into_inner()))
            })
            .collect()
    }
}
