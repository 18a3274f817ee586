//! Predictor adapters.
//!
//! - `PredictionTable`: replays model outputs computed offline, keyed by bar
//!   timestamp (CSV columns `timestamp,direction,confidence`).
//! - `EnsemblePredictor`: combines member predictors by hard (majority) or
//!   soft (probability-averaged) voting. Members that are untrained, fail, or
//!   abstain are skipped; an ensemble with no votes is unavailable.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use alphawave_core::{Bar, Predictor, PredictorDirection, PredictorError, PredictorOutput};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::data_loader::parse_timestamp;

#[derive(Debug, Error)]
pub enum PredictionTableError {
    #[error("cannot open prediction table: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: unrecognised timestamp '{value}'")]
    Timestamp { line: u64, value: String },

    #[error("line {line}: {source}")]
    Output { line: u64, source: PredictorError },

    #[error("line {line}: duplicate timestamp {timestamp}")]
    Duplicate { line: u64, timestamp: NaiveDateTime },
}

#[derive(Debug, Deserialize)]
struct PredictionRow {
    #[serde(alias = "Timestamp", alias = "date", alias = "Date")]
    timestamp: String,
    #[serde(alias = "Direction", alias = "prediction", alias = "signal")]
    direction: String,
    #[serde(alias = "Confidence", alias = "probability")]
    confidence: f64,
}

/// Precomputed predictions looked up by the timestamp of the latest bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionTable {
    name: String,
    outputs: BTreeMap<NaiveDateTime, PredictorOutput>,
}

impl PredictionTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, timestamp: NaiveDateTime, output: PredictorOutput) {
        self.outputs.insert(timestamp, output);
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, PredictionTableError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "prediction_table".to_string());
        let file = std::fs::File::open(path)?;
        Self::from_reader(name, file)
    }

    pub fn from_reader<R: Read>(
        name: impl Into<String>,
        reader: R,
    ) -> Result<Self, PredictionTableError> {
        let mut table = Self::new(name);
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        for (i, result) in rdr.deserialize::<PredictionRow>().enumerate() {
            let line = i as u64 + 2;
            let row = result?;
            let timestamp =
                parse_timestamp(&row.timestamp).ok_or_else(|| PredictionTableError::Timestamp {
                    line,
                    value: row.timestamp.clone(),
                })?;
            let output = row
                .direction
                .parse()
                .and_then(|direction| PredictorOutput::new(direction, row.confidence))
                .map_err(|source| PredictionTableError::Output { line, source })?;
            if table.outputs.insert(timestamp, output).is_some() {
                return Err(PredictionTableError::Duplicate { line, timestamp });
            }
        }
        Ok(table)
    }
}

impl Predictor for PredictionTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, history: &[Bar]) -> Result<PredictorOutput, PredictorError> {
        if self.outputs.is_empty() {
            return Err(PredictorError::NotTrained);
        }
        let last = history
            .last()
            .ok_or_else(|| PredictorError::Unavailable("empty history".into()))?;
        self.outputs
            .get(&last.timestamp)
            .copied()
            .ok_or_else(|| PredictorError::Unavailable(format!("no entry for {}", last.timestamp)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voting {
    /// Majority of directional votes; confidence is the mean member confidence.
    Hard,
    /// Mean of each member's P(up); confidence is the winning side's probability.
    #[default]
    Soft,
}

pub struct EnsemblePredictor {
    name: String,
    voting: Voting,
    members: Vec<Arc<dyn Predictor>>,
}

impl std::fmt::Debug for EnsemblePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsemblePredictor")
            .field("name", &self.name)
            .field("voting", &self.voting)
            .field(
                "members",
                &self.members.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl EnsemblePredictor {
    pub fn new(voting: Voting) -> Self {
        Self {
            name: format!("ensemble_{voting:?}").to_lowercase(),
            voting,
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Arc<dyn Predictor>) -> Self {
        self.members.push(member);
        self
    }

    pub fn voting(&self) -> Voting {
        self.voting
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Directional outputs of every member that produced one.
    fn votes(&self, history: &[Bar]) -> Vec<PredictorOutput> {
        self.members
            .iter()
            .filter_map(|member| match member.predict(history) {
                Ok(output) if output.check().is_err() => {
                    warn!(member = member.name(), ?output, "ignoring invalid member output");
                    None
                }
                Ok(output) if output.direction == PredictorDirection::None => None,
                Ok(output) => Some(output),
                Err(PredictorError::NotTrained) => None,
                Err(e) => {
                    warn!(member = member.name(), error = %e, "ensemble member failed");
                    None
                }
            })
            .collect()
    }
}

fn prob_up(output: &PredictorOutput) -> f64 {
    match output.direction {
        PredictorDirection::Up => output.confidence,
        PredictorDirection::Down => 1.0 - output.confidence,
        PredictorDirection::None => 0.5,
    }
}

impl Predictor for EnsemblePredictor {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, history: &[Bar]) -> Result<PredictorOutput, PredictorError> {
        if self.members.is_empty() {
            return Err(PredictorError::NotTrained);
        }
        let votes = self.votes(history);
        if votes.is_empty() {
            return Err(PredictorError::Unavailable("no member produced a vote".into()));
        }
        let n = votes.len() as f64;

        match self.voting {
            Voting::Hard => {
                let ups = votes
                    .iter()
                    .filter(|v| v.direction == PredictorDirection::Up)
                    .count() as f64;
                let direction = if ups > n / 2.0 {
                    PredictorDirection::Up
                } else {
                    PredictorDirection::Down
                };
                let confidence = votes.iter().map(|v| v.confidence).sum::<f64>() / n;
                PredictorOutput::new(direction, confidence)
            }
            Voting::Soft => {
                let p = votes.iter().map(prob_up).sum::<f64>() / n;
                if p > 0.5 {
                    PredictorOutput::up(p)
                } else {
                    PredictorOutput::down(1.0 - p)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::linear_trend;

    struct Fixed(Result<PredictorOutput, PredictorError>);

    impl Predictor for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _history: &[Bar]) -> Result<PredictorOutput, PredictorError> {
            self.0.clone()
        }
    }

    fn member(direction: PredictorDirection, confidence: f64) -> Arc<dyn Predictor> {
        Arc::new(Fixed(PredictorOutput::new(direction, confidence)))
    }

    #[test]
    fn table_looks_up_latest_bar() {
        let bars = linear_trend(3, 10.0, 1.0, 0.5);
        let csv = "timestamp,direction,confidence\n\
                   2020-01-02,up,0.8\n\
                   2020-01-03,down,0.7\n";
        let table = PredictionTable::from_reader("model", csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.predict(&bars[..2]).unwrap(),
            PredictorOutput::up(0.8).unwrap()
        );
        assert_eq!(
            table.predict(&bars).unwrap(),
            PredictorOutput::down(0.7).unwrap()
        );
        assert!(matches!(
            table.predict(&bars[..1]),
            Err(PredictorError::Unavailable(_))
        ));
    }

    #[test]
    fn empty_table_is_not_trained() {
        let table = PredictionTable::new("empty");
        let bars = linear_trend(1, 10.0, 1.0, 0.5);
        assert_eq!(table.predict(&bars), Err(PredictorError::NotTrained));
    }

    #[test]
    fn table_rejects_bad_rows() {
        let bad_conf = "timestamp,direction,confidence\n2020-01-01,up,1.7\n";
        assert!(matches!(
            PredictionTable::from_reader("m", bad_conf.as_bytes()),
            Err(PredictionTableError::Output { line: 2, .. })
        ));
        let dup = "timestamp,direction,confidence\n2020-01-01,up,0.6\n2020-01-01,down,0.6\n";
        assert!(matches!(
            PredictionTable::from_reader("m", dup.as_bytes()),
            Err(PredictionTableError::Duplicate { line: 3, .. })
        ));
    }

    #[test]
    fn hard_voting_majority() {
        let ensemble = EnsemblePredictor::new(Voting::Hard)
            .with_member(member(PredictorDirection::Up, 0.9))
            .with_member(member(PredictorDirection::Up, 0.6))
            .with_member(member(PredictorDirection::Down, 0.9));
        let out = ensemble.predict(&[]).unwrap();
        assert_eq!(out.direction, PredictorDirection::Up);
        assert!((out.confidence - 0.8).abs() < 1e-12);
    }

    #[test]
    fn hard_voting_tie_goes_down() {
        let ensemble = EnsemblePredictor::new(Voting::Hard)
            .with_member(member(PredictorDirection::Up, 0.9))
            .with_member(member(PredictorDirection::Down, 0.7));
        assert_eq!(ensemble.predict(&[]).unwrap().direction, PredictorDirection::Down);
    }

    #[test]
    fn soft_voting_averages_probabilities() {
        // P(up) = (0.9 + 0.6 + 0.2) / 3 = 0.5667
        let ensemble = EnsemblePredictor::new(Voting::Soft)
            .with_member(member(PredictorDirection::Up, 0.9))
            .with_member(member(PredictorDirection::Up, 0.6))
            .with_member(member(PredictorDirection::Down, 0.8));
        let out = ensemble.predict(&[]).unwrap();
        assert_eq!(out.direction, PredictorDirection::Up);
        assert!((out.confidence - 1.7 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn failing_and_untrained_members_are_skipped() {
        let ensemble = EnsemblePredictor::new(Voting::Soft)
            .with_member(Arc::new(Fixed(Err(PredictorError::NotTrained))))
            .with_member(Arc::new(Fixed(Err(PredictorError::Failed("boom".into())))))
            .with_member(member(PredictorDirection::None, 0.5))
            .with_member(member(PredictorDirection::Down, 0.75));
        let out = ensemble.predict(&[]).unwrap();
        assert_eq!(out, PredictorOutput::down(0.75).unwrap());
    }

    #[test]
    fn ensemble_without_votes_is_unavailable() {
        let none = EnsemblePredictor::new(Voting::Hard);
        assert_eq!(none.predict(&[]), Err(PredictorError::NotTrained));
        let silent = EnsemblePredictor::new(Voting::Hard)
            .with_member(Arc::new(Fixed(Err(PredictorError::NotTrained))));
        assert!(matches!(silent.predict(&[]), Err(PredictorError::Unavailable(_))));
    }
}
