//! A bounded, newest-first log of past predictions, kept in a JSON file.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use inplay::file::{read_json, write_json};

use crate::domain::MatchSnapshot;
use crate::model::Prediction;

pub const DEFAULT_CAPACITY: usize = 5;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Creation time in milliseconds since the epoch.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub snapshot: MatchSnapshot,
    /// The serialized [`Prediction`].
    pub prediction: Value,
}
impl PredictionRecord {
    pub fn new(snapshot: &MatchSnapshot, prediction: &Prediction) -> Result<Self, HistoryError> {
        Self::at(Utc::now(), snapshot, prediction)
    }

    pub fn at(
        timestamp: DateTime<Utc>,
        snapshot: &MatchSnapshot,
        prediction: &Prediction,
    ) -> Result<Self, HistoryError> {
        Ok(Self {
            id: timestamp.timestamp_millis().to_string(),
            timestamp,
            snapshot: snapshot.clone(),
            prediction: serde_json::to_value(prediction)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    capacity: usize,
    records: Vec<PredictionRecord>,
}
impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: Vec::with_capacity(capacity),
        }
    }

    /// Reads the history at `path`; a missing file yields an empty history.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        match read_json::<Vec<PredictionRecord>>(path) {
            Ok(mut records) => {
                records.truncate(DEFAULT_CAPACITY);
                Ok(Self {
                    capacity: DEFAULT_CAPACITY,
                    records,
                })
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HistoryError> {
        write_json(path, &self.records)?;
        Ok(())
    }

    /// Adds `record` as the newest entry, evicting the oldest beyond capacity.
    pub fn push(&mut self, record: PredictionRecord) {
        self.records.insert(0, record);
        if self.records.len() > self.capacity {
            let evicted = self.records.len() - self.capacity;
            debug!("evicting {evicted} history record(s)");
            self.records.truncate(self.capacity);
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibration;
    use crate::model::predict;
    use chrono::TimeZone;
    use std::env;

    fn create_test_record(millis: i64) -> PredictionRecord {
        let snapshot = MatchSnapshot {
            home_team: "Malmö".into(),
            away_team: "AIK".into(),
            minute: 30,
            ..MatchSnapshot::default()
        };
        let prediction = predict(&snapshot, &Calibration::Identity);
        let timestamp = Utc.timestamp_millis_opt(millis).unwrap();
        PredictionRecord::at(timestamp, &snapshot, &prediction).unwrap()
    }

    #[test]
    fn record_id_from_timestamp() {
        let record = create_test_record(1_700_000_000_123);
        assert_eq!("1700000000123", record.id);
        assert!(record.prediction.get("tips").is_some());
        assert!(record.prediction.get("distribution").is_some());
    }

    #[test]
    fn push_evicts_oldest() {
        let mut history = History::default();
        for millis in 0..7 {
            history.push(create_test_record(millis));
        }
        assert_eq!(DEFAULT_CAPACITY, history.len());
        let ids: Vec<_> = history.records().iter().map(|record| record.id.as_str()).collect();
        assert_eq!(vec!["6", "5", "4", "3", "2"], ids);
    }

    #[test]
    fn clear() {
        let mut history = History::with_capacity(2);
        history.push(create_test_record(1));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn save_then_load() {
        let path = env::temp_dir().join(format!("inplay-history-{}.json", std::process::id()));
        let mut history = History::default();
        history.push(create_test_record(10));
        history.push(create_test_record(20));
        history.save(&path).unwrap();

        let loaded = History::load(&path).unwrap();
        assert_eq!(2, loaded.len());
        for (saved, loaded) in history.records().iter().zip(loaded.records()) {
            assert_eq!(saved.id, loaded.id);
            assert_eq!(saved.timestamp, loaded.timestamp);
            assert_eq!(saved.snapshot, loaded.snapshot);
            assert_eq!(saved.prediction["tips"], loaded.prediction["tips"]);
        }
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn load_missing_is_empty() {
        let path = env::temp_dir().join("inplay-history-does-not-exist.json");
        let history = History::load(path).unwrap();
        assert!(history.is_empty());
    }
}
