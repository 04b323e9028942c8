use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::STORAGE_KEY;
use crate::ports::{KeyValueStore, StoreError};

/// Shown on the leaderboard until the first real run is recorded. Never persisted.
pub const SAMPLE_LEADERBOARD: [(&str, u32); 5] = [
    ("Ace", 12000),
    ("Blitz", 9500),
    ("Comet", 7200),
    ("Dash", 4800),
    ("Echo", 2500),
];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u32,
    pub timestamp: DateTime<Utc>,
}

/// Finished runs, kept in memory and mirrored wholesale into the store.
pub struct ScoreBook<S: KeyValueStore> {
    store: S,
    records: Vec<ScoreRecord>,
}

impl<S: KeyValueStore> ScoreBook<S> {
    /// Reads the stored runs. Unreadable or malformed data starts an empty book.
    pub fn load(store: S) -> Self {
        let records = match store.get(STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("discarding malformed score records: {}", err);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("could not read score records: {}", err);
                Vec::new()
            }
        };
        info!("loaded {} score records", records.len());
        ScoreBook { store, records }
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn best_score(&self, name: &str) -> u32 {
        self.records
            .iter()
            .filter(|r| r.name == name)
            .map(|r| r.score)
            .max()
            .unwrap_or(0)
    }

    /// Highest scores first; equal scores keep the earlier run ahead.
    pub fn top_scores(&self, limit: usize) -> Vec<&ScoreRecord> {
        let mut sorted: Vec<&ScoreRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });
        sorted.truncate(limit);
        sorted
    }

    /// Display rows for the leaderboard, falling back to the sample list when empty.
    pub fn leaderboard(&self, limit: usize) -> Vec<(String, u32)> {
        if self.records.is_empty() {
            return SAMPLE_LEADERBOARD
                .iter()
                .take(limit)
                .map(|&(name, score)| (name.to_string(), score))
                .collect();
        }
        self.top_scores(limit)
            .into_iter()
            .map(|r| (r.name.clone(), r.score))
            .collect()
    }

    /// Appends a run and rewrites the stored list. The run stays in memory even if
    /// the write fails.
    pub fn record(&mut self, name: &str, score: u32, timestamp: DateTime<Utc>) -> Result<(), StoreError> {
        self.records.push(ScoreRecord {
            name: name.to_string(),
            score,
            timestamp,
        });
        persist(&mut self.store, &self.records)
    }
}

/// Encodes first so a value that cannot be serialized never replaces what is stored.
fn persist<S: KeyValueStore, T: Serialize + ?Sized>(store: &mut S, value: &T) -> Result<(), StoreError> {
    let data = serde_json::to_string(value)?;
    store.set(STORAGE_KEY, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn book(entries: &[(&str, u32, i64)]) -> ScoreBook<MemoryStore> {
        let mut book = ScoreBook::load(MemoryStore::new());
        for &(name, score, secs) in entries {
            book.record(name, score, at(secs)).unwrap();
        }
        book
    }

    #[test]
    fn encode_failure_leaves_store_alone() {
        let mut store = MemoryStore::with(STORAGE_KEY, "[\"old\"]");
        let mut unencodable = std::collections::HashMap::new();
        unencodable.insert((1u8, 2u8), 3u8);
        let err = persist(&mut store, &unencodable).unwrap_err();
        assert!(matches!(err, StoreError::Encode(_)));
        assert_eq!(store.get(STORAGE_KEY).unwrap().as_deref(), Some("[\"old\"]"));
    }

    #[test]
    fn best_score_per_name() {
        let book = book(&[("A", 50, 1), ("A", 90, 2), ("B", 70, 3)]);
        assert_eq!(book.best_score("A"), 90);
        assert_eq!(book.best_score("B"), 70);
        assert_eq!(book.best_score("C"), 0);
    }

    #[test]
    fn ties_rank_earlier_first() {
        let book = book(&[("late", 100, 50), ("early", 100, 10), ("top", 300, 30), ("low", 5, 1)]);
        let names: Vec<&str> = book.top_scores(3).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["top", "early", "late"]);
    }

    #[test]
    fn empty_book_shows_sample_leaderboard() {
        let book = book(&[]);
        let board = book.leaderboard(5);
        assert_eq!(board.len(), 5);
        assert_eq!(board[0], ("Ace".to_string(), 12000));
        assert_eq!(book.store().get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn records_survive_a_reload() {
        let book = book(&[("A", 10, 1), ("B", 20, 2)]);
        let reloaded = ScoreBook::load(book.store().clone());
        assert_eq!(reloaded.records(), book.records());
        let raw = reloaded.store().get(STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"timestamp\":\"1970-01-01T00:00:01Z\""));
    }

    #[test]
    fn corrupt_data_loads_empty() {
        let book = ScoreBook::load(MemoryStore::with(STORAGE_KEY, "{oops"));
        assert!(book.records().is_empty());
        let book = ScoreBook::load(MemoryStore::with(STORAGE_KEY, r#"[{"name":"x"}]"#));
        assert!(book.records().is_empty());
    }
}
