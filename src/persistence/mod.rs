//! High score persistence
//!
//! The core talks to storage through [`HighScoreStore`]. Storage is
//! best-effort: callers log failures and keep playing with what they have.
//! - `MemoryStore`: native builds and tests
//! - `LocalStorageStore`: browser LocalStorage (wasm only), one JSON record per game

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Persistent best-score storage keyed by game id
pub trait HighScoreStore {
    fn get_high_score(&self, game_id: &str) -> Result<u64, StoreError>;
    fn set_high_score(&mut self, game_id: &str, score: u64) -> Result<(), StoreError>;
}

/// Stored high score record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScoreRecord {
    pub score: u64,
    /// Unix timestamp (ms) when achieved, 0 if unknown
    #[serde(default)]
    pub timestamp: f64,
}

/// Read a high score, falling back to 0 on any failure
pub fn load_high_score(store: &dyn HighScoreStore, game_id: &str) -> u64 {
    match store.get_high_score(game_id) {
        Ok(score) => score,
        Err(e) => {
            log::warn!("Could not read high score for {}: {}", game_id, e);
            0
        }
    }
}

/// Write a high score; failures are logged and swallowed
pub fn save_high_score(store: &mut dyn HighScoreStore, game_id: &str, score: u64) {
    match store.set_high_score(game_id, score) {
        Ok(()) => log::info!("High score saved: {}", score),
        Err(e) => log::warn!("Could not save high score for {}: {}", game_id, e),
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scores: HashMap<String, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HighScoreStore for MemoryStore {
    fn get_high_score(&self, game_id: &str) -> Result<u64, StoreError> {
        Ok(self.scores.get(game_id).copied().unwrap_or(0))
    }

    fn set_high_score(&mut self, game_id: &str, score: u64) -> Result<(), StoreError> {
        self.scores.insert(game_id.to_string(), score);
        Ok(())
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn key(game_id: &str) -> String {
        format!("{}_highscore", game_id)
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl HighScoreStore for LocalStorageStore {
    fn get_high_score(&self, game_id: &str) -> Result<u64, StoreError> {
        let storage = Self::storage()?;
        let json = storage
            .get_item(&Self::key(game_id))
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))?;
        match json {
            Some(json) => serde_json::from_str::<HighScoreRecord>(&json)
                .map(|r| r.score)
                .map_err(|e| StoreError::Corrupt(e.to_string())),
            None => Ok(0),
        }
    }

    fn set_high_score(&mut self, game_id: &str, score: u64) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        let record = HighScoreRecord {
            score,
            timestamp: js_sys::Date::now(),
        };
        let json = serde_json::to_string(&record).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        storage
            .set_item(&Self::key(game_id), &json)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }
}

/// Store that fails every call, for exercising degraded paths
#[cfg(test)]
pub struct FailingStore;

#[cfg(test)]
impl HighScoreStore for FailingStore {
    fn get_high_score(&self, _game_id: &str) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set_high_score(&mut self, _game_id: &str, _score: u64) -> Result<(), StoreError> {
        Err(StoreError::Backend("quota exceeded".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_high_score("gravity-well").unwrap(), 0);
        store.set_high_score("gravity-well", 4200).unwrap();
        assert_eq!(store.get_high_score("gravity-well").unwrap(), 4200);
        assert_eq!(store.get_high_score("other").unwrap(), 0);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let mut store = FailingStore;
        assert_eq!(load_high_score(&store, "gravity-well"), 0);
        save_high_score(&mut store, "gravity-well", 10);
    }

    #[test]
    fn test_record_tolerates_missing_timestamp() {
        let record: HighScoreRecord = serde_json::from_str(r#"{ "score": 77 }"#).unwrap();
        assert_eq!(record.score, 77);
        assert_eq!(record.timestamp, 0.0);
    }
}
