//! Local high score leaderboards
//!
//! One top-10 table per game type, persisted to LocalStorage on the web. Works
//! as a `ScoreSink` so a session can submit straight into it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lifecycle::ScoreSink;

/// Maximum number of high scores kept per game type
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Seconds played, for games that report it
    pub elapsed_secs: Option<f32>,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Top scores of one game type, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score if it qualifies and return its rank
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Leaderboards keyed by game type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    boards: BTreeMap<String, Leaderboard>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_engine_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self, game_type: &str) -> Option<&Leaderboard> {
        self.boards.get(game_type)
    }

    pub fn top_score(&self, game_type: &str) -> Option<u64> {
        self.board(game_type).and_then(Leaderboard::top_score)
    }

    pub fn is_empty(&self) -> bool {
        self.boards.values().all(|b| b.entries.is_empty())
    }

    /// Add a score to the game's table; returns the rank if it made the cut
    pub fn add_score(
        &mut self,
        game_type: &str,
        score: u64,
        elapsed_secs: Option<f32>,
        timestamp: f64,
    ) -> Option<usize> {
        let board = self.boards.entry(game_type.to_string()).or_default();
        board.add(HighScoreEntry {
            score,
            elapsed_secs,
            timestamp,
        })
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!("Loaded high scores for {} games", scores.boards.len());
                        return scores;
                    }
                    Err(err) => log::warn!("Discarding unreadable high scores: {}", err),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Could not write high scores to LocalStorage");
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ScoreSink for HighScores {
    fn submit_score(&mut self, game_type: &str, score: u64, elapsed_secs: Option<f32>) {
        match self.add_score(game_type, score, elapsed_secs, now_ms()) {
            Some(rank) => log::info!("New {} high score: {} (rank {})", game_type, score, rank),
            None => log::debug!("{} score {} did not make the table", game_type, score),
        }
        self.save();
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_per_game_type() {
        let mut scores = HighScores::new();
        scores.submit_score("cricket", 120, None);
        scores.submit_score("brick-breaker", 500, Some(42.0));
        assert_eq!(scores.top_score("cricket"), Some(120));
        assert_eq!(scores.top_score("brick-breaker"), Some(500));
        assert_eq!(scores.top_score("space-invaders"), None);
        let entry = &scores.board("brick-breaker").expect("board").entries[0];
        assert_eq!(entry.elapsed_secs, Some(42.0));
    }

    #[test]
    fn test_table_keeps_top_ten_sorted() {
        let mut scores = HighScores::new();
        for score in 1..=15u64 {
            scores.add_score("cricket", score * 10, None, 0.0);
        }
        let board = scores.board("cricket").expect("board");
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(150));
        assert_eq!(board.entries.last().map(|e| e.score), Some(60));
        assert!(!board.qualifies(50));
        assert_eq!(board.potential_rank(145), Some(2));
    }

    #[test]
    fn test_zero_score_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score("cricket", 0, None, 0.0), None);
        assert!(scores.is_empty());
    }
}
