//! Score and combo state machine
//!
//! Purely reactive: the engine feeds it one `Verdict` per event, in event order.

use serde::{Deserialize, Serialize};

/// How an event affects score and combo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Success that extends the combo
    Qualifying { points: u64 },
    /// Points without touching the combo
    Neutral { points: u64 },
    /// Failure or null outcome; resets the combo
    Disqualifying,
    /// Not scored
    Ignore,
}

/// Combo state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboState {
    Neutral,
    Combo(u32),
}

/// Scoring constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Bonus per combo step already banked when a qualifying event lands
    pub combo_bonus: u64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self { combo_bonus: 5 }
    }
}

/// Running score, current combo and best combo of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreKeeper {
    score: u64,
    combo: u32,
    best_combo: u32,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    pub fn state(&self) -> ComboState {
        if self.combo == 0 {
            ComboState::Neutral
        } else {
            ComboState::Combo(self.combo)
        }
    }

    /// Apply a verdict and return the points awarded
    pub fn apply(&mut self, verdict: Verdict, tuning: &ScoringTuning) -> u64 {
        match verdict {
            Verdict::Qualifying { points } => {
                let bonus = tuning.combo_bonus.saturating_mul(self.combo as u64);
                self.combo = self.combo.saturating_add(1);
                self.best_combo = self.best_combo.max(self.combo);
                let awarded = points.saturating_add(bonus);
                self.score = self.score.saturating_add(awarded);
                awarded
            }
            Verdict::Neutral { points } => {
                self.score = self.score.saturating_add(points);
                points
            }
            Verdict::Disqualifying => {
                if self.combo > 0 {
                    log::debug!("Combo broken at {}", self.combo);
                }
                self.combo = 0;
                0
            }
            Verdict::Ignore => 0,
        }
    }
}
