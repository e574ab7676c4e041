//! Progression counter and derived difficulty scalar

use serde::{Deserialize, Serialize};

/// Capped-linear difficulty as a function of the progression level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCurve {
    /// Difficulty at level 1
    pub base: f32,
    /// Added per level
    pub step: f32,
    /// Upper bound
    pub cap: f32,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            base: 1.0,
            step: 0.12,
            cap: 2.2,
        }
    }
}

impl DifficultyCurve {
    /// Difficulty for a 1-based level; non-decreasing in `level`, never above `cap`
    pub fn at(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        let raw = self.base + self.step.max(0.0) * steps;
        raw.min(self.cap.max(self.base))
    }
}

/// Level/wave/over index and the difficulty it implies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    level: u32,
    difficulty: f32,
    curve: DifficultyCurve,
}

impl Progression {
    pub fn new(curve: DifficultyCurve) -> Self {
        Self {
            level: 1,
            difficulty: curve.at(1),
            curve,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    /// Advance to the next level and return it
    pub fn advance(&mut self) -> u32 {
        self.level = self.level.saturating_add(1);
        self.difficulty = self.curve.at(self.level);
        log::info!(
            "Progression -> level {} (difficulty {:.2})",
            self.level,
            self.difficulty
        );
        self.level
    }
}

/// Saturating row count for a level: `base + level - 1`, at most `max`
pub fn rows_for_level(base: u32, max: u32, level: u32) -> u32 {
    base.saturating_add(level.saturating_sub(1)).min(max.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_level_one() {
        let p = Progression::new(DifficultyCurve::default());
        assert_eq!(p.level(), 1);
        assert_eq!(p.difficulty(), 1.0);
    }

    #[test]
    fn test_difficulty_monotonic_and_capped() {
        let curve = DifficultyCurve {
            base: 1.0,
            step: 0.25,
            cap: 2.0,
        };
        let mut p = Progression::new(curve);
        let mut last = p.difficulty();
        for _ in 0..20 {
            p.advance();
            assert!(p.difficulty() >= last);
            assert!(p.difficulty() <= 2.0);
            last = p.difficulty();
        }
        assert_eq!(p.level(), 21);
        assert_eq!(p.difficulty(), 2.0);
    }

    #[test]
    fn test_rows_saturate() {
        assert_eq!(rows_for_level(3, 8, 1), 3);
        assert_eq!(rows_for_level(3, 8, 4), 6);
        assert_eq!(rows_for_level(3, 8, 50), 8);
    }
}
