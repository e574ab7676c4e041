//! Presentational slot models
//!
//! The host shell owns the actual chrome; these are the values it needs to fill
//! its pre-game, in-game and post-game slots.

use serde::Serialize;

use crate::games::GameKind;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::sim::{GamePhase, SimState, Simulation};

/// Heads-up display values for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub combo: u32,
    pub best_combo: u32,
    pub level: u32,
    pub lives: u32,
    pub difficulty: f32,
    pub elapsed_secs: f32,
}

impl Hud {
    pub fn from_state(state: &SimState) -> Self {
        Self {
            score: state.score(),
            combo: state.combo(),
            best_combo: state.scoring.best_combo(),
            level: state.level(),
            lives: state.lives,
            difficulty: state.difficulty(),
            elapsed_secs: state.elapsed_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    PreGame {
        title: &'static str,
        description: &'static str,
    },
    Playing(Hud),
    PostGame {
        won: bool,
        title: String,
        subtitle: String,
    },
}

impl Screen {
    pub fn for_simulation(sim: &Simulation) -> Self {
        let kind = sim.kind();
        match sim.phase() {
            GamePhase::Idle => Screen::PreGame {
                title: kind.title(),
                description: kind.description(),
            },
            GamePhase::Playing => Screen::Playing(Hud::from_state(&sim.state)),
            GamePhase::GameOver => {
                let won = sim.is_victory();
                let title = match (kind, won) {
                    (GameKind::Cricket, true) => "Innings Complete".to_string(),
                    (GameKind::Cricket, false) => "All Out".to_string(),
                    (_, true) => "Victory".to_string(),
                    (_, false) => "Game Over".to_string(),
                };
                let subtitle = format!(
                    "Score {} / best combo {} / {} {}",
                    sim.state.score(),
                    sim.state.scoring.best_combo(),
                    progression_label(kind),
                    sim.state.level()
                );
                Screen::PostGame {
                    won,
                    title,
                    subtitle,
                }
            }
        }
    }
}

fn progression_label(kind: GameKind) -> &'static str {
    match kind {
        GameKind::BrickBreaker => "level",
        GameKind::SpaceInvaders => "wave",
        GameKind::Cricket => "over",
    }
}

/// Where a per-game leaderboard is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeaderboardSlot {
    pub game_type: &'static str,
}

impl LeaderboardSlot {
    pub fn for_kind(kind: GameKind) -> Self {
        Self {
            game_type: kind.game_type(),
        }
    }

    pub fn entries<'a>(&self, scores: &'a HighScores) -> &'a [HighScoreEntry] {
        scores
            .board(self.game_type)
            .map(|board| board.entries.as_slice())
            .unwrap_or(&[])
    }
}
