//! Game rule modules
//!
//! The engine in `sim` is generic; each game plugs its rules in through
//! `GameRules`: layout, avatar handling, edge and collision policies, outcome
//! bookkeeping, scoring verdicts and the clear/terminal predicates.

pub mod brick_breaker;
pub mod cricket;
pub mod space_invaders;

use serde::{Deserialize, Serialize};

pub use brick_breaker::BrickBreaker;
pub use cricket::Cricket;
pub use space_invaders::SpaceInvaders;

use crate::input::Intent;
use crate::sim::collision::BoundaryPolicy;
use crate::sim::entity::{Entity, Mover, Obstacle};
use crate::sim::scoring::Verdict;
use crate::sim::state::{GameEvent, SimState};
use crate::tuning::Tuning;

/// The three games on the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    BrickBreaker,
    SpaceInvaders,
    Cricket,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [
        GameKind::BrickBreaker,
        GameKind::SpaceInvaders,
        GameKind::Cricket,
    ];

    /// Game type string passed to score submission and the leaderboard
    pub fn game_type(&self) -> &'static str {
        match self {
            GameKind::BrickBreaker => "brick-breaker",
            GameKind::SpaceInvaders => "space-invaders",
            GameKind::Cricket => "cricket",
        }
    }

    pub fn from_game_type(s: &str) -> Option<Self> {
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.game_type().eq_ignore_ascii_case(s.trim()))
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::BrickBreaker => "Brick Breaker",
            GameKind::SpaceInvaders => "Space Invaders",
            GameKind::Cricket => "Cricket",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameKind::BrickBreaker => {
                "Keep the ball in play and smash every brick. Chain breaks between paddle touches for combo bonus."
            }
            GameKind::SpaceInvaders => {
                "Shoot down each wave before it reaches you. Every miss breaks your combo."
            }
            GameKind::Cricket => {
                "Time your swing as the ball reaches the crease. Pick Defend, Drive or Loft."
            }
        }
    }

    /// Fresh rules for a new session
    pub fn rules(&self, tuning: &Tuning) -> Box<dyn GameRules> {
        match self {
            GameKind::BrickBreaker => Box::new(BrickBreaker::new(tuning.brick_breaker.clone())),
            GameKind::SpaceInvaders => Box::new(SpaceInvaders::new(tuning.space_invaders.clone())),
            GameKind::Cricket => Box::new(Cricket::new(tuning.cricket.clone())),
        }
    }
}

/// How a mover responds to touching an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleResponse {
    /// Reflect off the obstacle (ball)
    Bounce,
    /// Mover is consumed (bullet)
    Vanish,
}

/// Rules of one game, layered on the generic tick
pub trait GameRules {
    fn kind(&self) -> GameKind;

    /// Lives (or wickets) at session start
    fn initial_lives(&self) -> u32;

    /// Whether the submission carries elapsed time
    fn reports_elapsed_time(&self) -> bool {
        false
    }

    /// Place the avatar and build the level-1 layout
    fn setup(&mut self, state: &mut SimState);

    /// Consume the tick's intent (avatar movement and the primary action)
    fn apply_intent(&mut self, state: &mut SimState, intent: &Intent, dt: f32);

    /// Scripted motion before integration (group march, bowling, attached balls)
    fn advance(&mut self, _state: &mut SimState, _dt: f32) {}

    /// Edge rules for a mover or pickup; None leaves the entity alone
    fn boundary_policy(&self, entity: &Entity) -> Option<BoundaryPolicy>;

    /// Response of `mover` touching `obstacle`; None means they pass through
    fn obstacle_response(&self, mover: &Mover, obstacle: &Obstacle) -> Option<ObstacleResponse>;

    /// Speed cap for a mover at the given difficulty
    fn speed_cap(&self, _mover: &Mover, _difficulty: f32) -> Option<f32> {
        None
    }

    /// Mover-vs-avatar and pickup-vs-avatar collisions
    fn collide_avatar(&mut self, state: &mut SimState);

    /// Consequences of this tick's collision events (lives, respawns, drops).
    /// New events go to `state.events`.
    fn resolve_outcomes(&mut self, state: &mut SimState, events: &[GameEvent]);

    /// Clear condition for the current level
    fn is_cleared(&self, state: &SimState) -> bool;

    /// Build the layout for the (already advanced) level
    fn regenerate(&mut self, state: &mut SimState);

    /// Scoring verdict for an event
    fn classify(&self, event: &GameEvent, state: &SimState) -> Verdict;

    /// Terminal condition for the session
    fn is_terminal(&self, state: &SimState) -> bool;

    /// Whether a finished session counts as a win
    fn is_victory(&self, _state: &SimState) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_type_round_trip() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_game_type(kind.game_type()), Some(kind));
        }
        assert_eq!(GameKind::from_game_type(" Cricket "), Some(GameKind::Cricket));
        assert_eq!(GameKind::from_game_type("pinball"), None);
    }

    #[test]
    fn test_rules_match_kind() {
        let tuning = Tuning::default();
        for kind in GameKind::ALL {
            assert_eq!(kind.rules(&tuning).kind(), kind);
        }
    }
}
