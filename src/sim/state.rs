//! Simulation state and core types
//!
//! One `SimState` per session. It is owned by the session and only mutated
//! inside `Simulation::tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, clamp_to_board};
use super::difficulty::{DifficultyCurve, Progression};
use super::entity::{EntityStore, MoverKind, PickupKind};
use super::scoring::ScoreKeeper;
use crate::consts::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::input::ShotKind;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No loop running, state at defaults
    Idle,
    /// Loop running, input accepted
    Playing,
    /// Session ended, score submitted
    GameOver,
}

/// Logical board size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: f32,
    pub height: f32,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
        }
    }
}

impl Board {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        clamp_to_board(p, self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// The player-controlled body: paddle, ship or batsman
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub pos: Vec2,
    pub half: Vec2,
    /// Keyboard movement speed (units/s)
    pub speed: f32,
}

impl Avatar {
    pub fn new(pos: Vec2, half: Vec2, speed: f32) -> Self {
        Self { pos, half, speed }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.half)
    }

    pub fn top(&self) -> f32 {
        self.pos.y - self.half.y
    }

    /// Jump horizontally to `x`, kept fully on the board
    pub fn move_to_x(&mut self, x: f32, board: &Board) {
        let lo = self.half.x.min(board.width * 0.5);
        let hi = (board.width - self.half.x).max(lo);
        self.pos.x = x.clamp(lo, hi);
    }

    /// Keyboard movement: `steer` in [-1, 1]
    pub fn nudge(&mut self, steer: f32, dt: f32, board: &Board) {
        let x = self.pos.x + steer.clamp(-1.0, 1.0) * self.speed * dt;
        self.move_to_x(x, board);
    }
}

/// Discrete cricket outcomes, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// Delivery hit the stumps without a swing
    Bowled,
    /// Swing found a fielder
    Caught,
    /// No swing, ball went past
    Missed,
    Dot,
    Single,
    Double,
    Four,
    Six,
}

impl ShotOutcome {
    pub fn runs(&self) -> u32 {
        match self {
            ShotOutcome::Single => 1,
            ShotOutcome::Double => 2,
            ShotOutcome::Four => 4,
            ShotOutcome::Six => 6,
            _ => 0,
        }
    }

    pub fn is_wicket(&self) -> bool {
        matches!(self, ShotOutcome::Bowled | ShotOutcome::Caught)
    }

    /// Reaches the rope (worth a celebration)
    pub fn is_boundary(&self) -> bool {
        matches!(self, ShotOutcome::Four | ShotOutcome::Six)
    }
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Attached ball(s) launched
    Launched,
    /// Player shot fired
    Fired,
    /// Mover reflected off a wall
    WallBounce { pos: Vec2 },
    /// Ball bounced off the paddle at offset -1..1
    AvatarBounce { pos: Vec2, offset: f32 },
    /// Obstacle damaged but still standing
    ObstacleHit { id: u32, pos: Vec2 },
    /// Obstacle destroyed
    ObstacleDestroyed { id: u32, tier: u8, pos: Vec2 },
    /// Mover crossed its loss edge
    Lost { id: u32, kind: MoverKind, pos: Vec2 },
    /// Mover or pickup left through a quiet edge
    Expired {
        id: u32,
        kind: Option<MoverKind>,
        pos: Vec2,
    },
    /// Avatar took a hit
    AvatarStruck { pos: Vec2 },
    PickupSpawned { kind: PickupKind, pos: Vec2 },
    PickupCollected { kind: PickupKind, pos: Vec2 },
    /// Cricket delivery resolved
    Delivery {
        outcome: ShotOutcome,
        shot: Option<ShotKind>,
        quality: f32,
        pos: Vec2,
    },
    /// Clear condition met; `level` is the new progression level
    Cleared { level: u32 },
    /// Enemies reached the avatar row
    Breach,
}

/// Complete state of one session
#[derive(Debug, Clone)]
pub struct SimState {
    /// Session seed
    pub seed: u64,
    pub board: Board,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Lives or wickets remaining
    pub lives: u32,
    pub scoring: ScoreKeeper,
    pub progression: Progression,
    pub avatar: Avatar,
    pub entities: EntityStore,
    /// Events of the most recent tick
    pub events: Vec<GameEvent>,
    /// Gameplay RNG (particles use their own stream)
    pub rng: Pcg32,
}

impl SimState {
    /// Fresh state in `Idle` with the given seed
    pub fn new(seed: u64, board: Board, curve: DifficultyCurve) -> Self {
        Self {
            seed,
            board,
            phase: GamePhase::Idle,
            time_ticks: 0,
            lives: 0,
            scoring: ScoreKeeper::new(),
            progression: Progression::new(curve),
            avatar: Avatar::new(
                Vec2::new(board.width * 0.5, board.height - 40.0),
                Vec2::new(40.0, 6.0),
                400.0,
            ),
            entities: EntityStore::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn score(&self) -> u64 {
        self.scoring.score()
    }

    pub fn combo(&self) -> u32 {
        self.scoring.combo()
    }

    pub fn level(&self) -> u32 {
        self.progression.level()
    }

    pub fn difficulty(&self) -> f32 {
        self.progression.difficulty()
    }

    /// Seconds of simulated time
    pub fn elapsed_secs(&self) -> f32 {
        self.time_ticks as f32 * crate::consts::SIM_DT
    }

    /// Decrement lives, saturating at zero
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
