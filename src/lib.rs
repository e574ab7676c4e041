//! Arcade Engine - one real-time 2D simulation core, three arcade games
//!
//! Core modules:
//! - `sim`: Simulation (entities, physics, collisions, scoring, progression, particles)
//! - `games`: Rule modules layered on the engine (brick breaker, space invaders, cricket)
//! - `input`: Device-independent input adapter
//! - `lifecycle`: Session state machine, frame loop and score submission
//! - `renderer`: Pure state -> draw list contract
//! - `platform`: Frame scheduler abstraction (manual and browser)
//! - `settings` / `tuning`: Player preferences and data-driven game balance
//! - `highscores`: Local per-game leaderboard
//! - `autopilot`: Demo player driving the input adapter

pub mod autopilot;
pub mod games;
pub mod highscores;
pub mod input;
pub mod lifecycle;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use games::{GameKind, GameRules};
pub use highscores::HighScores;
pub use input::{InputAdapter, InputEvent, Intent, Key, ShotKind};
pub use lifecycle::{ScoreSink, Session};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Logical board dimensions (all physics runs in this space)
    pub const BOARD_WIDTH: f32 = 480.0;
    pub const BOARD_HEIGHT: f32 = 640.0;

    /// Downward acceleration applied to particles (units/s²)
    pub const PARTICLE_GRAVITY: f32 = 240.0;
}

/// Unit vector at `angle` radians measured from straight up (screen space, +y down)
#[inline]
pub fn direction_from_vertical(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}
