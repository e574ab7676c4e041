//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (gameplay and particles on separate streams)
//! - Stable iteration order (arena order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod particles;
pub mod physics;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collision::{Aabb, BoundaryPolicy, Edge, EdgeRule};
pub use difficulty::{DifficultyCurve, Progression};
pub use entity::{
    Entity, EntityStore, Mover, MoverKind, MoverState, Obstacle, ObstacleKind, Particle,
    PickupKind, Role,
};
pub use particles::{EmitterConfig, ParticleEmitter};
pub use scoring::{ComboState, ScoreKeeper, ScoringTuning, Verdict};
pub use state::{Avatar, Board, GameEvent, GamePhase, ShotOutcome, SimState};
pub use tick::Simulation;
