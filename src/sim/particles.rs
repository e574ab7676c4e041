//! Particle/effect emitter
//!
//! Visual only. The emitter draws from its own RNG stream and only ever spawns,
//! ages and kills `Role::Particle` entities, so turning it off changes nothing
//! about scoring, collisions or the lifecycle.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{EntityStore, Particle, Role};
use super::state::{Board, GameEvent};
use crate::consts::PARTICLE_GRAVITY;
use crate::rotate;

/// Palette indices understood by the renderer
pub mod palette {
    pub const SPARK: u32 = 90;
    pub const STRIKE: u32 = 91;
    pub const BOUNDARY: u32 = 92;
    pub const WICKET: u32 = 93;
    pub const CLEAR: u32 = 94;
}

/// Emitter configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub enabled: bool,
    /// Burst size range for destroy/impact events
    pub burst_min: u32,
    pub burst_max: u32,
    /// Time to live range (ticks)
    pub ttl_min: u32,
    pub ttl_max: u32,
    /// Initial speed range (units/s)
    pub speed_min: f32,
    pub speed_max: f32,
    /// Full cone angle around the emission direction (radians)
    pub cone: f32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Live particle cap
    pub max_particles: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            burst_min: 6,
            burst_max: 12,
            ttl_min: 18,
            ttl_max: 40,
            speed_min: 60.0,
            speed_max: 180.0,
            cone: std::f32::consts::PI * 1.5,
            gravity: PARTICLE_GRAVITY,
            max_particles: 500,
        }
    }
}

/// Spawns, ages and prunes particles
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    config: EmitterConfig,
    rng: Pcg32,
}

impl ParticleEmitter {
    pub fn new(config: EmitterConfig, seed: u64) -> Self {
        Self {
            config,
            // Separate stream from gameplay
            rng: Pcg32::new(seed, 0xa02b_dbf7_bb3c_0a7),
        }
    }

    pub fn disabled() -> Self {
        Self::new(
            EmitterConfig {
                enabled: false,
                ..Default::default()
            },
            0,
        )
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EmitterConfig) {
        self.config = config;
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && self.config.max_particles > 0
    }

    /// Spawn bursts for the impact events of this tick
    pub fn react(&mut self, events: &[GameEvent], store: &mut EntityStore, board: &Board) {
        if !self.is_enabled() {
            return;
        }
        let up = Vec2::new(0.0, -1.0);
        for event in events {
            match *event {
                GameEvent::ObstacleDestroyed { tier, pos, .. } => {
                    self.burst(store, board, pos, up, tier as u32);
                }
                GameEvent::AvatarStruck { pos } => {
                    self.burst(store, board, pos, up, palette::STRIKE);
                }
                GameEvent::AvatarBounce { pos, .. } => {
                    self.sparks(store, board, pos, up, 4);
                }
                GameEvent::Delivery { outcome, pos, .. } => {
                    if outcome.is_boundary() {
                        self.burst(store, board, pos, up, palette::BOUNDARY);
                    } else if outcome.is_wicket() {
                        self.burst(store, board, pos, up, palette::WICKET);
                    }
                }
                GameEvent::Cleared { .. } => {
                    let center = board.center();
                    self.burst(store, board, center, up, palette::CLEAR);
                }
                _ => {}
            }
        }
    }

    /// Spawn one burst of `burst_min..=burst_max` particles
    pub fn burst(&mut self, store: &mut EntityStore, board: &Board, pos: Vec2, dir: Vec2, color: u32) {
        let lo = self.config.burst_min.min(self.config.burst_max);
        let hi = self.config.burst_max.max(lo);
        let count = self.rng.random_range(lo..=hi);
        self.spawn(store, board, pos, dir, color, count);
    }

    fn sparks(&mut self, store: &mut EntityStore, board: &Board, pos: Vec2, dir: Vec2, count: u32) {
        self.spawn(store, board, pos, dir, palette::SPARK, count);
    }

    fn spawn(
        &mut self,
        store: &mut EntityStore,
        board: &Board,
        pos: Vec2,
        dir: Vec2,
        color: u32,
        count: u32,
    ) {
        let dir = dir.normalize_or_zero();
        let origin = board.clamp(pos);
        let half_cone = self.config.cone.abs() * 0.5;
        let ttl_lo = self.config.ttl_min.max(1);
        let ttl_hi = self.config.ttl_max.max(ttl_lo);
        let speed_lo = self.config.speed_min.min(self.config.speed_max);
        let speed_hi = self.config.speed_max.max(speed_lo);

        for _ in 0..count {
            if store.particle_count() >= self.config.max_particles {
                break;
            }
            let angle = if half_cone > 0.0 {
                self.rng.random_range(-half_cone..=half_cone)
            } else {
                0.0
            };
            let speed = if speed_hi > speed_lo {
                self.rng.random_range(speed_lo..speed_hi)
            } else {
                speed_lo
            };
            let ttl = self.rng.random_range(ttl_lo..=ttl_hi);
            let size = self.rng.random_range(1.5f32..3.5);
            store.spawn(
                origin,
                rotate(dir, angle) * speed,
                Vec2::splat(size * 0.5),
                Role::Particle(Particle {
                    ttl,
                    max_ttl: ttl,
                    color,
                    size,
                }),
            );
        }
    }

    /// Age every particle by one tick and kill expired or off-board ones
    pub fn update(&mut self, store: &mut EntityStore, board: &Board, dt: f32) {
        let gravity = self.config.gravity;
        for entity in store.iter_mut() {
            if !entity.alive {
                continue;
            }
            let Role::Particle(ref mut particle) = entity.role else {
                continue;
            };
            entity.pos += entity.vel * dt;
            entity.vel.y += gravity * dt;
            particle.ttl = particle.ttl.saturating_sub(1);
            if particle.ttl == 0 || !board.contains(entity.pos) {
                entity.alive = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particles(store: &EntityStore) -> Vec<Particle> {
        store
            .alive()
            .filter_map(|e| match e.role {
                Role::Particle(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_burst_size_in_range() {
        let board = Board::default();
        let mut emitter = ParticleEmitter::new(EmitterConfig::default(), 42);
        for _ in 0..20 {
            let mut store = EntityStore::new();
            emitter.burst(&mut store, &board, Vec2::new(100.0, 100.0), Vec2::Y, 1);
            let n = store.particle_count();
            assert!((6..=12).contains(&n), "burst of {}", n);
        }
    }

    #[test]
    fn test_particles_expire() {
        let board = Board::default();
        let config = EmitterConfig {
            ttl_min: 3,
            ttl_max: 3,
            gravity: 0.0,
            speed_min: 0.0,
            speed_max: 0.0,
            ..Default::default()
        };
        let mut emitter = ParticleEmitter::new(config, 1);
        let mut store = EntityStore::new();
        emitter.burst(&mut store, &board, Vec2::new(100.0, 100.0), Vec2::Y, 1);
        assert!(store.particle_count() > 0);
        for _ in 0..2 {
            emitter.update(&mut store, &board, 1.0 / 60.0);
            store.compact();
        }
        assert!(particles(&store).iter().all(|p| p.ttl == 1));
        emitter.update(&mut store, &board, 1.0 / 60.0);
        store.compact();
        assert_eq!(store.particle_count(), 0);
    }

    #[test]
    fn test_particles_leaving_board_die() {
        let board = Board::default();
        let mut emitter = ParticleEmitter::new(EmitterConfig::default(), 3);
        let mut store = EntityStore::new();
        emitter.burst(&mut store, &board, Vec2::new(1.0, 1.0), Vec2::NEG_Y, 1);
        for _ in 0..60 {
            emitter.update(&mut store, &board, 1.0 / 60.0);
            assert!(store.alive().all(|e| board.contains(e.pos)));
            store.compact();
        }
    }

    #[test]
    fn test_disabled_emitter_spawns_nothing() {
        let board = Board::default();
        let mut emitter = ParticleEmitter::disabled();
        let mut store = EntityStore::new();
        let events = [GameEvent::ObstacleDestroyed {
            id: 1,
            tier: 1,
            pos: Vec2::new(50.0, 50.0),
        }];
        emitter.react(&events, &mut store, &board);
        assert!(store.is_empty());
    }

    #[test]
    fn test_particle_cap() {
        let board = Board::default();
        let config = EmitterConfig {
            max_particles: 10,
            ..Default::default()
        };
        let mut emitter = ParticleEmitter::new(config, 5);
        let mut store = EntityStore::new();
        for _ in 0..5 {
            emitter.burst(&mut store, &board, Vec2::new(100.0, 100.0), Vec2::Y, 1);
        }
        assert_eq!(store.particle_count(), 10);
    }
}
