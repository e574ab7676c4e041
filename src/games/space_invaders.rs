//! Space invaders rules
//!
//! The ship fires bullets up at a formation that marches side to side, steps
//! down at the edges and drops bombs. A wave is cleared when every alien is
//! down; the game ends when the ship runs out of lives or the formation reaches
//! the ship row.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GameKind, GameRules, ObstacleResponse};
use crate::input::Intent;
use crate::sim::collision::{BoundaryPolicy, Edge, EdgeRule};
use crate::sim::difficulty::rows_for_level;
use crate::sim::entity::{Entity, Mover, MoverKind, Obstacle, ObstacleKind, Role};
use crate::sim::scoring::Verdict;
use crate::sim::state::{Avatar, GameEvent, SimState};

/// Space invaders balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceInvadersTuning {
    pub lives: u32,
    pub ship_half: Vec2,
    pub ship_inset: f32,
    pub ship_speed: f32,
    pub bullet_speed: f32,
    pub bullet_half: Vec2,
    /// Ticks between shots
    pub fire_cooldown: u32,
    /// Player bullets allowed in flight
    pub max_bullets: usize,
    pub columns: u32,
    pub base_rows: u32,
    pub max_rows: u32,
    pub alien_half: Vec2,
    /// Centre-to-centre spacing inside the formation
    pub alien_spacing: Vec2,
    pub formation_top: f32,
    /// Horizontal march speed at difficulty 1.0 (units/s)
    pub march_speed: f32,
    /// Extra march speed when the last alien stands (multiplier on top of 1.0)
    pub march_rampup: f32,
    /// Drop at each edge
    pub step_down: f32,
    /// Bomb chance per tick at difficulty 1.0
    pub bomb_rate: f64,
    pub max_bombs: usize,
    pub bomb_speed: f32,
    pub bomb_half: Vec2,
    /// Points for tier 1, 2 and 3 aliens
    pub tier_points: [u64; 3],
    /// Clear bonus per cleared wave
    pub wave_bonus: u64,
}

impl Default for SpaceInvadersTuning {
    fn default() -> Self {
        Self {
            lives: 3,
            ship_half: Vec2::new(16.0, 8.0),
            ship_inset: 40.0,
            ship_speed: 300.0,
            bullet_speed: 480.0,
            bullet_half: Vec2::new(2.0, 6.0),
            fire_cooldown: 18,
            max_bullets: 2,
            columns: 8,
            base_rows: 3,
            max_rows: 6,
            alien_half: Vec2::new(14.0, 10.0),
            alien_spacing: Vec2::new(40.0, 34.0),
            formation_top: 60.0,
            march_speed: 30.0,
            march_rampup: 2.0,
            step_down: 16.0,
            bomb_rate: 0.01,
            max_bombs: 4,
            bomb_speed: 200.0,
            bomb_half: Vec2::new(3.0, 6.0),
            tier_points: [10, 20, 30],
            wave_bonus: 150,
        }
    }
}

/// Space invaders rules and formation state
#[derive(Debug, Clone)]
pub struct SpaceInvaders {
    tuning: SpaceInvadersTuning,
    cooldown: u32,
    /// +1 marching right, -1 marching left
    direction: f32,
    wave_size: usize,
    breached: bool,
}

impl SpaceInvaders {
    pub fn new(tuning: SpaceInvadersTuning) -> Self {
        Self {
            tuning,
            cooldown: 0,
            direction: 1.0,
            wave_size: 0,
            breached: false,
        }
    }

    pub fn tuning(&self) -> &SpaceInvadersTuning {
        &self.tuning
    }

    pub fn is_breached(&self) -> bool {
        self.breached
    }

    fn spawn_wave(&mut self, state: &mut SimState, wave: u32) {
        let t = &self.tuning;
        let columns = t.columns.max(1);
        let rows = rows_for_level(t.base_rows, t.max_rows, wave);
        let width = (columns - 1) as f32 * t.alien_spacing.x;
        let left = (state.board.width - width) * 0.5;

        for row in 0..rows {
            let tier = match row {
                0 => 3,
                1 | 2 => 2,
                _ => 1,
            };
            let y = t.formation_top + t.alien_half.y + row as f32 * t.alien_spacing.y;
            for col in 0..columns {
                let x = left + col as f32 * t.alien_spacing.x;
                state.entities.spawn(
                    Vec2::new(x, y),
                    Vec2::ZERO,
                    t.alien_half,
                    Role::Obstacle(Obstacle::new(ObstacleKind::Alien, tier, 1)),
                );
            }
        }
        self.wave_size = (rows * columns) as usize;
        self.direction = 1.0;
        self.cooldown = 0;
        log::debug!("Wave {}: {} rows x {} columns", wave, rows, columns);
    }

    fn fire(&mut self, state: &mut SimState) -> bool {
        if self.cooldown > 0 || state.entities.count_movers(MoverKind::Bullet) >= self.tuning.max_bullets {
            return false;
        }
        let ship = state.avatar;
        let half = self.tuning.bullet_half;
        state.entities.spawn(
            Vec2::new(ship.pos.x, ship.top() - half.y),
            Vec2::new(0.0, -self.tuning.bullet_speed),
            half,
            Role::Mover(Mover::free(MoverKind::Bullet)),
        );
        self.cooldown = self.tuning.fire_cooldown;
        true
    }

    /// Move the formation one tick; reverses and steps down at the edges
    fn march(&mut self, state: &mut SimState, dt: f32) {
        let alive = state.entities.count_obstacles(ObstacleKind::Alien);
        if alive == 0 {
            return;
        }
        let killed = 1.0 - alive as f32 / self.wave_size.max(alive) as f32;
        let speed = self.tuning.march_speed
            * state.difficulty()
            * (1.0 + self.tuning.march_rampup * killed);
        let dx = self.direction * speed * dt;

        let (min_x, max_x) = state
            .entities
            .alive()
            .filter(|e| is_alien(e))
            .fold((f32::MAX, f32::MIN), |(lo, hi), e| {
                let b = e.aabb();
                (lo.min(b.min.x), hi.max(b.max.x))
            });

        let width = state.board.width;
        let step_down = min_x + dx < 0.0 || max_x + dx > width;
        for entity in state.entities.iter_mut() {
            if !entity.alive || !is_alien(entity) {
                continue;
            }
            if step_down {
                entity.pos.y += self.tuning.step_down;
            } else {
                entity.pos.x += dx;
            }
        }
        if step_down {
            self.direction = -self.direction;
        }

        let bottom = state
            .entities
            .alive()
            .filter(|e| is_alien(e))
            .map(|e| e.aabb().max.y)
            .fold(f32::MIN, f32::max);
        if !self.breached && bottom >= state.avatar.top() {
            self.breached = true;
            log::info!("Formation reached the ship row");
            state.push_event(GameEvent::Breach);
        }
    }

    fn drop_bombs(&self, state: &mut SimState) {
        if state.entities.count_movers(MoverKind::Bomb) >= self.tuning.max_bombs {
            return;
        }
        let chance = (self.tuning.bomb_rate * state.difficulty() as f64).clamp(0.0, 1.0);
        if !state.rng.random_bool(chance) {
            return;
        }
        let shooters: Vec<Vec2> = state
            .entities
            .alive()
            .filter(|e| is_alien(e))
            .map(|e| Vec2::new(e.pos.x, e.aabb().max.y))
            .collect();
        if shooters.is_empty() {
            return;
        }
        let origin = shooters[state.rng.random_range(0..shooters.len())];
        let half = self.tuning.bomb_half;
        state.entities.spawn(
            origin + Vec2::new(0.0, half.y),
            Vec2::new(0.0, self.tuning.bomb_speed * state.difficulty()),
            half,
            Role::Mover(Mover::free(MoverKind::Bomb)),
        );
    }

    fn points_for_tier(&self, tier: u8) -> u64 {
        let index = (tier.max(1) as usize - 1).min(self.tuning.tier_points.len() - 1);
        self.tuning.tier_points[index]
    }
}

fn is_alien(entity: &Entity) -> bool {
    entity.obstacle().is_some_and(|o| o.kind == ObstacleKind::Alien)
}

impl GameRules for SpaceInvaders {
    fn kind(&self) -> GameKind {
        GameKind::SpaceInvaders
    }

    fn initial_lives(&self) -> u32 {
        self.tuning.lives
    }

    fn setup(&mut self, state: &mut SimState) {
        let board = state.board;
        state.avatar = Avatar::new(
            Vec2::new(board.width * 0.5, board.height - self.tuning.ship_inset),
            self.tuning.ship_half,
            self.tuning.ship_speed,
        );
        self.breached = false;
        self.spawn_wave(state, state.level());
    }

    fn apply_intent(&mut self, state: &mut SimState, intent: &Intent, dt: f32) {
        let board = state.board;
        if let Some(x) = intent.target_x {
            state.avatar.move_to_x(x, &board);
        } else if intent.steer != 0.0 {
            state.avatar.nudge(intent.steer, dt, &board);
        }

        self.cooldown = self.cooldown.saturating_sub(1);
        if intent.primary {
            if self.fire(state) {
                state.push_event(GameEvent::Fired);
            } else {
                log::trace!("Shot dropped (cooldown {})", self.cooldown);
            }
        }
    }

    fn advance(&mut self, state: &mut SimState, dt: f32) {
        self.march(state, dt);
        self.drop_bombs(state);
    }

    fn boundary_policy(&self, entity: &Entity) -> Option<BoundaryPolicy> {
        match entity.mover()?.kind {
            MoverKind::Bullet => Some(BoundaryPolicy::CLAMP.with(Edge::Top, EdgeRule::Expire)),
            MoverKind::Bomb => Some(BoundaryPolicy::CLAMP.with(Edge::Bottom, EdgeRule::Expire)),
            _ => None,
        }
    }

    fn obstacle_response(&self, mover: &Mover, obstacle: &Obstacle) -> Option<ObstacleResponse> {
        (mover.kind == MoverKind::Bullet && obstacle.kind == ObstacleKind::Alien)
            .then_some(ObstacleResponse::Vanish)
    }

    fn collide_avatar(&mut self, state: &mut SimState) {
        let ship_box = state.avatar.aabb();
        let mut events = Vec::new();
        for entity in state.entities.iter_mut() {
            if entity.is_live_mover(MoverKind::Bomb) && entity.aabb().overlaps(&ship_box) {
                entity.alive = false;
                events.push(GameEvent::AvatarStruck { pos: entity.pos });
            }
        }
        state.events.extend(events);
    }

    fn resolve_outcomes(&mut self, state: &mut SimState, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::AvatarStruck { .. } = event {
                state.lose_life();
                log::debug!("Ship hit, {} lives left", state.lives);
            }
        }
    }

    fn is_cleared(&self, state: &SimState) -> bool {
        !self.breached && state.entities.count_obstacles(ObstacleKind::Alien) == 0
    }

    fn regenerate(&mut self, state: &mut SimState) {
        state.entities.kill_where(|e| e.mover().is_some());
        self.spawn_wave(state, state.level());
    }

    fn classify(&self, event: &GameEvent, _state: &SimState) -> Verdict {
        match *event {
            GameEvent::ObstacleDestroyed { tier, .. } => Verdict::Qualifying {
                points: self.points_for_tier(tier),
            },
            GameEvent::Expired {
                kind: Some(MoverKind::Bullet),
                ..
            }
            | GameEvent::AvatarStruck { .. }
            | GameEvent::Breach => Verdict::Disqualifying,
            GameEvent::Cleared { level } => Verdict::Neutral {
                points: self
                    .tuning
                    .wave_bonus
                    .saturating_mul(level.saturating_sub(1).max(1) as u64),
            },
            _ => Verdict::Ignore,
        }
    }

    fn is_terminal(&self, state: &SimState) -> bool {
        state.lives == 0 || self.breached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::difficulty::DifficultyCurve;
    use crate::sim::state::{Board, GamePhase};
    use crate::sim::{EmitterConfig, Simulation};
    use crate::tuning::Tuning;

    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.space_invaders.bomb_rate = 0.0;
        tuning
    }

    fn started(tuning: Tuning) -> Simulation {
        let mut sim = Simulation::new(
            GameKind::SpaceInvaders,
            tuning,
            EmitterConfig::default(),
            5,
        );
        sim.start(5);
        sim
    }

    fn fire() -> Intent {
        Intent {
            primary: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_wave_layout() {
        let sim = started(quiet_tuning());
        assert_eq!(sim.state.entities.count_obstacles(ObstacleKind::Alien), 24);
        let tiers: Vec<u8> = sim
            .state
            .entities
            .alive()
            .filter_map(|e| e.obstacle().map(|o| o.tier))
            .collect();
        assert_eq!(&tiers[..8], &[3; 8]);
        assert_eq!(&tiers[16..], &[2; 8]);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut sim = started(quiet_tuning());
        sim.tick(&fire(), SIM_DT);
        sim.tick(&fire(), SIM_DT);
        assert_eq!(sim.state.entities.count_movers(MoverKind::Bullet), 1);
        for _ in 0..17 {
            sim.tick(&Intent::default(), SIM_DT);
        }
        sim.tick(&fire(), SIM_DT);
        assert_eq!(sim.state.entities.count_movers(MoverKind::Bullet), 2);
    }

    #[test]
    fn test_missed_bullet_breaks_combo() {
        let rules = SpaceInvaders::new(SpaceInvadersTuning::default());
        let state = SimState::new(1, Board::default(), DifficultyCurve::default());
        let miss = GameEvent::Expired {
            id: 1,
            kind: Some(MoverKind::Bullet),
            pos: Vec2::ZERO,
        };
        assert_eq!(rules.classify(&miss, &state), Verdict::Disqualifying);
        let bomb_gone = GameEvent::Expired {
            id: 2,
            kind: Some(MoverKind::Bomb),
            pos: Vec2::ZERO,
        };
        assert_eq!(rules.classify(&bomb_gone, &state), Verdict::Ignore);
    }

    #[test]
    fn test_bullet_destroys_alien_and_vanishes() {
        let mut rules = SpaceInvaders::new(SpaceInvadersTuning::default());
        let mut sim_state = SimState::new(1, Board::default(), DifficultyCurve::default());
        rules.setup(&mut sim_state);
        let target = sim_state
            .entities
            .alive()
            .find(|e| is_alien(e))
            .copied()
            .expect("alien");
        let bullet = sim_state.entities.spawn(
            target.pos + Vec2::new(0.0, 12.0),
            Vec2::new(0.0, -480.0),
            Vec2::new(2.0, 6.0),
            Role::Mover(Mover::free(MoverKind::Bullet)),
        );
        crate::sim::physics::resolve_obstacles(&mut sim_state, &rules);
        assert!(sim_state.events.iter().any(|e| matches!(
            e,
            GameEvent::ObstacleDestroyed { id, tier: 3, .. } if *id == target.id
        )));
        assert!(!sim_state.entities.find(bullet).is_some_and(|e| e.alive));
    }

    #[test]
    fn test_formation_reverses_and_steps_down_at_edge() {
        let mut rules = SpaceInvaders::new(SpaceInvadersTuning::default());
        let mut state = SimState::new(1, Board::default(), DifficultyCurve::default());
        rules.setup(&mut state);
        // Shove the formation against the right wall
        let shift = {
            let max_x = state
                .entities
                .alive()
                .map(|e| e.aabb().max.x)
                .fold(f32::MIN, f32::max);
            state.board.width - max_x - 0.1
        };
        for e in state.entities.iter_mut() {
            e.pos.x += shift;
        }
        let y_before = state.entities.get(0).map(|e| e.pos.y).unwrap_or_default();
        rules.march(&mut state, SIM_DT);
        let y_after = state.entities.get(0).map(|e| e.pos.y).unwrap_or_default();
        assert_eq!(y_after - y_before, 16.0);
        assert_eq!(rules.direction, -1.0);

        let x_before = state.entities.get(0).map(|e| e.pos.x).unwrap_or_default();
        rules.march(&mut state, SIM_DT);
        let x_after = state.entities.get(0).map(|e| e.pos.x).unwrap_or_default();
        assert!(x_after < x_before);
    }

    #[test]
    fn test_breach_ends_game() {
        let mut sim = started(quiet_tuning());
        let ship_top = sim.state.avatar.top();
        for e in sim.state.entities.iter_mut() {
            if is_alien(e) {
                e.pos.y = ship_top - 5.0;
            }
        }
        sim.tick(&Intent::default(), SIM_DT);
        assert!(sim.state.events.contains(&GameEvent::Breach));
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert!(sim.state.lives > 0);
    }

    #[test]
    fn test_bomb_strike_costs_life() {
        let mut sim = started(quiet_tuning());
        let ship = sim.state.avatar;
        sim.state.entities.spawn(
            ship.pos,
            Vec2::new(0.0, 200.0),
            Vec2::new(3.0, 6.0),
            Role::Mover(Mover::free(MoverKind::Bomb)),
        );
        sim.tick(&Intent::default(), SIM_DT);
        assert_eq!(sim.state.lives, 2);
        assert!(
            sim.state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::AvatarStruck { .. }))
        );
        assert_eq!(sim.state.entities.count_movers(MoverKind::Bomb), 0);
    }

    #[test]
    fn test_wave_clear_spawns_bigger_wave() {
        let mut sim = started(quiet_tuning());
        for e in sim.state.entities.iter_mut() {
            if is_alien(e) {
                e.alive = false;
            }
        }
        sim.tick(&Intent::default(), SIM_DT);
        assert_eq!(sim.state.level(), 2);
        assert_eq!(sim.state.entities.count_obstacles(ObstacleKind::Alien), 32);
        assert_eq!(sim.state.score(), 150);
    }
}
