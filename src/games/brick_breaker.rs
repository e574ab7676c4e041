//! Brick breaker rules
//!
//! A paddle keeps one or more balls in play against a wall of multi-hit bricks.
//! Destroyed bricks may drop power-ups that fall toward the paddle.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GameKind, GameRules, ObstacleResponse};
use crate::input::Intent;
use crate::rotate;
use crate::sim::collision::{self, BoundaryPolicy, Edge, EdgeRule};
use crate::sim::difficulty::rows_for_level;
use crate::sim::entity::{
    Entity, Mover, MoverKind, MoverState, Obstacle, ObstacleKind, PickupKind, Role,
};
use crate::sim::scoring::Verdict;
use crate::sim::state::{Avatar, GameEvent, SimState};

/// Brick breaker balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrickBreakerTuning {
    pub lives: u32,
    pub max_lives: u32,
    /// Paddle half extents
    pub paddle_half: Vec2,
    /// Paddle centre distance from the bottom edge
    pub paddle_inset: f32,
    /// Keyboard paddle speed (units/s)
    pub paddle_speed: f32,
    pub ball_radius: f32,
    /// Launch speed (units/s)
    pub ball_speed: f32,
    /// Speed cap at difficulty 1.0; scales with difficulty
    pub ball_max_speed: f32,
    /// Speed multiplier per paddle touch
    pub paddle_speedup: f32,
    /// Largest deflection from vertical at the paddle edge (radians)
    pub max_bounce_angle: f32,
    /// Largest launch angle from vertical (radians)
    pub launch_spread: f32,
    pub columns: u32,
    pub base_rows: u32,
    pub max_rows: u32,
    pub margin: f32,
    pub gap: f32,
    pub brick_top: f32,
    pub brick_height: f32,
    /// Chance a destroyed brick drops a power-up
    pub pickup_chance: f64,
    pub pickup_fall_speed: f32,
    pub pickup_size: f32,
    /// Power-up duration (ticks)
    pub effect_ticks: u32,
    pub widen_factor: f32,
    pub slow_factor: f32,
    /// Extra balls spawned by multi-ball
    pub multiball_count: u32,
    /// Points for destroying tier 1, 2 and 3 bricks
    pub tier_points: [u64; 3],
    pub damage_points: u64,
    pub pickup_points: u64,
    /// Clear bonus per cleared level
    pub clear_bonus: u64,
}

impl Default for BrickBreakerTuning {
    fn default() -> Self {
        Self {
            lives: 3,
            max_lives: 5,
            paddle_half: Vec2::new(40.0, 6.0),
            paddle_inset: 40.0,
            paddle_speed: 420.0,
            ball_radius: 5.0,
            ball_speed: 300.0,
            ball_max_speed: 420.0,
            paddle_speedup: 1.03,
            max_bounce_angle: 1.05,
            launch_spread: 0.35,
            columns: 8,
            base_rows: 3,
            max_rows: 8,
            margin: 16.0,
            gap: 4.0,
            brick_top: 60.0,
            brick_height: 18.0,
            pickup_chance: 0.15,
            pickup_fall_speed: 120.0,
            pickup_size: 8.0,
            effect_ticks: 600,
            widen_factor: 1.5,
            slow_factor: 0.7,
            multiball_count: 2,
            tier_points: [10, 20, 40],
            damage_points: 5,
            pickup_points: 25,
            clear_bonus: 100,
        }
    }
}

/// Brick breaker rules and power-up timers
#[derive(Debug, Clone)]
pub struct BrickBreaker {
    tuning: BrickBreakerTuning,
    widen_ticks: u32,
    slow_ticks: u32,
}

impl BrickBreaker {
    pub fn new(tuning: BrickBreakerTuning) -> Self {
        Self {
            tuning,
            widen_ticks: 0,
            slow_ticks: 0,
        }
    }

    pub fn tuning(&self) -> &BrickBreakerTuning {
        &self.tuning
    }

    /// Remaining widen/slow ticks
    pub fn effect_timers(&self) -> (u32, u32) {
        (self.widen_ticks, self.slow_ticks)
    }

    fn ball_cap(&self, difficulty: f32) -> f32 {
        let slow = if self.slow_ticks > 0 {
            self.tuning.slow_factor
        } else {
            1.0
        };
        self.tuning.ball_max_speed * difficulty.max(1.0) * slow
    }

    fn launch_speed(&self) -> f32 {
        if self.slow_ticks > 0 {
            self.tuning.ball_speed * self.tuning.slow_factor
        } else {
            self.tuning.ball_speed
        }
    }

    fn spawn_attached_ball(&self, state: &mut SimState) {
        let r = self.tuning.ball_radius;
        let pos = Vec2::new(state.avatar.pos.x, state.avatar.top() - r);
        state.entities.spawn(
            pos,
            Vec2::ZERO,
            Vec2::splat(r),
            Role::Mover(Mover {
                kind: MoverKind::Ball,
                state: MoverState::Attached { offset: 0.0 },
            }),
        );
    }

    /// Attached balls ride on the paddle
    fn follow_paddle(&self, state: &mut SimState) {
        let avatar = state.avatar;
        for entity in state.entities.iter_mut() {
            if !entity.alive {
                continue;
            }
            if let Some(&Mover {
                state: MoverState::Attached { offset },
                ..
            }) = entity.mover()
            {
                entity.pos = Vec2::new(avatar.pos.x + offset, avatar.top() - entity.half.y);
            }
        }
    }

    fn launch(&self, state: &mut SimState) -> bool {
        let speed = self.launch_speed();
        let spread = self.tuning.launch_spread.abs();
        let mut launched = false;
        for i in 0..state.entities.len() {
            let attached = state
                .entities
                .get(i)
                .is_some_and(|e| e.alive && e.mover().is_some_and(|m| m.is_attached()));
            if !attached {
                continue;
            }
            let angle = if spread > 0.0 {
                state.rng.random_range(-spread..=spread)
            } else {
                0.0
            };
            if let Some(entity) = state.entities.get_mut(i) {
                entity.vel = crate::direction_from_vertical(angle) * speed;
                if let Some(mover) = entity.mover_mut() {
                    mover.state = MoverState::Free;
                }
                launched = true;
            }
        }
        launched
    }

    /// Lay out the brick wall for `level`
    fn build_layout(&self, state: &mut SimState, level: u32) {
        let t = &self.tuning;
        let board = state.board;
        let columns = t.columns.max(1);
        let rows = rows_for_level(t.base_rows, t.max_rows, level);
        let usable = board.width - 2.0 * t.margin - (columns - 1) as f32 * t.gap;
        let width = (usable / columns as f32).max(4.0);
        let half = Vec2::new(width * 0.5, t.brick_height * 0.5);
        let max_tier = (1 + level / 2).min(3) as u8;

        for row in 0..rows {
            // Top band is toughest
            let band_tier = match row * 3 / rows {
                0 => 3,
                1 => 2,
                _ => 1,
            };
            let tier = band_tier.min(max_tier);
            let y = t.brick_top + row as f32 * (t.brick_height + t.gap) + half.y;
            for col in 0..columns {
                let x = t.margin + col as f32 * (width + t.gap) + half.x;
                state.entities.spawn(
                    Vec2::new(x, y),
                    Vec2::ZERO,
                    half,
                    Role::Obstacle(Obstacle::new(ObstacleKind::Brick, tier, tier)),
                );
            }
        }
        log::debug!(
            "Brick layout for level {}: {} rows x {} columns",
            level,
            rows,
            columns
        );
    }

    fn set_paddle_width(&self, state: &mut SimState, factor: f32) {
        state.avatar.half.x = self.tuning.paddle_half.x * factor;
        let x = state.avatar.pos.x;
        let board = state.board;
        state.avatar.move_to_x(x, &board);
    }

    fn apply_pickup(&mut self, state: &mut SimState, kind: PickupKind) {
        match kind {
            PickupKind::MultiBall => {
                let source = state
                    .entities
                    .alive()
                    .find(|e| e.mover().is_some_and(|m| m.kind == MoverKind::Ball && !m.is_attached()))
                    .map(|e| (e.pos, e.vel));
                let (pos, vel) = source.unwrap_or_else(|| {
                    let pos = Vec2::new(state.avatar.pos.x, state.avatar.top() - 20.0);
                    (pos, Vec2::new(0.0, -self.launch_speed()))
                });
                let r = self.tuning.ball_radius;
                for i in 0..self.tuning.multiball_count {
                    let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                    let angle = side * 0.4 * (1 + i / 2) as f32;
                    state.entities.spawn(
                        pos,
                        rotate(vel, angle),
                        Vec2::splat(r),
                        Role::Mover(Mover::free(MoverKind::Ball)),
                    );
                }
            }
            PickupKind::WidenPaddle => {
                self.widen_ticks = self.tuning.effect_ticks;
                self.set_paddle_width(state, self.tuning.widen_factor);
            }
            PickupKind::Slow => {
                self.slow_ticks = self.tuning.effect_ticks;
                let factor = self.tuning.slow_factor;
                for entity in state.entities.iter_mut() {
                    if entity.is_live_mover(MoverKind::Ball) {
                        entity.vel *= factor;
                    }
                }
            }
            PickupKind::ExtraLife => {
                state.lives = state.lives.saturating_add(1).min(self.tuning.max_lives);
            }
        }
        log::debug!("Power-up {:?} applied", kind);
    }

    fn points_for_tier(&self, tier: u8) -> u64 {
        let index = (tier.max(1) as usize - 1).min(self.tuning.tier_points.len() - 1);
        self.tuning.tier_points[index]
    }
}

impl GameRules for BrickBreaker {
    fn kind(&self) -> GameKind {
        GameKind::BrickBreaker
    }

    fn initial_lives(&self) -> u32 {
        self.tuning.lives
    }

    fn reports_elapsed_time(&self) -> bool {
        true
    }

    fn setup(&mut self, state: &mut SimState) {
        let board = state.board;
        state.avatar = Avatar::new(
            Vec2::new(board.width * 0.5, board.height - self.tuning.paddle_inset),
            self.tuning.paddle_half,
            self.tuning.paddle_speed,
        );
        self.widen_ticks = 0;
        self.slow_ticks = 0;
        self.build_layout(state, state.level());
        self.spawn_attached_ball(state);
    }

    fn apply_intent(&mut self, state: &mut SimState, intent: &Intent, dt: f32) {
        let board = state.board;
        if let Some(x) = intent.target_x {
            state.avatar.move_to_x(x, &board);
        } else if intent.steer != 0.0 {
            state.avatar.nudge(intent.steer, dt, &board);
        }
        self.follow_paddle(state);

        if intent.primary {
            if self.launch(state) {
                state.push_event(GameEvent::Launched);
            } else {
                log::trace!("Launch ignored: nothing attached");
            }
        }
    }

    fn advance(&mut self, state: &mut SimState, _dt: f32) {
        if self.widen_ticks > 0 {
            self.widen_ticks -= 1;
            if self.widen_ticks == 0 {
                self.set_paddle_width(state, 1.0);
            }
        }
        self.slow_ticks = self.slow_ticks.saturating_sub(1);
    }

    fn boundary_policy(&self, entity: &Entity) -> Option<BoundaryPolicy> {
        match entity.role {
            Role::Mover(Mover {
                kind: MoverKind::Ball,
                ..
            }) => Some(BoundaryPolicy::walls_with_loss(Edge::Bottom)),
            Role::Pickup(_) => Some(BoundaryPolicy::CLAMP.with(Edge::Bottom, EdgeRule::Expire)),
            _ => None,
        }
    }

    fn obstacle_response(&self, mover: &Mover, obstacle: &Obstacle) -> Option<ObstacleResponse> {
        (mover.kind == MoverKind::Ball && obstacle.kind == ObstacleKind::Brick)
            .then_some(ObstacleResponse::Bounce)
    }

    fn speed_cap(&self, mover: &Mover, difficulty: f32) -> Option<f32> {
        (mover.kind == MoverKind::Ball).then(|| self.ball_cap(difficulty))
    }

    fn collide_avatar(&mut self, state: &mut SimState) {
        let paddle = state.avatar;
        let paddle_box = paddle.aabb();
        let cap = self.ball_cap(state.difficulty());
        let t = &self.tuning;
        let mut events = Vec::new();
        let mut collected = Vec::new();

        for entity in state.entities.iter_mut() {
            if !entity.alive || !entity.aabb().overlaps(&paddle_box) {
                continue;
            }
            match entity.role {
                Role::Mover(Mover {
                    kind: MoverKind::Ball,
                    state: MoverState::Free,
                }) if entity.vel.y > 0.0 => {
                    let offset =
                        collision::impact_offset(entity.pos.x, paddle.pos.x, paddle.half.x);
                    let speed = (entity.vel.length() * t.paddle_speedup).min(cap);
                    entity.vel = collision::paddle_deflect(offset, speed, t.max_bounce_angle);
                    entity.pos.y = paddle.top() - entity.half.y;
                    events.push(GameEvent::AvatarBounce {
                        pos: entity.pos,
                        offset,
                    });
                }
                Role::Pickup(kind) => {
                    entity.alive = false;
                    collected.push(kind);
                    events.push(GameEvent::PickupCollected {
                        kind,
                        pos: entity.pos,
                    });
                }
                _ => {}
            }
        }

        state.events.extend(events);
        for kind in collected {
            self.apply_pickup(state, kind);
        }
    }

    fn resolve_outcomes(&mut self, state: &mut SimState, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::ObstacleDestroyed { pos, .. } => {
                    if state.rng.random_bool(self.tuning.pickup_chance.clamp(0.0, 1.0)) {
                        let index = state.rng.random_range(0..PickupKind::ALL.len());
                        let kind = PickupKind::ALL[index];
                        state.entities.spawn(
                            pos,
                            Vec2::new(0.0, self.tuning.pickup_fall_speed),
                            Vec2::splat(self.tuning.pickup_size),
                            Role::Pickup(kind),
                        );
                        state.push_event(GameEvent::PickupSpawned { kind, pos });
                    }
                }
                GameEvent::Lost {
                    kind: MoverKind::Ball,
                    ..
                } => {
                    if state.entities.count_movers(MoverKind::Ball) > 0 {
                        continue;
                    }
                    state.lose_life();
                    log::debug!("Last ball lost, {} lives left", state.lives);
                    if state.lives > 0 {
                        self.widen_ticks = 0;
                        self.slow_ticks = 0;
                        self.set_paddle_width(state, 1.0);
                        self.spawn_attached_ball(state);
                    }
                }
                _ => {}
            }
        }
    }

    fn is_cleared(&self, state: &SimState) -> bool {
        state.entities.count_obstacles(ObstacleKind::Brick) == 0
    }

    fn regenerate(&mut self, state: &mut SimState) {
        state
            .entities
            .kill_where(|e| e.mover().is_some() || e.pickup().is_some());
        self.build_layout(state, state.level());
        self.spawn_attached_ball(state);
    }

    fn classify(&self, event: &GameEvent, _state: &SimState) -> Verdict {
        match *event {
            GameEvent::ObstacleDestroyed { tier, .. } => Verdict::Qualifying {
                points: self.points_for_tier(tier),
            },
            GameEvent::ObstacleHit { .. } => Verdict::Neutral {
                points: self.tuning.damage_points,
            },
            GameEvent::PickupCollected { .. } => Verdict::Neutral {
                points: self.tuning.pickup_points,
            },
            GameEvent::Cleared { level } => Verdict::Neutral {
                points: self
                    .tuning
                    .clear_bonus
                    .saturating_mul(level.saturating_sub(1).max(1) as u64),
            },
            GameEvent::AvatarBounce { .. }
            | GameEvent::Lost {
                kind: MoverKind::Ball,
                ..
            } => Verdict::Disqualifying,
            _ => Verdict::Ignore,
        }
    }

    fn is_terminal(&self, state: &SimState) -> bool {
        state.lives == 0
    }
}
