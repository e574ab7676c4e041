//! Demo player
//!
//! Looks at the state the way a player looks at the screen and answers with
//! ordinary device events, so everything it does goes through `InputAdapter`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::SIM_DT;
use crate::games::GameKind;
use crate::input::{InputEvent, Key, ShotKind};
use crate::sim::{Entity, MoverKind, MoverState, ObstacleKind, SimState};

pub struct Autopilot {
    kind: GameKind,
    rng: Pcg32,
    /// Max aim error in board units
    jitter: f32,
    last_swung: Option<u32>,
}

impl Autopilot {
    pub fn new(kind: GameKind, seed: u64) -> Self {
        Self {
            kind,
            rng: Pcg32::seed_from_u64(seed),
            jitter: 12.0,
            last_swung: None,
        }
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    /// Device events for the coming frame
    pub fn events(&mut self, state: &SimState) -> Vec<InputEvent> {
        match self.kind {
            GameKind::BrickBreaker => self.brick_breaker(state),
            GameKind::SpaceInvaders => self.space_invaders(state),
            GameKind::Cricket => self.cricket(state),
        }
    }

    fn brick_breaker(&mut self, state: &SimState) -> Vec<InputEvent> {
        let balls = || {
            state
                .entities
                .alive()
                .filter(|e| e.is_live_mover(MoverKind::Ball))
        };
        let mut events = Vec::new();

        // Track the lowest incoming ball
        let incoming = balls()
            .filter(|e| e.vel.y > 0.0)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
        if let Some(ball) = incoming {
            let x = self.aim(ball.pos.x);
            events.push(self.pointer(state, x));
        }

        if balls().any(|e| e.mover().is_some_and(|m| m.is_attached())) {
            events.extend(press(Key::Action));
        }
        events
    }

    fn space_invaders(&mut self, state: &SimState) -> Vec<InputEvent> {
        let ship_x = state.avatar.pos.x;
        let target = state
            .entities
            .alive()
            .filter(|e| e.obstacle().is_some_and(|o| o.kind == ObstacleKind::Alien))
            .min_by(|a, b| {
                (a.pos.x - ship_x)
                    .abs()
                    .total_cmp(&(b.pos.x - ship_x).abs())
            })
            .map(|e| e.pos.x);

        let mut events = Vec::new();
        if let Some(x) = target {
            let x = self.aim(x);
            events.push(self.pointer(state, x));
        }
        events.extend(press(Key::Action));
        events
    }

    fn cricket(&mut self, state: &SimState) -> Vec<InputEvent> {
        let Some(window) = state
            .entities
            .alive()
            .find(|e| e.obstacle().is_some_and(|o| o.kind == ObstacleKind::TimingWindow))
        else {
            return Vec::new();
        };
        let Some(delivery) = state.entities.alive().find(|e| is_free_delivery(e)) else {
            return Vec::new();
        };

        let x = self.aim(delivery.pos.x);
        let mut events = vec![self.pointer(state, x)];

        // Swing as the ball reaches the middle of the band
        let next_y = delivery.pos.y + delivery.vel.y * SIM_DT;
        if next_y >= window.pos.y && self.last_swung != Some(delivery.id) {
            self.last_swung = Some(delivery.id);
            let shot = match self.rng.random_range(0..10) {
                0..=2 => ShotKind::Defend,
                3..=7 => ShotKind::Drive,
                _ => ShotKind::Loft,
            };
            events.extend(press(Key::Shot(shot)));
        }
        events
    }

    fn aim(&mut self, x: f32) -> f32 {
        if self.jitter == 0.0 {
            return x;
        }
        x + self.rng.random_range(-self.jitter..=self.jitter)
    }

    /// Pointer move on a surface the size of the board
    fn pointer(&self, state: &SimState, x: f32) -> InputEvent {
        let board = state.board;
        InputEvent::PointerMove {
            x: x.clamp(0.0, board.width),
            y: board.height * 0.5,
            surface: Vec2::new(board.width, board.height),
        }
    }
}

fn is_free_delivery(entity: &Entity) -> bool {
    entity
        .mover()
        .is_some_and(|m| m.kind == MoverKind::Delivery && m.state == MoverState::Free)
}

fn press(key: Key) -> [InputEvent; 2] {
    [
        InputEvent::KeyDown { key, repeat: false },
        InputEvent::KeyUp { key },
    ]
}
