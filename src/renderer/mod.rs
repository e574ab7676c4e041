//! Rendering contract
//!
//! `build_frame` turns a `SimState` into a flat triangle list in board space
//! plus the HUD values. It reads the state and never mutates it; the host
//! uploads `Frame::vertices` with `bytemuck::cast_slice`.

pub mod screen;
pub mod shapes;
pub mod vertex;

pub use screen::{Hud, LeaderboardSlot, Screen};
pub use vertex::Vertex;

use crate::sim::{Entity, MoverKind, ObstacleKind, PickupKind, Role, SimState};
use vertex::colors;

/// Speed that maps to the hottest ball color
const SPEED_REFERENCE: f32 = 600.0;

const CIRCLE_SEGMENTS: u32 = 16;

/// One frame's draw data
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub vertices: Vec<Vertex>,
    pub hud: Hud,
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Build the draw list: obstacles, pickups, movers, avatar, then particles on top
pub fn build_frame(state: &SimState) -> Frame {
    let mut vertices = Vec::with_capacity(state.entities.len() * 6 + 6);

    for entity in state.entities.alive() {
        if let Role::Obstacle(obstacle) = &entity.role {
            let color = match obstacle.kind {
                ObstacleKind::Brick => tier_color(&colors::BRICK_TIERS, obstacle.tier),
                ObstacleKind::Alien => tier_color(&colors::ALIEN_TIERS, obstacle.tier),
                ObstacleKind::TimingWindow => colors::TIMING_WINDOW,
            };
            vertices.extend_from_slice(&shapes::quad(entity.pos, entity.half, color));
        }
    }

    for entity in state.entities.alive() {
        if let Some(kind) = entity.pickup() {
            let color = match kind {
                PickupKind::MultiBall => colors::PICKUP_MULTIBALL,
                PickupKind::WidenPaddle => colors::PICKUP_WIDEN,
                PickupKind::Slow => colors::PICKUP_SLOW,
                PickupKind::ExtraLife => colors::PICKUP_LIFE,
            };
            vertices.extend_from_slice(&shapes::quad(entity.pos, entity.half, color));
        }
    }

    for entity in state.entities.alive() {
        if let Some(mover) = entity.mover() {
            push_mover(&mut vertices, entity, mover.kind);
        }
    }

    let avatar = &state.avatar;
    vertices.extend_from_slice(&shapes::quad(avatar.pos, avatar.half, colors::AVATAR));

    for entity in state.entities.alive() {
        if let Role::Particle(particle) = &entity.role {
            let mut color = vertex::particle_color(particle.color);
            color[3] *= particle.life();
            let half = glam::Vec2::splat(particle.size * 0.5);
            vertices.extend_from_slice(&shapes::quad(entity.pos, half, color));
        }
    }

    Frame {
        vertices,
        hud: Hud::from_state(state),
    }
}

fn push_mover(vertices: &mut Vec<Vertex>, entity: &Entity, kind: MoverKind) {
    match kind {
        MoverKind::Ball => {
            let t = entity.vel.length() / SPEED_REFERENCE;
            let color = if entity.vel == glam::Vec2::ZERO {
                colors::BALL
            } else {
                shapes::speed_color(t, 1.0)
            };
            vertices.extend(shapes::circle(entity.pos, entity.half.x, color, CIRCLE_SEGMENTS));
        }
        MoverKind::Delivery => {
            vertices.extend(shapes::circle(
                entity.pos,
                entity.half.x,
                colors::DELIVERY,
                CIRCLE_SEGMENTS,
            ));
        }
        MoverKind::Bullet => {
            vertices.extend_from_slice(&shapes::quad(entity.pos, entity.half, colors::BULLET))
        }
        MoverKind::Bomb => {
            vertices.extend_from_slice(&shapes::quad(entity.pos, entity.half, colors::BOMB))
        }
    }
}

fn tier_color(palette: &[[f32; 4]], tier: u8) -> [f32; 4] {
    let i = (tier.max(1) as usize - 1).min(palette.len() - 1);
    palette[i]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::GameKind;
    use crate::sim::{EmitterConfig, Simulation};
    use crate::tuning::Tuning;

    #[test]
    fn test_frame_is_pure() {
        let mut sim = Simulation::new(
            GameKind::BrickBreaker,
            Tuning::default(),
            EmitterConfig::default(),
            5,
        );
        sim.start(5);
        let before = sim.state.entities.as_slice().to_vec();
        let a = build_frame(&sim.state);
        let b = build_frame(&sim.state);
        assert_eq!(a, b);
        assert_eq!(sim.state.entities.as_slice(), before.as_slice());
    }

    #[test]
    fn test_frame_covers_every_brick() {
        let mut sim = Simulation::new(
            GameKind::BrickBreaker,
            Tuning::default(),
            EmitterConfig::default(),
            5,
        );
        sim.start(5);
        let bricks = sim.state.entities.count_obstacles(ObstacleKind::Brick);
        let frame = build_frame(&sim.state);
        // bricks + paddle quads + one ball circle
        let expected = bricks * 6 + 6 + CIRCLE_SEGMENTS as usize * 3;
        assert_eq!(frame.vertices.len(), expected);
        assert_eq!(frame.as_bytes().len(), expected * Vertex::STRIDE);
        assert_eq!(frame.hud.lives, 3);
    }

    #[test]
    fn test_tier_color_saturates() {
        assert_eq!(tier_color(&colors::ALIEN_TIERS, 0), colors::ALIEN_TIERS[0]);
        assert_eq!(tier_color(&colors::ALIEN_TIERS, 9), colors::ALIEN_TIERS[2]);
    }
}
