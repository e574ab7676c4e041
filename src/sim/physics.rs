//! Per-tick physics passes
//!
//! Integration, boundary resolution, the mover-vs-obstacle pass, speed caps and
//! the final bounds clamp. The rules decide policies; these passes apply them.

use glam::Vec2;

use super::collision::{self, BoundaryHit};
use super::entity::Role;
use super::state::{GameEvent, SimState};
use crate::games::{GameRules, ObstacleResponse};

/// Advance every free mover and pickup by its velocity
pub fn integrate(state: &mut SimState, dt: f32) {
    for entity in state.entities.iter_mut() {
        if !entity.alive {
            continue;
        }
        match entity.role {
            Role::Mover(mover) if !mover.is_attached() => entity.pos += entity.vel * dt,
            Role::Pickup(_) => entity.pos += entity.vel * dt,
            _ => {}
        }
    }
}

/// Apply edge rules; lost movers emit exactly one `Lost` event and die
pub fn resolve_boundaries(state: &mut SimState, rules: &dyn GameRules) {
    let board = state.board;
    let mut events = Vec::new();
    for entity in state.entities.iter_mut() {
        if !entity.alive || entity.is_particle() {
            continue;
        }
        if entity.mover().is_some_and(|m| m.is_attached()) {
            continue;
        }
        let Some(policy) = rules.boundary_policy(entity) else {
            continue;
        };
        let kind = entity.mover().map(|m| m.kind);
        let hit = collision::resolve_boundary(
            &mut entity.pos,
            &mut entity.vel,
            entity.half,
            board.width,
            board.height,
            &policy,
        );
        match hit {
            BoundaryHit::Inside => {}
            BoundaryHit::Reflected(_) => events.push(GameEvent::WallBounce { pos: entity.pos }),
            BoundaryHit::Lost(_) => {
                entity.alive = false;
                match kind {
                    Some(kind) => events.push(GameEvent::Lost {
                        id: entity.id,
                        kind,
                        pos: entity.pos,
                    }),
                    None => events.push(GameEvent::Expired {
                        id: entity.id,
                        kind: None,
                        pos: entity.pos,
                    }),
                }
            }
            BoundaryHit::Expired(_) => {
                entity.alive = false;
                events.push(GameEvent::Expired {
                    id: entity.id,
                    kind,
                    pos: entity.pos,
                });
            }
        }
    }
    state.events.extend(events);
}

/// Mover-vs-obstacle pass
///
/// Each mover is tested against the alive obstacles in arena order and stops at
/// its first contact, so one mover damages at most one obstacle per tick and an
/// obstacle is never double-counted by the same mover.
pub fn resolve_obstacles(state: &mut SimState, rules: &dyn GameRules) {
    let mut events = Vec::new();
    let count = state.entities.len();
    let entities = state.entities.as_mut_slice();

    for i in 0..count {
        let (mover, mover_box, pos, vel, half) = {
            let e = &entities[i];
            let Some(mover) = e.mover() else {
                continue;
            };
            if !e.alive || mover.is_attached() {
                continue;
            }
            (*mover, e.aabb(), e.pos, e.vel, e.half)
        };

        let mut hit = None;
        for (j, other) in entities.iter_mut().enumerate() {
            if j == i || !other.alive {
                continue;
            }
            let target_box = other.aabb();
            let (id, target_pos) = (other.id, other.pos);
            let Role::Obstacle(ref mut obstacle) = other.role else {
                continue;
            };
            let Some(response) = rules.obstacle_response(&mover, obstacle) else {
                continue;
            };
            let Some(contact) = collision::aabb_contact(&mover_box, &target_box) else {
                continue;
            };

            let mut destroyed = false;
            if !obstacle.indestructible {
                obstacle.hits = obstacle.hits.saturating_sub(1);
                destroyed = obstacle.hits == 0;
            }
            if destroyed {
                other.alive = false;
                events.push(GameEvent::ObstacleDestroyed {
                    id,
                    tier: obstacle.tier,
                    pos: target_pos,
                });
            } else {
                events.push(GameEvent::ObstacleHit {
                    id,
                    pos: target_pos,
                });
            }
            hit = Some((response, contact, target_box));
            break;
        }

        if let Some((response, contact, target_box)) = hit {
            let e = &mut entities[i];
            match response {
                ObstacleResponse::Bounce => {
                    e.vel = collision::bounce(vel, &contact);
                    e.pos = collision::separate(pos, half, &target_box, contact.axis);
                }
                ObstacleResponse::Vanish => e.alive = false,
            }
        }
    }
    state.events.extend(events);
}

/// Rescale mover velocities to the rules' caps
pub fn cap_speeds(state: &mut SimState, rules: &dyn GameRules) {
    let difficulty = state.progression.difficulty();
    for entity in state.entities.iter_mut() {
        if !entity.alive {
            continue;
        }
        let Some(mover) = entity.mover() else {
            continue;
        };
        if let Some(cap) = rules.speed_cap(mover, difficulty) {
            entity.vel = collision::cap_speed(entity.vel, cap);
        }
    }
}

/// Clamp every alive entity and the avatar inside the board
pub fn enforce_bounds(state: &mut SimState) {
    let board = state.board;
    for entity in state.entities.iter_mut() {
        if entity.alive {
            entity.pos = board.clamp(entity.pos);
        }
    }
    let avatar = &mut state.avatar;
    avatar.pos = board.clamp(avatar.pos);
    if !avatar.pos.is_finite() {
        avatar.pos = Vec2::new(board.width * 0.5, board.height);
    }
}
