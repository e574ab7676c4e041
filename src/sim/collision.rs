//! Collision detection and response for axis-aligned boxes
//!
//! Everything on the board is an AABB. Contacts are discrete (overlap after the
//! move), not swept: a fast mover can tunnel through a thin obstacle in one tick.
//! Reflection picks the axis with the smaller penetration depth and prefers the
//! vertical axis on a tie.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::direction_from_vertical;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Axis along which a contact is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Result of an overlap test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Axis to reflect
    pub axis: Axis,
    /// Penetration depth on each axis
    pub penetration: Vec2,
}

/// Overlap test between a mover box and a target box
///
/// Returns the contact with the axis of smaller penetration; ties resolve
/// to the vertical axis.
pub fn aabb_contact(mover: &Aabb, target: &Aabb) -> Option<Contact> {
    if !mover.overlaps(target) {
        return None;
    }
    let pen_x = (mover.max.x - target.min.x).min(target.max.x - mover.min.x);
    let pen_y = (mover.max.y - target.min.y).min(target.max.y - mover.min.y);
    let axis = if pen_x < pen_y {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };
    Some(Contact {
        axis,
        penetration: Vec2::new(pen_x, pen_y),
    })
}

/// Flip the velocity component of the contact axis
#[inline]
pub fn reflect_axis(velocity: Vec2, axis: Axis) -> Vec2 {
    match axis {
        Axis::Horizontal => Vec2::new(-velocity.x, velocity.y),
        Axis::Vertical => Vec2::new(velocity.x, -velocity.y),
    }
}

/// Push a mover out of the target along the contact axis
pub fn separate(pos: Vec2, half: Vec2, target: &Aabb, axis: Axis) -> Vec2 {
    let center = target.center();
    match axis {
        Axis::Horizontal => {
            let x = if pos.x < center.x {
                target.min.x - half.x
            } else {
                target.max.x + half.x
            };
            Vec2::new(x, pos.y)
        }
        Axis::Vertical => {
            let y = if pos.y < center.y {
                target.min.y - half.y
            } else {
                target.max.y + half.y
            };
            Vec2::new(pos.x, y)
        }
    }
}

/// Bounce the velocity off a contact, keeping its magnitude
pub fn bounce(velocity: Vec2, contact: &Contact) -> Vec2 {
    reflect_axis(velocity, contact.axis)
}

/// Rescale velocity so its magnitude does not exceed `max_speed`
#[inline]
pub fn cap_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    if max_speed <= 0.0 {
        return Vec2::ZERO;
    }
    let speed = velocity.length();
    if speed > max_speed {
        velocity * (max_speed / speed)
    } else {
        velocity
    }
}

/// Outgoing paddle velocity from the impact offset
///
/// `offset` is -1 at the left edge, 0 at the centre, +1 at the right edge; the
/// ball leaves at `offset * max_angle` from straight up.
pub fn paddle_deflect(offset: f32, speed: f32, max_angle: f32) -> Vec2 {
    let offset = offset.clamp(-1.0, 1.0);
    direction_from_vertical(offset * max_angle) * speed
}

/// Normalized impact offset of `x` across a paddle centred at `center_x`
pub fn impact_offset(x: f32, center_x: f32, half_width: f32) -> f32 {
    if half_width <= 0.0 {
        return 0.0;
    }
    ((x - center_x) / half_width).clamp(-1.0, 1.0)
}

/// Board edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// What happens when an entity reaches an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeRule {
    /// Flip the velocity component and clamp inside
    Reflect,
    /// Clamp inside, keep velocity
    #[default]
    Clamp,
    /// Leaves the board quietly (bullet off the top)
    Expire,
    /// Leaves the board and counts as lost (ball past the bottom)
    Lose,
}

/// Per-edge rules for one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryPolicy {
    pub left: EdgeRule,
    pub right: EdgeRule,
    pub top: EdgeRule,
    pub bottom: EdgeRule,
}

impl BoundaryPolicy {
    pub const CLAMP: BoundaryPolicy = BoundaryPolicy {
        left: EdgeRule::Clamp,
        right: EdgeRule::Clamp,
        top: EdgeRule::Clamp,
        bottom: EdgeRule::Clamp,
    };

    /// Reflect on three walls, lose past `loss`
    pub fn walls_with_loss(loss: Edge) -> Self {
        let mut policy = BoundaryPolicy {
            left: EdgeRule::Reflect,
            right: EdgeRule::Reflect,
            top: EdgeRule::Reflect,
            bottom: EdgeRule::Reflect,
        };
        policy.set(loss, EdgeRule::Lose);
        policy
    }

    pub fn with(mut self, edge: Edge, rule: EdgeRule) -> Self {
        self.set(edge, rule);
        self
    }

    pub fn set(&mut self, edge: Edge, rule: EdgeRule) {
        match edge {
            Edge::Left => self.left = rule,
            Edge::Right => self.right = rule,
            Edge::Top => self.top = rule,
            Edge::Bottom => self.bottom = rule,
        }
    }

    pub fn rule(&self, edge: Edge) -> EdgeRule {
        match edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }
}

/// Result of a boundary check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryHit {
    Inside,
    Reflected(Edge),
    Expired(Edge),
    Lost(Edge),
}

/// Resolve an entity against the board edges
///
/// Leaving edges (`Lose`/`Expire`) are checked on the entity centre so a lost
/// ball has visibly left; wall edges clamp on the box so it stays fully inside.
/// A leaving edge wins over a reflection in the same tick.
pub fn resolve_boundary(
    pos: &mut Vec2,
    vel: &mut Vec2,
    half: Vec2,
    width: f32,
    height: f32,
    policy: &BoundaryPolicy,
) -> BoundaryHit {
    let crossings = [
        (Edge::Left, pos.x < 0.0),
        (Edge::Right, pos.x > width),
        (Edge::Top, pos.y < 0.0),
        (Edge::Bottom, pos.y > height),
    ];
    for (edge, crossed) in crossings {
        if !crossed {
            continue;
        }
        match policy.rule(edge) {
            EdgeRule::Lose => return BoundaryHit::Lost(edge),
            EdgeRule::Expire => return BoundaryHit::Expired(edge),
            _ => {}
        }
    }

    let mut hit = BoundaryHit::Inside;
    let half = half.min(Vec2::new(width, height) * 0.5);

    if pos.x - half.x < 0.0 && !leaves(policy.left) {
        pos.x = half.x;
        if policy.left == EdgeRule::Reflect {
            vel.x = vel.x.abs();
            hit = BoundaryHit::Reflected(Edge::Left);
        }
    } else if pos.x + half.x > width && !leaves(policy.right) {
        pos.x = width - half.x;
        if policy.right == EdgeRule::Reflect {
            vel.x = -vel.x.abs();
            hit = BoundaryHit::Reflected(Edge::Right);
        }
    }

    if pos.y - half.y < 0.0 && !leaves(policy.top) {
        pos.y = half.y;
        if policy.top == EdgeRule::Reflect {
            vel.y = vel.y.abs();
            hit = BoundaryHit::Reflected(Edge::Top);
        }
    } else if pos.y + half.y > height && !leaves(policy.bottom) {
        pos.y = height - half.y;
        if policy.bottom == EdgeRule::Reflect {
            vel.y = -vel.y.abs();
            hit = BoundaryHit::Reflected(Edge::Bottom);
        }
    }

    hit
}

fn leaves(rule: EdgeRule) -> bool {
    matches!(rule, EdgeRule::Lose | EdgeRule::Expire)
}

/// Clamp a point into the board
#[inline]
pub fn clamp_to_board(pos: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(pos.x.clamp(0.0, width), pos.y.clamp(0.0, height))
}
