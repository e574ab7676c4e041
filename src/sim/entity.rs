//! Entity arena
//!
//! Every simulated object is an `Entity` with a role-tagged payload, stored in a
//! flat `Vec` and addressed by index within a tick. Destruction only clears the
//! `alive` flag; `EntityStore::compact` drops dead entries at the end of the tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;

/// What kind of projectile a mover is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoverKind {
    /// Brick breaker ball
    Ball,
    /// Player shot (space invaders)
    Bullet,
    /// Alien shot
    Bomb,
    /// Cricket ball bowled at the batsman
    Delivery,
}

/// Mover lifecycle within a turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoverState {
    Free,
    /// Riding on the avatar at a horizontal offset, waiting for launch
    Attached { offset: f32 },
    /// Already played by the batsman
    Struck,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub kind: MoverKind,
    pub state: MoverState,
}

impl Mover {
    pub fn free(kind: MoverKind) -> Self {
        Self {
            kind,
            state: MoverState::Free,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, MoverState::Attached { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Brick,
    Alien,
    /// Cricket bat timing band (never destroyed)
    TimingWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Point/colour tier, 1-based
    pub tier: u8,
    /// Remaining hits before destruction
    pub hits: u8,
    /// Cannot be damaged and does not count toward clearing
    pub indestructible: bool,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, tier: u8, hits: u8) -> Self {
        Self {
            kind,
            tier,
            hits: hits.max(1),
            indestructible: false,
        }
    }

    pub fn indestructible(kind: ObstacleKind) -> Self {
        Self {
            kind,
            tier: 0,
            hits: u8::MAX,
            indestructible: true,
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    MultiBall,
    WidenPaddle,
    Slow,
    ExtraLife,
}

impl PickupKind {
    pub const ALL: [PickupKind; 4] = [
        PickupKind::MultiBall,
        PickupKind::WidenPaddle,
        PickupKind::Slow,
        PickupKind::ExtraLife,
    ];
}

/// A visual-only particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Ticks left to live
    pub ttl: u32,
    pub max_ttl: u32,
    /// Palette index for the renderer
    pub color: u32,
    pub size: f32,
}

impl Particle {
    /// Remaining life in 0..=1
    pub fn life(&self) -> f32 {
        if self.max_ttl == 0 {
            0.0
        } else {
            self.ttl as f32 / self.max_ttl as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Mover(Mover),
    Obstacle(Obstacle),
    Pickup(PickupKind),
    Particle(Particle),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Half extents of the bounding box
    pub half: Vec2,
    pub alive: bool,
    pub role: Role,
}

impl Entity {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.half)
    }

    pub fn mover(&self) -> Option<&Mover> {
        match &self.role {
            Role::Mover(m) => Some(m),
            _ => None,
        }
    }

    pub fn mover_mut(&mut self) -> Option<&mut Mover> {
        match &mut self.role {
            Role::Mover(m) => Some(m),
            _ => None,
        }
    }

    pub fn obstacle(&self) -> Option<&Obstacle> {
        match &self.role {
            Role::Obstacle(o) => Some(o),
            _ => None,
        }
    }

    pub fn pickup(&self) -> Option<PickupKind> {
        match self.role {
            Role::Pickup(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_particle(&self) -> bool {
        matches!(self.role, Role::Particle(_))
    }

    /// Alive mover of the given kind
    pub fn is_live_mover(&self, kind: MoverKind) -> bool {
        self.alive && self.mover().is_some_and(|m| m.kind == kind)
    }
}

/// Flat arena of the session's entities
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(128),
            next_id: 1,
        }
    }

    /// Spawn an alive entity and return its id
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, half: Vec2, role: Role) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.entities.push(Entity {
            id,
            pos,
            vel,
            half,
            alive: true,
            role,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    pub fn find(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Alive movers of a kind (free, attached or struck)
    pub fn count_movers(&self, kind: MoverKind) -> usize {
        self.entities.iter().filter(|e| e.is_live_mover(kind)).count()
    }

    /// Alive obstacles of a kind
    pub fn count_obstacles(&self, kind: ObstacleKind) -> usize {
        self.entities
            .iter()
            .filter(|e| e.alive && e.obstacle().is_some_and(|o| o.kind == kind))
            .count()
    }

    /// Alive obstacles that must be destroyed to clear the layout
    pub fn clearable_remaining(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.alive && e.obstacle().is_some_and(|o| !o.indestructible))
            .count()
    }

    pub fn particle_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.alive && e.is_particle())
            .count()
    }

    /// Mark every entity matching `pred` as dead
    pub fn kill_where<F: FnMut(&Entity) -> bool>(&mut self, mut pred: F) {
        for entity in &mut self.entities {
            if entity.alive && pred(entity) {
                entity.alive = false;
            }
        }
    }

    /// Drop dead entities, preserving the order of the survivors
    pub fn compact(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.alive);
        before - self.entities.len()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brick() -> Role {
        Role::Obstacle(Obstacle::new(ObstacleKind::Brick, 1, 1))
    }

    #[test]
    fn test_spawn_allocates_increasing_ids() {
        let mut store = EntityStore::new();
        let a = store.spawn(Vec2::ZERO, Vec2::ZERO, Vec2::ONE, brick());
        let b = store.spawn(Vec2::ZERO, Vec2::ZERO, Vec2::ONE, brick());
        assert!(b > a);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_compact_removes_dead_keeps_order() {
        let mut store = EntityStore::new();
        let ids: Vec<u32> = (0..5)
            .map(|i| store.spawn(Vec2::new(i as f32, 0.0), Vec2::ZERO, Vec2::ONE, brick()))
            .collect();
        store.kill_where(|e| e.id == ids[1] || e.id == ids[3]);
        assert_eq!(store.compact(), 2);
        let left: Vec<u32> = store.iter().map(|e| e.id).collect();
        assert_eq!(left, vec![ids[0], ids[2], ids[4]]);
    }

    #[test]
    fn test_clearable_ignores_indestructible_and_dead() {
        let mut store = EntityStore::new();
        store.spawn(Vec2::ZERO, Vec2::ZERO, Vec2::ONE, brick());
        let dead = store.spawn(Vec2::ZERO, Vec2::ZERO, Vec2::ONE, brick());
        store.spawn(
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::ONE,
            Role::Obstacle(Obstacle::indestructible(ObstacleKind::TimingWindow)),
        );
        store.kill_where(|e| e.id == dead);
        assert_eq!(store.clearable_remaining(), 1);
        assert_eq!(store.count_obstacles(ObstacleKind::TimingWindow), 1);
    }

    #[test]
    fn test_obstacle_has_at_least_one_hit() {
        assert_eq!(Obstacle::new(ObstacleKind::Brick, 1, 0).hits, 1);
    }
}
