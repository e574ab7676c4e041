//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position (board units) and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Byte stride of one vertex in a buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Colors for game elements
pub mod colors {
    pub const AVATAR: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const BALL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BULLET: [f32; 4] = [0.9, 0.95, 1.0, 1.0];
    pub const BOMB: [f32; 4] = [1.0, 0.35, 0.2, 1.0];
    pub const DELIVERY: [f32; 4] = [0.85, 0.1, 0.1, 1.0];
    pub const TIMING_WINDOW: [f32; 4] = [1.0, 1.0, 1.0, 0.12];

    /// Brick tiers 1..=3
    pub const BRICK_TIERS: [[f32; 4]; 3] = [
        [0.4, 0.7, 1.0, 1.0],
        [0.7, 0.7, 0.8, 1.0],
        [0.9, 0.85, 0.3, 1.0],
    ];

    /// Alien tiers 1..=3
    pub const ALIEN_TIERS: [[f32; 4]; 3] = [
        [0.3, 1.0, 0.4, 1.0],
        [0.3, 0.8, 1.0, 1.0],
        [0.9, 0.4, 1.0, 1.0],
    ];

    pub const PICKUP_MULTIBALL: [f32; 4] = [1.0, 0.6, 0.1, 1.0];
    pub const PICKUP_WIDEN: [f32; 4] = [0.2, 0.9, 0.9, 1.0];
    pub const PICKUP_SLOW: [f32; 4] = [0.5, 0.5, 1.0, 1.0];
    pub const PICKUP_LIFE: [f32; 4] = [1.0, 0.3, 0.5, 1.0];

    pub const SPARK: [f32; 4] = [1.0, 0.95, 0.7, 1.0];
    pub const STRIKE: [f32; 4] = [1.0, 0.3, 0.1, 1.0];
    pub const BOUNDARY: [f32; 4] = [1.0, 0.85, 0.2, 1.0];
    pub const WICKET: [f32; 4] = [0.9, 0.1, 0.1, 1.0];
    pub const CLEAR: [f32; 4] = [0.6, 0.9, 1.0, 1.0];
}

/// Particle palette index -> color; small indices are obstacle tiers
pub fn particle_color(index: u32) -> [f32; 4] {
    use crate::sim::particles::palette;
    match index {
        palette::SPARK => colors::SPARK,
        palette::STRIKE => colors::STRIKE,
        palette::BOUNDARY => colors::BOUNDARY,
        palette::WICKET => colors::WICKET,
        palette::CLEAR => colors::CLEAR,
        tier => {
            let i = (tier.max(1) as usize - 1).min(colors::BRICK_TIERS.len() - 1);
            colors::BRICK_TIERS[i]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_plain_bytes() {
        let vertices = [Vertex::new(1.0, 2.0, colors::BALL); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 3 * Vertex::STRIDE);
        assert_eq!(Vertex::STRIDE, 24);
    }

    #[test]
    fn test_particle_palette() {
        use crate::sim::particles::palette;
        assert_eq!(particle_color(palette::WICKET), colors::WICKET);
        assert_eq!(particle_color(0), colors::BRICK_TIERS[0]);
        assert_eq!(particle_color(3), colors::BRICK_TIERS[2]);
    }
}
