//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Interpolate color from a normalized speed (slow=blue, medium=green, fast=red/orange)
pub fn speed_color(t: f32, alpha: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);

    // Blue -> cyan -> green -> yellow -> orange -> red
    let (r, g, b) = if t < 0.25 {
        let u = t / 0.25;
        (0.2, 0.4 + 0.4 * u, 1.0)
    } else if t < 0.5 {
        let u = (t - 0.25) / 0.25;
        (0.2, 0.8, 1.0 - 0.6 * u)
    } else if t < 0.75 {
        let u = (t - 0.5) / 0.25;
        (0.2 + 0.8 * u, 0.8, 0.4 - 0.2 * u)
    } else {
        let u = (t - 0.75) / 0.25;
        (1.0, 0.8 - 0.5 * u, 0.2)
    };

    [r, g, b, alpha]
}

/// Axis-aligned rectangle as two triangles
pub fn quad(center: Vec2, half: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    let (min, max) = (center - half, center + half);
    [
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_covers_box() {
        let v = quad(Vec2::new(10.0, 20.0), Vec2::new(2.0, 3.0), [1.0; 4]);
        assert_eq!(v[0].position, [8.0, 17.0]);
        assert_eq!(v[5].position, [12.0, 23.0]);
    }

    #[test]
    fn test_circle_vertex_count() {
        assert_eq!(circle(Vec2::ZERO, 5.0, [1.0; 4], 12).len(), 36);
        assert_eq!(circle(Vec2::ZERO, 5.0, [1.0; 4], 0).len(), 9);
    }

    #[test]
    fn test_speed_color_endpoints() {
        assert_eq!(speed_color(0.0, 1.0), [0.2, 0.4, 1.0, 1.0]);
        assert_eq!(speed_color(5.0, 0.5)[3], 0.5);
    }
}
