//! Triangle block geometry
//!
//! A block triangle is equilateral, defined by its centroid, side length and
//! a rotation in degrees. Vertices are precomputed once at layout time and
//! kept in a fixed winding order (apex, bottom-left, bottom-right before
//! rotation) so collision checks always visit edges in the same sequence.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Rect;
use crate::rotate_point;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Centroid
    pub center: Vec2,
    /// Side length
    pub size: f32,
    /// Rotation about the centroid (degrees)
    pub rotation: f32,
    pub vertices: [Vec2; 3],
}

impl Triangle {
    pub fn equilateral(center: Vec2, size: f32, rotation: f32) -> Self {
        let circumradius = size / 3f32.sqrt();
        let apex = Vec2::new(center.x, center.y - circumradius);
        let left = Vec2::new(center.x - size / 2.0, center.y + circumradius / 2.0);
        let right = Vec2::new(center.x + size / 2.0, center.y + circumradius / 2.0);
        let vertices = [apex, left, right].map(|v| rotate_point(v, center, rotation));
        Self {
            center,
            size,
            rotation,
            vertices,
        }
    }

    /// Edges as (start, end) pairs in winding order
    pub fn edges(&self) -> [(Vec2, Vec2); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    pub fn bounds(&self) -> Rect {
        let min = self.vertices[0].min(self.vertices[1]).min(self.vertices[2]);
        let max = self.vertices[0].max(self.vertices[1]).max(self.vertices[2]);
        Rect {
            min,
            size: max - min,
        }
    }

    /// Point-in-triangle by edge sign agreement (boundary counts as inside)
    pub fn contains_point(&self, p: Vec2) -> bool {
        let sign = |a: Vec2, b: Vec2| (p - b).perp_dot(a - b);
        let [a, b, c] = self.vertices;
        let d1 = sign(a, b);
        let d2 = sign(b, c);
        let d3 = sign(c, a);
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_neg && has_pos)
    }
}
