//! Collision detection and response
//!
//! Pure geometry: circle vs axis-aligned rectangle, circle vs triangle, the
//! field walls, and the paddle bounce. Nothing here touches score or lives.

use glam::Vec2;

use super::state::{BlockShape, Paddle, Rect};
use super::triangle::Triangle;
use crate::config::{BallConfig, BounceConfig};
use crate::consts::*;
use crate::{clamp_speed, with_speed};

/// Which face of a rectangle the ball struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSide {
    /// Left or right face: horizontal velocity flips
    Horizontal,
    /// Top or bottom face: vertical velocity flips
    Vertical,
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the shape (if hit)
    pub point: Vec2,
    /// Unit surface normal pointing toward the ball center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Closest point of `rect` to `p`
#[inline]
fn closest_point_on_rect(p: Vec2, rect: &Rect) -> Vec2 {
    p.clamp(rect.min, rect.max())
}

/// Circle overlaps rectangle (clamped closest-point distance test)
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = closest_point_on_rect(center, rect);
    center.distance_squared(closest) <= radius * radius
}

/// Classify a circle/rectangle contact as horizontal or vertical.
///
/// The axis with the larger distance from the clamped closest point wins.
/// When the center lies inside the rectangle's span on both axes (or the
/// distances tie), the axis with the smaller penetration is chosen.
pub fn contact_side(center: Vec2, radius: f32, rect: &Rect) -> ContactSide {
    let d = (center - closest_point_on_rect(center, rect)).abs();
    if d.x > d.y {
        return ContactSide::Horizontal;
    }
    if d.y > d.x {
        return ContactSide::Vertical;
    }
    let pen = penetration(center, radius, rect);
    if pen.x < pen.y {
        ContactSide::Horizontal
    } else {
        ContactSide::Vertical
    }
}

/// Per-axis overlap between the circle's bounding box and the rectangle
fn penetration(center: Vec2, radius: f32, rect: &Rect) -> Vec2 {
    let offset = (center - rect.center()).abs();
    (rect.size / 2.0 + Vec2::splat(radius) - offset).max(Vec2::ZERO)
}

/// Full circle vs rectangle check with an axis-aligned contact normal
pub fn ball_rect_collision(center: Vec2, radius: f32, rect: &Rect) -> CollisionResult {
    if !circle_rect_overlap(center, radius, rect) {
        return CollisionResult::miss();
    }

    let to_center = center - rect.center();
    let pen = penetration(center, radius, rect);
    let (normal, depth) = match contact_side(center, radius, rect) {
        ContactSide::Horizontal => (Vec2::new(sign_or_one(to_center.x), 0.0), pen.x),
        ContactSide::Vertical => (Vec2::new(0.0, sign_or_one(to_center.y)), pen.y),
    };

    CollisionResult {
        hit: true,
        point: closest_point_on_rect(center, rect),
        normal,
        penetration: depth,
    }
}

#[inline]
fn sign_or_one(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

/// Circle vs triangle.
///
/// Edges are tested in winding order by projecting the center onto each edge
/// (parameter clamped to [0, 1]). A projection clamped to an endpoint is a
/// corner contact and uses the direction from the vertex to the center as
/// its normal; otherwise the outward edge perpendicular is used. The first
/// hit wins. A center buried inside the triangle falls back to the nearest
/// edge.
pub fn ball_triangle_collision(center: Vec2, radius: f32, tri: &Triangle) -> CollisionResult {
    let mut nearest: Option<(f32, Vec2, Vec2)> = None;

    for (a, b) in tri.edges() {
        let edge = b - a;
        let len_sq = edge.length_squared();
        if len_sq < f32::EPSILON {
            continue; // Degenerate edge
        }

        let t_raw = (center - a).dot(edge) / len_sq;
        let t = t_raw.clamp(0.0, 1.0);
        let closest = a + edge * t;
        let dist = center.distance(closest);
        let outward = outward_normal(a, b, tri.center);

        if dist <= radius {
            let corner = t_raw <= 0.0 || t_raw >= 1.0;
            let normal = if corner {
                (center - closest).normalize_or(outward)
            } else {
                outward
            };
            return CollisionResult {
                hit: true,
                point: closest,
                normal,
                penetration: radius - dist,
            };
        }

        if nearest.is_none_or(|(d, _, _)| dist < d) {
            nearest = Some((dist, closest, outward));
        }
    }

    // Corner fallback for vertices not covered by a non-degenerate edge
    for vertex in tri.vertices {
        let dist = center.distance(vertex);
        if dist <= radius {
            return CollisionResult {
                hit: true,
                point: vertex,
                normal: (center - vertex).normalize_or(Vec2::NEG_Y),
                penetration: radius - dist,
            };
        }
    }

    if tri.contains_point(center) {
        if let Some((dist, point, normal)) = nearest {
            return CollisionResult {
                hit: true,
                point,
                normal,
                penetration: radius + dist,
            };
        }
    }

    CollisionResult::miss()
}

/// Unit perpendicular of edge (a, b) pointing away from `centroid`
fn outward_normal(a: Vec2, b: Vec2, centroid: Vec2) -> Vec2 {
    let perp = (b - a).perp().normalize_or_zero();
    let mid = (a + b) / 2.0;
    if perp.dot(mid - centroid) < 0.0 { -perp } else { perp }
}

/// Dispatch on block shape
pub fn ball_block_collision(center: Vec2, radius: f32, shape: &BlockShape) -> CollisionResult {
    match shape {
        BlockShape::Rect(rect) => ball_rect_collision(center, radius, rect),
        BlockShape::Triangle(tri) => {
            // Cheap reject before the per-edge test
            if !circle_rect_overlap(center, radius, &tri.bounds()) {
                return CollisionResult::miss();
            }
            ball_triangle_collision(center, radius, tri)
        }
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Apply a contact to the ball: push it out along the normal and reflect
/// the velocity if it is still heading into the surface.
///
/// For axis-aligned normals the reflection is exactly a sign flip of the
/// matching velocity component.
pub fn resolve_contact(pos: &mut Vec2, vel: &mut Vec2, contact: &CollisionResult) {
    *pos += contact.normal * contact.penetration;
    if vel.dot(contact.normal) < 0.0 {
        *vel = reflect_velocity(*vel, contact.normal);
    }
}

/// Keep the ball inside the left, right and top walls.
///
/// Horizontal velocity is forced away from a side wall whenever the ball's
/// leading edge reaches it; vertical velocity is forced downward at the top.
/// The bottom is open. Returns true if any wall was touched.
pub fn reflect_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32) -> bool {
    let mut hit = false;

    if pos.x - radius <= FIELD_MIN {
        pos.x = FIELD_MIN + radius;
        vel.x = vel.x.abs();
        hit = true;
    } else if pos.x + radius >= FIELD_MAX {
        pos.x = FIELD_MAX - radius;
        vel.x = -vel.x.abs();
        hit = true;
    }

    if pos.y - radius <= FIELD_MIN {
        pos.y = FIELD_MIN + radius;
        vel.y = vel.y.abs();
        hit = true;
    }

    hit
}

/// Ball velocity after striking the paddle.
///
/// The offset from the paddle center, normalized by half its width, maps to
/// an angle within ±`max_angle_deg` of vertical at the incoming speed. A
/// fraction of the paddle's horizontal velocity is added, and a paddle
/// moving upward adds a uniform speed boost. A ball arriving with no speed
/// leaves at the nominal speed instead.
pub fn paddle_bounce(
    ball_pos: Vec2,
    ball_vel: Vec2,
    paddle: &Paddle,
    bounce: &BounceConfig,
    ball: &BallConfig,
) -> Vec2 {
    let offset = ((ball_pos.x - paddle.pos.x) / paddle.half_width()).clamp(-1.0, 1.0);
    let angle = offset * bounce.max_angle_deg.to_radians();

    let mut speed = ball_vel.length();
    if speed < SPEED_EPSILON {
        speed = ball.speed;
    }

    let (sin, cos) = angle.sin_cos();
    let mut vel = Vec2::new(speed * sin, -speed * cos);
    vel.x += paddle.vel.x * bounce.paddle_velocity_blend;

    if paddle.vel.y < 0.0 {
        let boost = paddle.vel.y.abs() * bounce.jump_boost_factor;
        let current = vel.length();
        vel = with_speed(vel, current + boost, Vec2::new(0.0, -(speed + boost)));
    }

    clamp_speed(vel, ball.max_speed)
}

/// Speed the ball up by `increment`, keeping its direction.
/// A stationary ball is left alone.
pub fn speed_up(vel: Vec2, increment: f32, max_speed: f32) -> Vec2 {
    let current = vel.length();
    if current < SPEED_EPSILON {
        return vel;
    }
    clamp_speed(vel * ((current + increment) / current), max_speed)
}
