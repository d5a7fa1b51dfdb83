//! 2D geometry primitives
//!
//! Vectors are `glam::DVec2`. Arithmetic (add, sub, scale, negate) comes from
//! glam's operators; this module adds the handful of helpers the collision
//! code needs on top of that.

use glam::DVec2;

/// Position/direction type used throughout the simulation
pub type Vector2D = DVec2;

/// Euclidean length
#[inline]
pub fn magnitude(v: Vector2D) -> f64 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Scale `v` to unit length.
///
/// The caller must never pass a zero vector: every direction the simulation
/// assigns is non-zero.
#[inline]
pub fn normalize(v: Vector2D) -> Vector2D {
    let len = magnitude(v);
    debug_assert!(len > 0.0, "normalize called on a zero-length vector");
    v / len
}

/// Orientation of an ordered point triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Orientation of the triple (p, q, r)
pub fn orientation(p: Vector2D, q: Vector2D, r: Vector2D) -> Orientation {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val == 0.0 {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Given collinear p, q, r: does q lie within the bounding box of segment pr?
#[inline]
pub fn on_segment(p: Vector2D, q: Vector2D, r: Vector2D) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Whether segment p1q1 intersects segment p2q2 (endpoints included)
pub fn segments_intersect(p1: Vector2D, q1: Vector2D, p2: Vector2D, q2: Vector2D) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    // Collinear cases: an endpoint lying on the other segment
    (o1 == Orientation::Collinear && on_segment(p1, p2, q1))
        || (o2 == Orientation::Collinear && on_segment(p1, q2, q1))
        || (o3 == Orientation::Collinear && on_segment(p2, p1, q2))
        || (o4 == Orientation::Collinear && on_segment(p2, q1, q2))
}
