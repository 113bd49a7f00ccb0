//! Planar geometry in world units.
//!
//! The world is a flat rectangle `[0, width) × [0, height)` with `y` growing
//! downwards.  `f32` is plenty for map-sized coordinates and matches the
//! precision of the positions handed over by the map loader.

use std::ops::{Add, Mul, Sub};

/// A 2-D point or vector in world units.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3-D cross product.
    #[inline]
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    #[inline]
    pub fn distance_sq(self, other: Vec2) -> f32 {
        (other - self).length_sq()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        if len <= f32::EPSILON {
            None
        } else {
            Some(Vec2::new(self.x / len, self.y / len))
        }
    }

    #[inline]
    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        self + (other - self) * t
    }

    /// Move towards `target` by at most `max_step`; lands exactly on it when
    /// closer than that.
    pub fn move_towards(self, target: Vec2, max_step: f32) -> Vec2 {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            target
        } else {
            self + delta * (max_step / dist)
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ── Rect ──────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.  `min` is inclusive, `max` is inclusive too;
/// callers converting to cells decide their own rounding.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Bounding box of a point set.  `None` when `points` is empty.
    pub fn bounding(points: &[Vec2]) -> Option<Rect> {
        let first = *points.first()?;
        let mut rect = Rect { min: first, max: first };
        for p in &points[1..] {
            rect.min.x = rect.min.x.min(p.x);
            rect.min.y = rect.min.y.min(p.y);
            rect.max.x = rect.max.x.max(p.x);
            rect.max.y = rect.max.y.max(p.y);
        }
        Some(rect)
    }

    /// Grow by `margin` on every side.
    pub fn expanded(self, margin: f32) -> Rect {
        Rect {
            min: Vec2::new(self.min.x - margin, self.min.y - margin),
            max: Vec2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

// ── Segment / polyline helpers ────────────────────────────────────────────────

/// Squared distance from `p` to the segment `a`–`b`.
pub fn segment_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance_sq(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_sq(a + ab * t)
}

/// Squared distance from `p` to the nearest point of an open polyline.
///
/// A single-point polyline degenerates to point distance; an empty one is
/// infinitely far away.
pub fn polyline_distance_sq(p: Vec2, line: &[Vec2]) -> f32 {
    match line {
        [] => f32::INFINITY,
        [only] => p.distance_sq(*only),
        _ => line
            .windows(2)
            .map(|w| segment_distance_sq(p, w[0], w[1]))
            .fold(f32::INFINITY, f32::min),
    }
}

/// `true` if segment `p1`–`p2` crosses segment `q1`–`q2`.
///
/// The orientation test is half-open (`> 0.0` on one side, `<= 0.0` on the
/// other), so a probe passing exactly through a vertex shared by two polygon
/// edges is counted once, or twice when it only grazes the vertex.
pub fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d = p2 - p1;
    let e = q2 - q1;
    let o1 = d.cross(q1 - p1);
    let o2 = d.cross(q2 - p1);
    let o3 = e.cross(p1 - q1);
    let o4 = e.cross(p2 - q1);
    (o1 > 0.0) != (o2 > 0.0) && (o3 > 0.0) != (o4 > 0.0)
}

/// Total arc length of a polyline.
pub fn polyline_length(line: &[Vec2]) -> f32 {
    line.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Point at arc-length `distance` along `line`, clamped to its endpoints.
///
/// Returns `None` only for an empty polyline.
pub fn polyline_point_at(line: &[Vec2], distance: f32) -> Option<Vec2> {
    let first = *line.first()?;
    if distance <= 0.0 {
        return Some(first);
    }
    let mut remaining = distance;
    for w in line.windows(2) {
        let seg = w[0].distance(w[1]);
        if remaining <= seg {
            if seg <= f32::EPSILON {
                return Some(w[1]);
            }
            return Some(w[0].lerp(w[1], remaining / seg));
        }
        remaining -= seg;
    }
    line.last().copied()
}
