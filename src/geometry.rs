//! Vector math, shape intersection, segment clipping and chunk coordinate
//! mapping. Every predicate here is strictly-less-than on distance: two
//! shapes that merely touch do not collide.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, s: f64) -> Vector2 {
        Vector2::new(self.x * s, self.y * s)
    }

    pub fn dot(self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance_to(self, other: Vector2) -> f64 {
        self.sub(other).length()
    }

    pub fn distance_sq_to(self, other: Vector2) -> f64 {
        let d = self.sub(other);
        d.dot(d)
    }

    /// Rotates `self` around `pivot` by `degrees`, in the screen-space
    /// convention used throughout this crate (0° is "facing +y", positive
    /// rotation is clockwise): `dx = -sin(theta)`, `dy = cos(theta)`.
    pub fn rotate_around(self, pivot: Vector2, degrees: f64) -> Vector2 {
        let theta = degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        let local = self.sub(pivot);
        let rotated = Vector2::new(
            local.x * cos + local.y * sin,
            -local.x * sin + local.y * cos,
        );
        rotated.add(pivot)
    }
}

/// Facing unit vector for a rotation expressed in degrees, using this
/// crate's convention that 0° faces along +y.
pub fn facing_vector(rotation_degrees: f64) -> Vector2 {
    let theta = rotation_degrees.to_radians();
    Vector2::new(-theta.sin(), theta.cos())
}

/// Normalizes a rotation in degrees to the half-open range [0, 360).
pub fn normalize_degrees(mut degrees: f64) -> f64 {
    degrees %= 360.0;
    if degrees < 0.0 {
        degrees += 360.0;
    }
    degrees
}

/// Axis-aligned bounding rectangle, stored center + half-extents so that
/// "expand by N on all sides" (used pervasively for collision broadphase)
/// is just adding N to `half_w`/`half_h`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Vector2,
    pub half_w: f64,
    pub half_h: f64,
}

impl Rect {
    pub fn new(center: Vector2, half_w: f64, half_h: f64) -> Self {
        Self {
            center,
            half_w,
            half_h,
        }
    }

    pub fn from_center_size(center: Vector2, width: f64, height: f64) -> Self {
        Self::new(center, width / 2.0, height / 2.0)
    }

    pub fn expanded(self, by: f64) -> Rect {
        Rect::new(self.center, self.half_w + by, self.half_h + by)
    }

    pub fn min(&self) -> Vector2 {
        Vector2::new(self.center.x - self.half_w, self.center.y - self.half_h)
    }

    pub fn max(&self) -> Vector2 {
        Vector2::new(self.center.x + self.half_w, self.center.y + self.half_h)
    }

    pub fn top_left(&self) -> Vector2 {
        self.min()
    }

    pub fn corners(&self) -> [Vector2; 4] {
        let min = self.min();
        let max = self.max();
        [
            Vector2::new(min.x, min.y),
            Vector2::new(max.x, min.y),
            Vector2::new(min.x, max.y),
            Vector2::new(max.x, max.y),
        ]
    }

    pub fn contains_point(&self, p: Vector2) -> bool {
        p.x > self.min().x && p.x < self.max().x && p.y > self.min().y && p.y < self.max().y
    }

    fn closest_point(&self, p: Vector2) -> Vector2 {
        let min = self.min();
        let max = self.max();
        Vector2::new(p.x.clamp(min.x, max.x), p.y.clamp(min.y, max.y))
    }
}

pub fn rect_intersects_rect(a: Rect, b: Rect) -> bool {
    (a.center.x - b.center.x).abs() < a.half_w + b.half_w
        && (a.center.y - b.center.y).abs() < a.half_h + b.half_h
}

pub fn circle_intersects_circle(c1: Vector2, r1: f64, c2: Vector2, r2: f64) -> bool {
    c1.distance_sq_to(c2) < (r1 + r2) * (r1 + r2)
}

pub fn circle_intersects_rect(center: Vector2, radius: f64, rect: Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_sq_to(closest) < radius * radius
}

/// Liang-Barsky parametric clip of segment `(x1,y1)-(x2,y2)` against `rect`.
/// Returns `(u0, u1)`, the entry/exit parameters in `[0,1]` at which the
/// segment is inside the rect, or `None` if the segment never enters it.
fn liang_barsky(x1: f64, y1: f64, x2: f64, y2: f64, rect: Rect) -> Option<(f64, f64)> {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let min = rect.min();
    let max = rect.max();

    let p = [-dx, dx, -dy, dy];
    let q = [x1 - min.x, max.x - x1, y1 - min.y, max.y - y1];

    let mut u0 = 0.0_f64;
    let mut u1 = 1.0_f64;

    for i in 0..4 {
        if p[i] == 0.0 {
            if q[i] < 0.0 {
                return None;
            }
        } else {
            let t = q[i] / p[i];
            if p[i] < 0.0 {
                if t > u1 {
                    return None;
                }
                if t > u0 {
                    u0 = t;
                }
            } else {
                if t < u0 {
                    return None;
                }
                if t < u1 {
                    u1 = t;
                }
            }
        }
    }

    if u0 > u1 {
        return None;
    }
    Some((u0, u1))
}

/// Clips the segment `(x1,y1)-(x2,y2)` against `rect`, returning the
/// farthest point along the segment that does not enter the rect. Returns
/// the original endpoint `(x2, y2)` when the segment never enters `rect`.
/// Used both to detect hits (hitscan/splash) and to cap movement vectors
/// for sliding collision.
pub fn clip_segment_to_rect(x1: f64, y1: f64, x2: f64, y2: f64, rect: Rect) -> (f64, f64) {
    match liang_barsky(x1, y1, x2, y2, rect) {
        Some((u0, _u1)) => (x1 + u0 * (x2 - x1), y1 + u0 * (y2 - y1)),
        None => (x2, y2),
    }
}

/// True if the open segment genuinely enters `rect` (touching doesn't count).
pub fn segment_intersects_rect(p1: Vector2, p2: Vector2, rect: Rect) -> bool {
    match liang_barsky(p1.x, p1.y, p2.x, p2.y, rect) {
        Some((u0, u1)) => (u1 - u0) > f64::EPSILON,
        None => false,
    }
}

pub fn closest_point_on_segment(p: Vector2, a: Vector2, b: Vector2) -> Vector2 {
    let ab = b.sub(a);
    let len_sq = ab.dot(ab);
    if len_sq <= f64::EPSILON {
        return a;
    }
    let t = (p.sub(a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a.add(ab.scale(t))
}

/// Integer chunk coordinates: `cx = floor(x / chunk_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub cx: i64,
    pub cy: i64,
}

impl ChunkKey {
    pub fn new(cx: i64, cy: i64) -> Self {
        Self { cx, cy }
    }

    /// Stringified `"cx,cy"` form used for map indexing in the external
    /// session store schema.
    pub fn to_key_string(&self) -> String {
        format!("{},{}", self.cx, self.cy)
    }

    pub fn parse(s: &str) -> Option<ChunkKey> {
        let (cx, cy) = s.split_once(',')?;
        Some(ChunkKey::new(cx.parse().ok()?, cy.parse().ok()?))
    }

    pub fn center(&self, chunk_size: f64) -> Vector2 {
        Vector2::new(
            self.cx as f64 * chunk_size + chunk_size / 2.0,
            self.cy as f64 * chunk_size + chunk_size / 2.0,
        )
    }

    /// The 3x3 neighborhood centered on this chunk, in row-major order.
    pub fn neighborhood(&self) -> [ChunkKey; 9] {
        let mut out = [ChunkKey::new(0, 0); 9];
        let mut i = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                out[i] = ChunkKey::new(self.cx + dx, self.cy + dy);
                i += 1;
            }
        }
        out
    }
}

pub fn chunk_of(x: f64, y: f64, chunk_size: f64) -> ChunkKey {
    ChunkKey::new((x / chunk_size).floor() as i64, (y / chunk_size).floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_never_advances_past_endpoint() {
        let rect = Rect::from_center_size(Vector2::new(100.0, 0.0), 30.0, 400.0);
        let (ix, iy) = clip_segment_to_rect(50.0, 0.0, 200.0, 0.0, rect);
        assert!(ix <= 200.0);
        assert_eq!(iy, 0.0);
        assert!(ix < 200.0);
    }

    #[test]
    fn clip_equals_endpoint_when_no_intersection() {
        let rect = Rect::from_center_size(Vector2::new(1000.0, 1000.0), 30.0, 30.0);
        let (ix, iy) = clip_segment_to_rect(0.0, 0.0, 50.0, 0.0, rect);
        assert_eq!((ix, iy), (50.0, 0.0));
    }

    #[test]
    fn touching_does_not_intersect() {
        // Circle whose edge exactly touches the rect boundary: not a collision.
        let rect = Rect::from_center_size(Vector2::new(10.0, 0.0), 10.0, 10.0);
        assert!(!circle_intersects_rect(Vector2::new(0.0, 0.0), 5.0, rect));
    }

    #[test]
    fn chunk_of_floors_toward_negative_infinity() {
        assert_eq!(chunk_of(-1.0, -1.0, 1000.0), ChunkKey::new(-1, -1));
        assert_eq!(chunk_of(0.0, 0.0, 1000.0), ChunkKey::new(0, 0));
        assert_eq!(chunk_of(999.9, 0.0, 1000.0), ChunkKey::new(0, 0));
    }

    #[test]
    fn rotate_around_quarter_turn() {
        let p = Vector2::new(0.0, 10.0);
        let rotated = p.rotate_around(Vector2::ZERO, 90.0);
        assert!((rotated.x - 10.0).abs() < 1e-9);
        assert!(rotated.y.abs() < 1e-9);
    }
}
