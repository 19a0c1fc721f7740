use core::f32::consts::TAU;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::constants::{
    ASTEROID_VERTICES_BASE, ASTEROID_VERTICES_PER_UNIT, SHIP_BACK_POINT_ANGLE,
    SHIP_BACK_POINT_SCALE,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector for a heading measured clockwise from +y.
    #[inline]
    pub fn from_heading(phi: f32) -> Self {
        Self::new(phi.sin(), phi.cos())
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
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
    pub fn distance_sq(self, other: Self) -> f32 {
        (self - other).length_sq()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned play field centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Bounds {
    pub fn centered(width: f32, height: f32) -> Self {
        Self {
            x_min: -width / 2.0,
            x_max: width / 2.0,
            y_min: -height / 2.0,
            y_max: height / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// True once `pos` is more than `margin` past any edge.
    pub fn is_outside(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < self.x_min - margin
            || pos.x > self.x_max + margin
            || pos.y < self.y_min - margin
            || pos.y > self.y_max + margin
    }

    /// Toroidal wrap that keeps the overshoot.
    ///
    /// Wrapping out and stepping back lands on the start.
    pub fn wrap(&self, pos: Vec2, margin: f32) -> Vec2 {
        Vec2::new(
            wrap_axis(pos.x, self.x_min - margin, self.x_max + margin),
            wrap_axis(pos.y, self.y_min - margin, self.y_max + margin),
        )
    }
}

#[inline]
fn wrap_axis(value: f32, low: f32, high: f32) -> f32 {
    let period = high - low;
    if value < low {
        value + period
    } else if value > high {
        value - period
    } else {
        value
    }
}

/// Folds an angle into [0, 2π).
#[inline]
pub fn wrap_angle(phi: f32) -> f32 {
    let wrapped = phi.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[inline]
pub fn asteroid_vertex_count(size: f32) -> usize {
    ASTEROID_VERTICES_BASE + (size * ASTEROID_VERTICES_PER_UNIT).floor() as usize
}

/// Nose, then the two back corners of the ship triangle.
pub fn ship_hull(pos: Vec2, phi: f32, size: f32, scale: f32) -> [Vec2; 3] {
    let nose = size * scale;
    let back = SHIP_BACK_POINT_SCALE * size * scale;
    [
        pos + Vec2::from_heading(phi) * nose,
        pos + Vec2::from_heading(phi + SHIP_BACK_POINT_ANGLE) * back,
        pos + Vec2::from_heading(phi - SHIP_BACK_POINT_ANGLE) * back,
    ]
}

/// Squared distance from `point` to the closest point of segment `a`-`b`.
pub fn segment_distance_sq(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let edge = b - a;
    let len_sq = edge.length_sq();
    let lambda = if len_sq > 0.0 {
        ((point - a).dot(edge) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    point.distance_sq(a + edge * lambda)
}

#[inline]
pub fn line_circle_collision(center: Vec2, radius: f32, a: Vec2, b: Vec2) -> bool {
    segment_distance_sq(center, a, b) <= radius * radius
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn orientation(p: Vec2, q: Vec2, r: Vec2) -> Orientation {
    let value = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if value > 0.0 {
        Orientation::Clockwise
    } else if value < 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Collinear
    }
}

/// `r` lies inside the bounding box of `p`-`q`; only meaningful when the three are collinear.
fn within_box(p: Vec2, q: Vec2, r: Vec2) -> bool {
    r.x <= p.x.max(q.x) && r.x >= p.x.min(q.x) && r.y <= p.y.max(q.y) && r.y >= p.y.min(q.y)
}

pub fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let abc = orientation(a, b, c);
    let abd = orientation(a, b, d);
    let cda = orientation(c, d, a);
    let cdb = orientation(c, d, b);

    if abc != abd && cda != cdb {
        return true;
    }

    (abc == Orientation::Collinear && within_box(a, b, c))
        || (abd == Orientation::Collinear && within_box(a, b, d))
        || (cda == Orientation::Collinear && within_box(c, d, a))
        || (cdb == Orientation::Collinear && within_box(c, d, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn brute_force_hit(center: Vec2, radius: f32, a: Vec2, b: Vec2) -> bool {
        const SAMPLES: usize = 4_000;
        (0..=SAMPLES).any(|i| {
            let t = i as f32 / SAMPLES as f32;
            a.lerp(b, t).distance_sq(center) <= radius * radius
        })
    }

    #[test]
    fn vertex_count_follows_size() {
        assert_eq!(asteroid_vertex_count(0.02), 8);
        assert_eq!(asteroid_vertex_count(0.042), 12);
        assert_eq!(asteroid_vertex_count(0.07), 18);
    }

    #[test]
    fn line_circle_matches_sampled_distance() {
        let mut rng = SeededRng::new(0xC0FF_EE11);
        let mut checked = 0;
        for _ in 0..2_000 {
            let a = Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0));
            let b = Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0));
            let center = Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0));
            let radius = rng.range(0.05, 0.5);

            let exact_distance = segment_distance_sq(center, a, b).sqrt();
            // Sampling is only decisive away from the rim.
            if (exact_distance - radius).abs() < 1e-3 {
                continue;
            }
            checked += 1;
            assert_eq!(
                line_circle_collision(center, radius, a, b),
                brute_force_hit(center, radius, a, b),
                "a={a:?} b={b:?} center={center:?} radius={radius}"
            );
        }
        assert!(checked > 1_900);
    }

    #[test]
    fn line_circle_uses_clamped_endpoint_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        assert!(line_circle_collision(Vec2::new(1.05, 0.0), 0.1, a, b));
        assert!(!line_circle_collision(Vec2::new(1.2, 0.0), 0.1, a, b));
        assert!(line_circle_collision(Vec2::new(0.5, 0.09), 0.1, a, b));
    }

    #[test]
    fn zero_length_segment_degrades_to_point_test() {
        let p = Vec2::new(0.3, 0.3);
        assert!(line_circle_collision(Vec2::new(0.3, 0.35), 0.1, p, p));
        assert!(!line_circle_collision(Vec2::new(0.3, 0.5), 0.1, p, p));
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0),
        ));
        assert!(!segments_intersect(
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.5),
            Vec2::new(0.0, 1.0),
        ));
    }

    #[test]
    fn collinear_overlap_counts_as_intersection() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(3.0, 0.0),
        ));
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 0.0),
        ));
    }

    #[test]
    fn wrap_round_trip_returns_to_start() {
        let bounds = Bounds::centered(1.55, 1.0);
        let margin = 0.05;
        let start = Vec2::new(bounds.x_min - margin + 0.001, 0.2);
        let step = Vec2::new(-0.004, 0.0);

        let wrapped = bounds.wrap(start + step, margin);
        assert!(wrapped.x > bounds.x_max);
        let back = bounds.wrap(wrapped - step, margin);
        assert!((back.x - start.x).abs() < 1e-5, "{back:?} vs {start:?}");
        assert_eq!(back.y, start.y);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for phi in [-7.0, -0.000_001, 0.0, 3.0, TAU, 13.0] {
            let wrapped = wrap_angle(phi);
            assert!((0.0..TAU).contains(&wrapped), "{phi} -> {wrapped}");
        }
    }

    #[test]
    fn ship_hull_nose_points_along_heading() {
        let hull = ship_hull(Vec2::ZERO, 0.0, 0.05, 1.0);
        assert!((hull[0].x).abs() < 1e-6);
        assert!((hull[0].y - 0.05).abs() < 1e-6);
        assert!(hull[1].y < 0.0 && hull[2].y < 0.0);
        assert!((hull[1].x + hull[2].x).abs() < 1e-6);
    }
}
