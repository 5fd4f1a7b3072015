//! Geometric queries used by the steering behaviours
//!
//! Distances, intersections and rotations. Nothing in here panics or returns
//! an error: degenerate input (zero-length segments, parallel lines, zero
//! leading coefficients) resolves to a documented fallback or `None`.
//!
//! Functions with a `_2d` suffix only look at the x and y components.

use glam::{Quat, Vec2, Vec3};

use super::VectorExt;

/// Distance from a point to a segment, with the closest point on the segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDistance<V = Vec3> {
    /// Euclidean distance to `nearest`
    pub distance: f32,
    /// Closest point on the segment
    pub nearest: V,
}

/// Real roots of `a*x^2 + b*x + c = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuadraticRoots {
    /// No real roots, or `a == 0`
    None,
    /// Single (repeated) root
    One(f32),
    /// Two roots, the `+sqrt(disc)` one first
    Two(f32, f32),
}

impl QuadraticRoots {
    /// Number of roots found
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
        }
    }

    /// True if any root satisfies `pred`
    pub fn any(&self, mut pred: impl FnMut(f32) -> bool) -> bool {
        match *self {
            Self::None => false,
            Self::One(r) => pred(r),
            Self::Two(r1, r2) => pred(r1) || pred(r2),
        }
    }
}

/// Distance from `p` to the infinite line through `l1` and `l2`.
///
/// Falls back to the distance from `p` to `l1` when the line is degenerate.
#[must_use]
pub fn point_to_line_distance(l1: Vec3, l2: Vec3, p: Vec3) -> f32 {
    let dir = l2 - l1;
    let len = dir.length();
    if len == 0.0 {
        return p.distance(l1);
    }
    (p - l1).cross(dir).length() / len
}

/// Distance from `p` to the segment `l1`-`l2`, with the nearest point.
///
/// The projection parameter `t = (p - l1).(l2 - l1) / |l2 - l1|^2` is clamped
/// to the segment; a zero-length segment behaves like the point `l1`.
#[must_use]
pub fn point_to_segment_distance(l1: Vec3, l2: Vec3, p: Vec3) -> SegmentDistance {
    let len2 = l1.distance_squared(l2);
    if len2 == 0.0 {
        return SegmentDistance {
            distance: p.distance(l1),
            nearest: l1,
        };
    }

    let t = (p - l1).dot(l2 - l1) / len2;
    let nearest = if t < 0.0 {
        l1
    } else if t > 1.0 {
        l2
    } else {
        l1 + (l2 - l1) * t
    };

    SegmentDistance {
        distance: p.distance(nearest),
        nearest,
    }
}

/// [`point_to_line_distance`] for plain 2D vectors
#[must_use]
pub fn point_to_line_distance_vec2(l1: Vec2, l2: Vec2, p: Vec2) -> f32 {
    point_to_line_distance(l1.extend(0.0), l2.extend(0.0), p.extend(0.0))
}

/// [`point_to_segment_distance`] for plain 2D vectors
#[must_use]
pub fn point_to_segment_distance_vec2(l1: Vec2, l2: Vec2, p: Vec2) -> SegmentDistance<Vec2> {
    let result = point_to_segment_distance(l1.extend(0.0), l2.extend(0.0), p.extend(0.0));
    SegmentDistance {
        distance: result.distance,
        nearest: result.nearest.truncate(),
    }
}

/// Intersection of the infinite lines `p1`-`p2` and `p3`-`p4` in the xy plane.
///
/// Returns `None` for parallel or coincident lines. The result has `z = 0`.
#[must_use]
pub fn line_line_intersection_2d(p1: Vec3, p2: Vec3, p3: Vec3, p4: Vec3) -> Option<Vec3> {
    let (x1, y1, x2, y2) = (p1.x, p1.y, p2.x, p2.y);
    let (x3, y3, x4, y4) = (p3.x, p3.y, p4.x, p4.y);

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom == 0.0 {
        return None;
    }

    let a = x1 * y2 - y1 * x2;
    let b = x3 * y4 - y3 * x4;
    let x = (a * (x3 - x4) - (x1 - x2) * b) / denom;
    let y = (a * (y3 - y4) - (y1 - y2) * b) / denom;
    Some(Vec3::new(x, y, 0.0))
}

/// [`line_line_intersection_2d`] for plain 2D vectors
#[must_use]
pub fn line_line_intersection_vec2(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2> {
    line_line_intersection_2d(p1.extend(0.0), p2.extend(0.0), p3.extend(0.0), p4.extend(0.0))
        .map(Vec3::truncate)
}

/// Intersection of the segments `p1`-`p2` and `p3`-`p4` in the xy plane.
///
/// Both segment parameters must lie in `[0, 1]`. Parallel segments never
/// intersect, even when collinear and overlapping.
#[must_use]
pub fn segment_segment_intersection_2d(p1: Vec3, p2: Vec3, p3: Vec3, p4: Vec3) -> Option<Vec3> {
    let r = p2 - p1;
    let s = p4 - p3;

    let denom = r.cross2d(s);
    if denom == 0.0 {
        return None;
    }

    let qp = p3 - p1;
    let t = qp.cross2d(s) / denom;
    let u = qp.cross2d(r) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(p1 + r * t)
}

/// Does the infinite line through `l1` and `l2` cross the circle at `center`?
///
/// Tangent lines do not count.
#[must_use]
pub fn line_circle_intersect(l1: Vec3, l2: Vec3, center: Vec3, radius: f32) -> bool {
    let a = l1 - center;
    let b = l2 - center;
    let det = a.cross2d(b);
    let dr2 = (b.x - a.x) * (b.x - a.x) + (b.y - a.y) * (b.y - a.y);
    radius * radius * dr2 - det * det > 0.0
}

/// Does the segment `l1`-`l2` pass strictly within `radius` of `center`?
#[must_use]
pub fn segment_circle_intersect(l1: Vec3, l2: Vec3, center: Vec3, radius: f32) -> bool {
    point_to_segment_distance(l1, l2, center).distance < radius
}

/// Does the segment `l1`-`l2` touch the sphere at `center`?
///
/// Solves `|l1 + t (l2 - l1) - center|^2 = radius^2` for `t` and accepts any
/// root in `[0, 1]`. A zero-length segment never intersects.
#[must_use]
pub fn ray_sphere_intersect(l1: Vec3, l2: Vec3, center: Vec3, radius: f32) -> bool {
    let d = l2 - l1;
    let f = l1 - center;

    let a = d.dot(d);
    let b = 2.0 * f.dot(d);
    let c = f.dot(f) - radius * radius;

    solve_quadratic(a, b, c).any(|t| (0.0..=1.0).contains(&t))
}

/// Real roots of `a*x^2 + b*x + c = 0`.
///
/// There is no linear fallback: `a == 0` yields no roots.
#[must_use]
pub fn solve_quadratic(a: f32, b: f32, c: f32) -> QuadraticRoots {
    if a == 0.0 {
        return QuadraticRoots::None;
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        QuadraticRoots::None
    } else if disc == 0.0 {
        QuadraticRoots::One(-b / (2.0 * a))
    } else {
        let sq = disc.sqrt();
        QuadraticRoots::Two((-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a))
    }
}

/// Times at which a projectile fired from the origin meets a moving target.
///
/// `position` and `velocity` describe the target relative to the shooter, in
/// the xy plane; `speed` is the projectile speed. Either time may be negative.
/// Returns `None` when the projectile can never catch up.
#[must_use]
pub fn intercept_times(position: Vec3, velocity: Vec3, speed: f32) -> Option<(f32, f32)> {
    let (x, y) = (position.x, position.y);
    let (p, q) = (velocity.x, velocity.y);
    let (x2, y2, p2, q2, c2) = (x * x, y * y, p * p, q * q, speed * speed);

    let denom = c2 - p2 - q2;
    if denom == 0.0 {
        return None;
    }

    let disc = c2 * x2 - q2 * x2 + 2.0 * p * q * x * y + c2 * y2 - p2 * y2;
    if disc < 0.0 {
        return None;
    }

    let base = p * x + q * y;
    let root = disc.sqrt();
    Some(((base - root) / denom, (base + root) / denom))
}

/// Rotate the xy part of `v` counter-clockwise by `angle` radians; z is kept
#[must_use]
pub fn rotate_2d(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
}

/// [`rotate_2d`] for plain 2D vectors
#[must_use]
pub fn rotate_2d_vec2(v: Vec2, angle: f32) -> Vec2 {
    rotate_2d(v.extend(0.0), angle).truncate()
}

/// Rotate `v` by `angle` radians around `axis`.
///
/// A zero axis leaves `v` unchanged.
#[must_use]
pub fn rotate_3d(v: Vec3, angle: f32, axis: Vec3) -> Vec3 {
    let axis = axis.normalize_or_zero();
    if axis.is_null() {
        return v;
    }
    rotate_3d_quat(v, Quat::from_axis_angle(axis, angle))
}

/// Rotate `v` by the unit quaternion `q` using the sandwich product `q v q*`.
///
/// The product is taken on the normalized input and scaled back up, so the
/// returned vector keeps the length of `v`.
#[must_use]
pub fn rotate_3d_quat(v: Vec3, q: Quat) -> Vec3 {
    let len = v.length();
    if len == 0.0 {
        return Vec3::ZERO;
    }

    let n = v / len;
    let pure = Quat::from_xyzw(n.x, n.y, n.z, 0.0);
    let w = q * pure * q.conjugate();
    Vec3::new(w.x, w.y, w.z) * len
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_degenerate_segment_is_point_distance() {
        let l = Vec3::new(2.0, -1.0, 0.5);
        for p in [Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0), l] {
            let res = point_to_segment_distance(l, l, p);
            assert_eq!(res.distance, p.distance(l));
            assert_eq!(res.nearest, l);
        }
    }

    #[test]
    fn test_segment_distance_interior_is_perpendicular() {
        let l1 = Vec3::ZERO;
        let l2 = Vec3::new(10.0, 0.0, 0.0);
        let p = Vec3::new(4.0, 3.0, 0.0);

        let res = point_to_segment_distance(l1, l2, p);
        assert!((res.distance - 3.0).abs() < EPSILON);
        assert!((res.distance - point_to_line_distance(l1, l2, p)).abs() < EPSILON);
        assert!(approx(res.nearest, Vec3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_segment_distance_clamps_to_endpoints() {
        let l1 = Vec3::ZERO;
        let l2 = Vec3::new(10.0, 0.0, 0.0);

        let before = Vec3::new(-3.0, 4.0, 0.0);
        let res = point_to_segment_distance(l1, l2, before);
        assert!((res.distance - 5.0).abs() < EPSILON);
        assert_eq!(res.nearest, l1);

        let after = Vec3::new(13.0, 4.0, 0.0);
        let res = point_to_segment_distance(l1, l2, after);
        assert!((res.distance - 5.0).abs() < EPSILON);
        assert_eq!(res.nearest, l2);

        // the infinite line is closer than the segment beyond the ends
        assert!(point_to_line_distance(l1, l2, after) < res.distance);
    }

    #[test]
    fn test_point_to_line_degenerate() {
        let l = Vec3::new(1.0, 1.0, 0.0);
        let p = Vec3::new(4.0, 5.0, 0.0);
        assert!((point_to_line_distance(l, l, p) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_line_line_intersection() {
        let hit = line_line_intersection_2d(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::new(1.0, 3.0, 0.0),
        );
        assert!(approx(hit.unwrap(), Vec3::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn test_line_line_parallel_is_distinct_from_origin() {
        let parallel = line_line_intersection_2d(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        );
        assert_eq!(parallel, None);

        let at_origin = line_line_intersection_2d(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert!(approx(at_origin.unwrap(), Vec3::ZERO));
    }

    #[test]
    fn test_segment_segment_crossing() {
        let hit = segment_segment_intersection_2d(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        );
        assert!(approx(hit.unwrap(), Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_segment_segment_parallel() {
        let hit = segment_segment_intersection_2d(
            Vec3::ZERO,
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_segment_segment_checks_both_ranges() {
        // The first segment's parameter is in range but the crossing point
        // lies past the end of the second segment.
        let hit = segment_segment_intersection_2d(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(2.0, 3.0, 0.0),
        );
        assert!(hit.is_none());

        // and the other way around
        let hit = segment_segment_intersection_2d(
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(2.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_line_circle() {
        let center = Vec3::new(5.0, 5.0, 0.0);
        // horizontal line through y = 5 passes through the centre
        assert!(line_circle_intersect(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(1.0, 5.0, 0.0),
            center,
            1.0
        ));
        // y = 0 is far from a circle centred at (5, 5)
        assert!(!line_circle_intersect(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            center,
            1.0
        ));
        // tangent does not count
        assert!(!line_circle_intersect(
            Vec3::new(0.0, 6.0, 0.0),
            Vec3::new(1.0, 6.0, 0.0),
            center,
            1.0
        ));
    }

    #[test]
    fn test_segment_circle_is_strict() {
        let l1 = Vec3::ZERO;
        let l2 = Vec3::new(10.0, 0.0, 0.0);
        assert!(segment_circle_intersect(l1, l2, Vec3::new(5.0, 0.5, 0.0), 1.0));
        assert!(!segment_circle_intersect(l1, l2, Vec3::new(5.0, 1.0, 0.0), 1.0));
        // beyond the end of the segment
        assert!(!segment_circle_intersect(l1, l2, Vec3::new(12.0, 0.0, 0.0), 1.0));
    }

    #[test]
    fn test_ray_sphere() {
        let center = Vec3::new(5.0, 0.0, 0.0);
        assert!(ray_sphere_intersect(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            center,
            1.0
        ));
        // segment stops short of the sphere
        assert!(!ray_sphere_intersect(
            Vec3::ZERO,
            Vec3::new(3.0, 0.0, 0.0),
            center,
            1.0
        ));
        // misses sideways
        assert!(!ray_sphere_intersect(
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(10.0, 0.0, 3.0),
            center,
            1.0
        ));
        // degenerate segment
        assert!(!ray_sphere_intersect(center, center, center, 1.0));
    }

    #[test]
    fn test_solve_quadratic() {
        assert_eq!(solve_quadratic(1.0, -3.0, 2.0), QuadraticRoots::Two(2.0, 1.0));
        assert_eq!(solve_quadratic(1.0, -2.0, 1.0), QuadraticRoots::One(1.0));
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0), QuadraticRoots::None);
        // no linear fallback
        assert_eq!(solve_quadratic(0.0, 2.0, 1.0), QuadraticRoots::None);
        assert_eq!(solve_quadratic(0.0, 2.0, 1.0).count(), 0);
    }

    #[test]
    fn test_intercept_times() {
        // stationary target 10 units away, projectile speed 5
        let (t1, t2) = intercept_times(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, 5.0).unwrap();
        assert!((t1 + 2.0).abs() < EPSILON);
        assert!((t2 - 2.0).abs() < EPSILON);

        // target as fast as the projectile
        let target = Vec3::new(10.0, 0.0, 0.0);
        assert!(intercept_times(target, Vec3::new(5.0, 0.0, 0.0), 5.0).is_none());
    }

    #[test]
    fn test_vec2_queries_match_xy_plane() {
        let (l1, l2) = (Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0));

        assert!((point_to_line_distance_vec2(l1, l2, Vec2::new(9.0, 3.0)) - 3.0).abs() < EPSILON);

        let d = point_to_segment_distance_vec2(l1, l2, Vec2::new(6.0, 0.0));
        assert!((d.distance - 2.0).abs() < EPSILON);
        assert_eq!(d.nearest, l2);

        let d = point_to_segment_distance_vec2(l1, l2, Vec2::new(1.0, -2.0));
        assert!((d.nearest - Vec2::new(1.0, 0.0)).length() < EPSILON);

        let hit = line_line_intersection_vec2(l1, l2, Vec2::new(2.0, 5.0), Vec2::new(2.0, 6.0));
        assert!((hit.unwrap() - Vec2::new(2.0, 0.0)).length() < EPSILON);
        let parallel = line_line_intersection_vec2(l1, l2, Vec2::Y, Vec2::new(1.0, 1.0));
        assert!(parallel.is_none());
    }

    #[test]
    fn test_rotate_2d() {
        let r = rotate_2d(Vec3::X, FRAC_PI_2);
        assert!(approx(r, Vec3::Y));

        let r = rotate_2d_vec2(Vec2::X, FRAC_PI_2);
        assert!((r - Vec2::Y).length() < EPSILON);

        // z untouched
        let r = rotate_2d(Vec3::new(1.0, 0.0, 7.0), FRAC_PI_2);
        assert!(approx(r, Vec3::new(0.0, 1.0, 7.0)));
    }

    #[test]
    fn test_rotate_3d_preserves_length() {
        let v = Vec3::new(3.0, 0.0, 0.0);
        let r = rotate_3d(v, FRAC_PI_2, Vec3::Z);
        assert!(approx(r, Vec3::new(0.0, 3.0, 0.0)));

        let v = Vec3::new(1.0, 2.0, 3.0);
        let r = rotate_3d(v, 1.2, Vec3::new(1.0, 1.0, 0.0));
        assert!((r.length() - v.length()).abs() < 1e-4);

        assert_eq!(rotate_3d(Vec3::ZERO, 1.0, Vec3::Y), Vec3::ZERO);
        assert_eq!(rotate_3d(v, 1.0, Vec3::ZERO), v);
    }

    #[test]
    fn test_rotate_3d_matches_glam() {
        let q = Quat::from_axis_angle(Vec3::Y, 0.7);
        let v = Vec3::new(2.0, -1.0, 4.0);
        assert!((rotate_3d_quat(v, q) - q * v).length() < 1e-4);
    }
}
