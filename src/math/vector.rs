//! Vector helpers on top of glam
//!
//! glam already provides the value type, arithmetic operators, dot and cross
//! products, lengths and distances. This module fills in the handful of
//! operations steering code needs that glam does not expose directly.

use std::cmp::Ordering;

use glam::{Vec2, Vec3};

/// Extra operations shared by 2D and 3D vectors
pub trait VectorExt: Copy {
    /// Fixed-size component array (`[f32; 2]` or `[f32; 3]`)
    type Components: AsRef<[f32]>;

    /// Components in x, y(, z) order
    fn components(&self) -> Self::Components;

    /// Scalar z-component of the cross product of the xy parts.
    ///
    /// Positive when `other` lies counter-clockwise of `self`.
    fn cross2d(&self, other: Self) -> f32;

    /// Copy rescaled to exactly `max` if longer than `max`, otherwise unchanged
    #[must_use]
    fn truncated(&self, max: f32) -> Self;

    /// In-place form of [`VectorExt::truncated`]
    fn truncate_to(&mut self, max: f32) {
        *self = self.truncated(max);
    }

    /// Normalize in place; a zero vector stays zero
    fn normalize_in_place(&mut self);

    /// True if every component is exactly zero
    fn is_null(&self) -> bool;

    /// Copy pointing the opposite way
    #[must_use]
    fn negated(&self) -> Self;

    /// Flip in place
    fn negate(&mut self) {
        *self = self.negated();
    }

    /// Lexicographic comparison on components.
    ///
    /// Only useful for deterministic ordering, it has no geometric meaning.
    /// Incomparable components (NaN) compare equal.
    fn lex_cmp(&self, other: &Self) -> Ordering {
        let a = self.components();
        let b = other.components();
        a.as_ref()
            .iter()
            .zip(b.as_ref())
            .map(|(x, y)| x.partial_cmp(y).unwrap_or(Ordering::Equal))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl VectorExt for Vec2 {
    type Components = [f32; 2];

    fn components(&self) -> [f32; 2] {
        self.to_array()
    }

    fn cross2d(&self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    fn truncated(&self, max: f32) -> Self {
        if self.length_squared() > max * max {
            self.normalize_or_zero() * max
        } else {
            *self
        }
    }

    fn normalize_in_place(&mut self) {
        *self = self.normalize_or_zero();
    }

    fn is_null(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    fn negated(&self) -> Self {
        -*self
    }
}

impl VectorExt for Vec3 {
    type Components = [f32; 3];

    fn components(&self) -> [f32; 3] {
        self.to_array()
    }

    fn cross2d(&self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    fn truncated(&self, max: f32) -> Self {
        if self.length_squared() > max * max {
            self.normalize_or_zero() * max
        } else {
            *self
        }
    }

    fn normalize_in_place(&mut self) {
        *self = self.normalize_or_zero();
    }

    fn is_null(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    fn negated(&self) -> Self {
        -*self
    }
}

/// Key wrapper giving vectors a total lexicographic order.
///
/// Lets vectors be used as keys in `BTreeMap`/`BTreeSet`. Components are
/// compared with [`f32::total_cmp`], so equality here is bitwise-ish rather
/// than IEEE (`-0.0 < 0.0`, NaN equals itself).
#[derive(Debug, Clone, Copy)]
pub struct LexOrd<V>(pub V);

impl<V: VectorExt> PartialEq for LexOrd<V> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<V: VectorExt> Eq for LexOrd<V> {}

impl<V: VectorExt> PartialOrd for LexOrd<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V: VectorExt> Ord for LexOrd<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.0.components();
        let b = other.0.components();
        a.as_ref()
            .iter()
            .zip(b.as_ref())
            .map(|(x, y)| x.total_cmp(y))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_normalize_zero_is_noop() {
        let mut v = Vec3::ZERO;
        v.normalize_in_place();
        assert_eq!(v, Vec3::ZERO);
        assert!(!v.x.is_nan());

        let mut w = Vec2::ZERO;
        w.normalize_in_place();
        assert_eq!(w, Vec2::ZERO);
    }

    #[test]
    fn test_normalize_nonzero() {
        let mut v = Vec3::new(3.0, 4.0, 0.0);
        v.normalize_in_place();
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_truncate() {
        let v = Vec3::new(30.0, 40.0, 0.0);
        let t = v.truncated(5.0);
        assert!((t.length() - 5.0).abs() < 1e-5);
        assert!((t.normalize() - v.normalize()).length() < 1e-6);

        // shorter vectors are untouched
        let short = Vec3::new(1.0, 1.0, 0.0);
        assert_eq!(short.truncated(5.0), short);

        let mut m = Vec2::new(0.0, 10.0);
        m.truncate_to(2.0);
        assert_eq!(m, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_cross2d_orientation() {
        assert_eq!(Vec3::X.cross2d(Vec3::Y), 1.0);
        assert_eq!(Vec3::Y.cross2d(Vec3::X), -1.0);
        assert_eq!(Vec2::new(2.0, 0.0).cross2d(Vec2::new(4.0, 0.0)), 0.0);
        assert_eq!(Vec3::X.cross(Vec3::Y).z, Vec3::X.cross2d(Vec3::Y));
    }

    #[test]
    fn test_null_and_negate() {
        assert!(Vec3::ZERO.is_null());
        assert!(!Vec3::new(0.0, 0.0, 1e-9).is_null());

        let mut v = Vec3::new(1.0, -2.0, 3.0);
        v.negate();
        assert_eq!(v, Vec3::new(-1.0, 2.0, -3.0));
        assert_eq!(v.negated(), Vec3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_lexicographic_order() {
        let a = Vec3::new(1.0, 5.0, 9.0);
        let b = Vec3::new(1.0, 6.0, 0.0);
        assert_eq!(a.lex_cmp(&b), Ordering::Less);
        assert_eq!(b.lex_cmp(&a), Ordering::Greater);
        assert_eq!(a.lex_cmp(&a), Ordering::Equal);

        let set: BTreeSet<_> = [b, a, a].into_iter().map(LexOrd).collect();
        let ordered: Vec<Vec3> = set.into_iter().map(|k| k.0).collect();
        assert_eq!(ordered, vec![a, b]);
    }
}
