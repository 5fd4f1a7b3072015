//! Budgeted force combination
//!
//! Behaviours are fed in priority order. Each one gets its full force while
//! the budget allows; the first one that does not fit is truncated to the
//! remaining budget and the caller is told to stop.

use glam::Vec3;

/// Add `add` to `running_total` without letting the total exceed `max_force`.
///
/// Returns `true` if `add` fit entirely. Returns `false` if the budget was
/// already spent (total untouched) or if `add` had to be truncated to the
/// remaining budget, in which case lower-priority forces should be skipped.
pub fn accumulate_force(max_force: f32, running_total: &mut Vec3, add: Vec3) -> bool {
    let budget = max_force - running_total.length();
    if budget <= 0.0 {
        return false;
    }

    if add.length() <= budget {
        *running_total += add;
        true
    } else {
        *running_total += add.normalize_or_zero() * budget;
        false
    }
}

/// Running total of steering force capped at a maximum magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceAccumulator {
    total: Vec3,
    max_force: f32,
}

impl ForceAccumulator {
    /// Start an empty total with the given cap
    #[must_use]
    pub fn new(max_force: f32) -> Self {
        Self {
            total: Vec3::ZERO,
            max_force,
        }
    }

    /// Add a force; see [`accumulate_force`]
    pub fn add(&mut self, force: Vec3) -> bool {
        accumulate_force(self.max_force, &mut self.total, force)
    }

    /// Combined force so far
    #[must_use]
    pub fn total(&self) -> Vec3 {
        self.total
    }

    /// Magnitude still available
    #[must_use]
    pub fn remaining(&self) -> f32 {
        (self.max_force - self.total.length()).max(0.0)
    }

    /// True once nothing more can be added
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.max_force - self.total.length() <= 0.0
    }

    /// Clear the total, keeping the cap
    pub fn reset(&mut self) {
        self.total = Vec3::ZERO;
    }
}
