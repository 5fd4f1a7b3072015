//! Prioritized combination of behaviours
//!
//! Behaviours run in the configured order, each weighted and then fed into a
//! [`ForceAccumulator`]. Evaluation stops as soon as the budget is spent, so
//! expensive low-priority behaviours are skipped when avoidance already uses
//! the whole force.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::accumulator::ForceAccumulator;
use super::agent::{Body, Entity, Vehicle, VehicleState, Wall, WallSegment};
use super::steering::Steering;

/// Behaviours known to the prioritized combiner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    /// Keep whiskers clear of walls
    WallAvoidance,
    /// Steer around obstacles ahead
    ObstacleAvoidance,
    /// Flee from a pursuer's predicted position
    Evade,
    /// Move away from a point
    Flee,
    /// Keep distance from neighbours
    Separation,
    /// Match the neighbours' heading
    Alignment,
    /// Move towards the neighbours' centre
    Cohesion,
    /// Move towards a point
    Seek,
    /// Move towards a point and stop on it
    Arrive,
    /// Chase a moving vehicle
    Pursuit,
    /// Hold a slot relative to a leader
    OffsetPursuit,
    /// Random smooth movement
    Wander,
}

impl BehaviorKind {
    /// Every behaviour, in the default priority order
    pub const ALL: [Self; 12] = [
        Self::WallAvoidance,
        Self::ObstacleAvoidance,
        Self::Evade,
        Self::Flee,
        Self::Separation,
        Self::Alignment,
        Self::Cohesion,
        Self::Seek,
        Self::Arrive,
        Self::Pursuit,
        Self::OffsetPursuit,
        Self::Wander,
    ];

    /// Name for logging
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::WallAvoidance => "WallAvoidance",
            Self::ObstacleAvoidance => "ObstacleAvoidance",
            Self::Evade => "Evade",
            Self::Flee => "Flee",
            Self::Separation => "Separation",
            Self::Alignment => "Alignment",
            Self::Cohesion => "Cohesion",
            Self::Seek => "Seek",
            Self::Arrive => "Arrive",
            Self::Pursuit => "Pursuit",
            Self::OffsetPursuit => "OffsetPursuit",
            Self::Wander => "Wander",
        }
    }
}

/// Everything a vehicle reacts to during one tick.
///
/// A behaviour whose input is missing (no target, empty scene slice, `wander`
/// unset) is skipped. `O`, `W` and `N` are the obstacle, wall and vehicle
/// types; they default to the plain structs used by scenes, and game code can
/// use its own types implementing [`Entity`], [`Wall`] and [`Vehicle`].
#[derive(Debug)]
pub struct SteeringInputs<'a, O = Body, W = WallSegment, N = VehicleState> {
    /// Obstacles to avoid
    pub obstacles: &'a [O],
    /// Walls to avoid
    pub walls: &'a [W],
    /// Flocking neighbours, not including the vehicle itself
    pub neighbours: &'a [&'a N],
    /// Point to seek
    pub seek: Option<Vec3>,
    /// Point to flee from
    pub flee: Option<Vec3>,
    /// Point to arrive at
    pub arrive: Option<Vec3>,
    /// Vehicle to pursue
    pub pursue: Option<&'a N>,
    /// Vehicle to evade
    pub evade: Option<&'a N>,
    /// Leader and the offset to hold in its frame
    pub follow: Option<(&'a N, Vec3)>,
    /// Wander with the configured defaults
    pub wander: bool,
}

// Manual impls: the inputs only hold references, so no bounds on O, W, N.
impl<O, W, N> Clone for SteeringInputs<'_, O, W, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, W, N> Copy for SteeringInputs<'_, O, W, N> {}

impl<O, W, N> Default for SteeringInputs<'_, O, W, N> {
    fn default() -> Self {
        Self {
            obstacles: &[],
            walls: &[],
            neighbours: &[],
            seek: None,
            flee: None,
            arrive: None,
            pursue: None,
            evade: None,
            follow: None,
            wander: false,
        }
    }
}

impl Steering {
    /// Combine all applicable behaviours into one force bounded by
    /// `vehicle.max_force()`.
    ///
    /// Behaviours are evaluated in `config().priorities` order and scaled by
    /// their weight. Evaluation stops at the first behaviour that does not
    /// fully fit in the remaining budget.
    pub fn calculate_prioritized<V, O, W, N>(
        &mut self,
        vehicle: &V,
        inputs: &SteeringInputs<'_, O, W, N>,
    ) -> Vec3
    where
        V: Vehicle + ?Sized,
        O: Entity,
        W: Wall,
        N: Vehicle,
    {
        let mut accumulator = ForceAccumulator::new(vehicle.max_force());

        for i in 0..self.config().priorities.len() {
            let kind = self.config().priorities[i];
            let Some(force) = self.behavior_force(kind, vehicle, inputs) else {
                continue;
            };

            let weighted = force * self.config().weights.get(kind);
            if !accumulator.add(weighted) {
                log::trace!(
                    "Steering budget spent at {} (total {:.3})",
                    kind.name(),
                    accumulator.total().length()
                );
                break;
            }
        }

        accumulator.total()
    }

    /// Force produced by a single behaviour, or `None` if its input is absent
    pub fn behavior_force<V, O, W, N>(
        &mut self,
        kind: BehaviorKind,
        vehicle: &V,
        inputs: &SteeringInputs<'_, O, W, N>,
    ) -> Option<Vec3>
    where
        V: Vehicle + ?Sized,
        O: Entity,
        W: Wall,
        N: Vehicle,
    {
        match kind {
            BehaviorKind::WallAvoidance => (!inputs.walls.is_empty())
                .then(|| self.wall_avoidance(vehicle, inputs.walls)),
            BehaviorKind::ObstacleAvoidance => (!inputs.obstacles.is_empty())
                .then(|| self.obstacle_avoidance(vehicle, inputs.obstacles)),
            BehaviorKind::Evade => inputs.evade.map(|threat| self.evade(vehicle, threat)),
            BehaviorKind::Flee => inputs.flee.map(|threat| self.flee(vehicle, threat)),
            BehaviorKind::Separation => (!inputs.neighbours.is_empty())
                .then(|| self.separation(vehicle, inputs.neighbours)),
            BehaviorKind::Alignment => (!inputs.neighbours.is_empty())
                .then(|| self.alignment(vehicle, inputs.neighbours)),
            BehaviorKind::Cohesion => (!inputs.neighbours.is_empty())
                .then(|| self.cohesion(vehicle, inputs.neighbours)),
            BehaviorKind::Seek => inputs.seek.map(|target| self.seek(vehicle, target)),
            BehaviorKind::Arrive => inputs.arrive.map(|target| self.arrive(vehicle, target)),
            BehaviorKind::Pursuit => inputs.pursue.map(|target| self.pursuit(vehicle, target)),
            BehaviorKind::OffsetPursuit => inputs
                .follow
                .map(|(leader, offset)| self.offset_pursuit(vehicle, leader, offset)),
            BehaviorKind::Wander => inputs.wander.then(|| self.wander_default(vehicle)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SteeringConfig;
    use crate::math::VectorExt;

    fn vehicle() -> VehicleState {
        VehicleState::new(Vec3::ZERO, 10.0, 5.0)
    }

    #[test]
    fn test_nothing_to_do() {
        let mut steering = Steering::with_seed(SteeringConfig::default(), 1);
        let inputs: SteeringInputs = SteeringInputs::default();
        let force = steering.calculate_prioritized(&vehicle(), &inputs);
        assert_eq!(force, Vec3::ZERO);
    }

    #[test]
    fn test_single_behavior_is_bounded() {
        let mut steering = Steering::with_seed(SteeringConfig::default(), 1);
        let inputs: SteeringInputs = SteeringInputs {
            seek: Some(Vec3::new(100.0, 0.0, 0.0)),
            ..Default::default()
        };
        let force = steering.calculate_prioritized(&vehicle(), &inputs);

        // seek wants 10, the budget is 5
        assert!((force - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_higher_priority_wins() {
        let config = SteeringConfig::default()
            .with_priorities(vec![BehaviorKind::Flee, BehaviorKind::Seek]);
        let mut steering = Steering::with_seed(config, 1);
        let inputs: SteeringInputs = SteeringInputs {
            flee: Some(Vec3::new(1.0, 0.0, 0.0)),
            seek: Some(Vec3::new(0.0, 50.0, 0.0)),
            ..Default::default()
        };
        let force = steering.calculate_prioritized(&vehicle(), &inputs);

        // flee alone saturates the budget, seek never contributes
        assert!((force - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_lower_priority_fills_leftover() {
        let mut weights = crate::core::Weights::default();
        weights.flee = 0.2;
        weights.seek = 0.1;
        let config = SteeringConfig::default()
            .with_priorities(vec![BehaviorKind::Flee, BehaviorKind::Seek])
            .with_weights(weights);
        let mut steering = Steering::with_seed(config, 1);
        let inputs: SteeringInputs = SteeringInputs {
            flee: Some(Vec3::new(1.0, 0.0, 0.0)),
            seek: Some(Vec3::new(0.0, 50.0, 0.0)),
            ..Default::default()
        };
        let force = steering.calculate_prioritized(&vehicle(), &inputs);

        // flee contributes 10 * 0.2 = 2 along -x, seek 10 * 0.1 = 1 along +y
        assert!((force - Vec3::new(-2.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_disabled_behaviors_are_skipped() {
        let config = SteeringConfig::default().with_priorities(vec![BehaviorKind::Wander]);
        let mut steering = Steering::with_seed(config, 3);
        let inputs: SteeringInputs = SteeringInputs {
            seek: Some(Vec3::new(10.0, 0.0, 0.0)),
            ..Default::default()
        };
        // wander is not requested, seek is not in the priority list
        assert_eq!(steering.calculate_prioritized(&vehicle(), &inputs), Vec3::ZERO);
    }

    #[test]
    fn test_never_exceeds_max_force() {
        let mut steering = Steering::with_seed(SteeringConfig::default(), 42);
        let neighbour = VehicleState::new(Vec3::new(0.5, 0.5, 0.0), 10.0, 5.0);
        let neighbours = [&neighbour];
        let obstacles = [Body::new(Vec3::new(3.0, 0.2, 0.0), 1.0)];
        let walls = [WallSegment::new(Vec3::new(2.0, -5.0, 0.0), Vec3::new(2.0, 5.0, 0.0))];
        let inputs: SteeringInputs = SteeringInputs {
            obstacles: &obstacles,
            walls: &walls,
            neighbours: &neighbours,
            seek: Some(Vec3::new(20.0, 0.0, 0.0)),
            wander: true,
            ..Default::default()
        };

        let v = vehicle().with_velocity(Vec3::new(4.0, 0.0, 0.0));
        for _ in 0..20 {
            let force = steering.calculate_prioritized(&v, &inputs);
            assert!(force.length() <= v.max_force + 1e-4);
        }
    }

    struct Rock(Vec3);

    impl Entity for Rock {
        fn position(&self) -> Vec3 {
            self.0
        }

        fn bounding_radius(&self) -> f32 {
            1.0
        }
    }

    struct Drone {
        position: Vec3,
        velocity: Vec3,
    }

    impl Entity for Drone {
        fn position(&self) -> Vec3 {
            self.position
        }

        fn bounding_radius(&self) -> f32 {
            0.5
        }
    }

    impl Vehicle for Drone {
        fn velocity(&self) -> Vec3 {
            self.velocity
        }

        fn heading(&self) -> Vec3 {
            self.velocity.normalize_or_zero()
        }

        fn max_speed(&self) -> f32 {
            10.0
        }

        fn max_force(&self) -> f32 {
            5.0
        }
    }

    #[test]
    fn test_accepts_game_side_types() {
        let me = Drone {
            position: Vec3::ZERO,
            velocity: Vec3::X,
        };
        let target = Drone {
            position: Vec3::new(0.0, 8.0, 0.0),
            velocity: Vec3::X,
        };
        let obstacles = [Rock(Vec3::new(20.0, 20.0, 0.0))];
        let inputs = SteeringInputs::<Rock, WallSegment, Drone> {
            obstacles: &obstacles,
            pursue: Some(&target),
            ..Default::default()
        };

        let mut steering = Steering::with_seed(SteeringConfig::default(), 1);
        let force = steering.calculate_prioritized(&me, &inputs);
        let expected = steering.pursuit(&me, &target);

        // obstacle is off the path, so pursuit alone is used, capped at 5
        assert!((force - expected.truncated(5.0)).length() < 1e-5);
        assert!(force.y > 0.0);
    }
}
