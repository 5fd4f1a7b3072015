//! Steering behaviors for autonomous vehicles
//!
//! Each behaviour reads the controlled vehicle and its surroundings and
//! returns a force in velocity space. Forces are not clamped to the vehicle's
//! maximum force; that is the job of [`Steering::accumulate`] or
//! [`Steering::calculate_prioritized`].
//!
//! A `Steering` instance belongs to exactly one vehicle. It owns the wander
//! target and the random generator that jitters it, so separate vehicles can
//! be updated on separate threads and still be reproducible from their seeds.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

use super::accumulator::accumulate_force;
use super::agent::{Entity, Vehicle, Wall};
use crate::core::SteeringConfig;
use crate::math::{VectorExt, rotate_3d, segment_circle_intersect, segment_segment_intersection_2d};

/// Per-vehicle steering state and behaviours
#[derive(Debug, Clone)]
pub struct Steering {
    config: SteeringConfig,
    /// Wander target relative to the wander circle centre, in the vehicle's
    /// local frame (x forward, y side, z up)
    wander_target: Vec3,
    rng: SmallRng,
}

impl Steering {
    /// Create steering seeded from OS entropy
    #[must_use]
    pub fn new(config: SteeringConfig) -> Self {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Create steering with a reproducible random sequence
    #[must_use]
    pub fn with_seed(config: SteeringConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: SteeringConfig, mut rng: SmallRng) -> Self {
        // start somewhere on the wander circle
        let theta = rng.gen_range(0.0..TAU);
        let wander_target = Vec3::new(theta.cos(), theta.sin(), 0.0) * config.wander_radius;
        log::debug!("Created steering, wander target {wander_target}");

        Self {
            config,
            wander_target,
            rng,
        }
    }

    /// Tuning parameters
    #[must_use]
    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    /// Current wander target, relative to the wander circle centre in the
    /// vehicle's local frame
    #[must_use]
    pub fn wander_target(&self) -> Vec3 {
        self.wander_target
    }

    /// World-space position of the wander target for a circle `distance` ahead
    #[must_use]
    pub fn wander_target_world<V: Vehicle + ?Sized>(&self, vehicle: &V, distance: f32) -> Vec3 {
        vehicle.local_to_world(self.wander_target + Vec3::X * distance)
    }

    /// Steer straight towards `target` at full speed
    #[must_use]
    pub fn seek<V: Vehicle + ?Sized>(&self, vehicle: &V, target: Vec3) -> Vec3 {
        let desired = (target - vehicle.position()).normalize_or_zero() * vehicle.max_speed();
        desired - vehicle.velocity()
    }

    /// Steer straight away from `threat` at full speed
    #[must_use]
    pub fn flee<V: Vehicle + ?Sized>(&self, vehicle: &V, threat: Vec3) -> Vec3 {
        let desired = (vehicle.position() - threat).normalize_or_zero() * vehicle.max_speed();
        desired - vehicle.velocity()
    }

    /// Seek `target`, slowing down linearly inside the deceleration radius so
    /// the vehicle comes to rest on it
    #[must_use]
    pub fn arrive<V: Vehicle + ?Sized>(&self, vehicle: &V, target: Vec3) -> Vec3 {
        let to_target = target - vehicle.position();
        let distance = to_target.length();
        let radius = self.config.deceleration_radius;

        let speed = if radius > 0.0 {
            vehicle.max_speed() * (distance / radius).min(1.0)
        } else {
            vehicle.max_speed()
        };

        let desired = to_target.normalize_or_zero() * speed;
        desired - vehicle.velocity()
    }

    /// Seek where `target` will be, predicted from its velocity.
    ///
    /// When the target is ahead and heading almost straight at us, prediction
    /// only overshoots, so its current position is sought instead.
    #[must_use]
    pub fn pursuit<V, T>(&self, vehicle: &V, target: &T) -> Vec3
    where
        V: Vehicle + ?Sized,
        T: Vehicle + ?Sized,
    {
        let to_target = target.position() - vehicle.position();
        let relative_heading = vehicle.heading().dot(target.heading());

        if to_target.dot(vehicle.heading()) > 0.0
            && relative_heading < self.config.pursuit_heading_threshold
        {
            return self.seek(vehicle, target.position());
        }

        let look_ahead = look_ahead_time(to_target.length(), vehicle.max_speed());
        self.seek(vehicle, target.position() + target.velocity() * look_ahead)
    }

    /// Flee from where `threat` will be, predicted from its velocity
    #[must_use]
    pub fn evade<V, T>(&self, vehicle: &V, threat: &T) -> Vec3
    where
        V: Vehicle + ?Sized,
        T: Vehicle + ?Sized,
    {
        let to_threat = threat.position() - vehicle.position();
        let look_ahead = look_ahead_time(to_threat.length(), vehicle.max_speed());
        self.flee(vehicle, threat.position() + threat.velocity() * look_ahead)
    }

    /// Wander using the configured circle
    pub fn wander_default<V: Vehicle + ?Sized>(&mut self, vehicle: &V) -> Vec3 {
        let (radius, distance, jitter) = (
            self.config.wander_radius,
            self.config.wander_distance,
            self.config.wander_jitter,
        );
        self.wander(vehicle, radius, distance, jitter)
    }

    /// Random but smooth movement.
    ///
    /// The wander target sits on a circle of `radius` placed `distance` ahead
    /// of the vehicle. Each call nudges it by a random offset no longer than
    /// `jitter`, pulls it back onto the circle and seeks its world-space
    /// position. With `planar` unset the circle becomes a sphere.
    pub fn wander<V: Vehicle + ?Sized>(
        &mut self,
        vehicle: &V,
        radius: f32,
        distance: f32,
        jitter: f32,
    ) -> Vec3 {
        let z = if self.config.planar {
            0.0
        } else {
            self.rng.gen_range(-1.0f32..=1.0)
        };
        let offset = Vec3::new(
            self.rng.gen_range(-1.0f32..=1.0),
            self.rng.gen_range(-1.0f32..=1.0),
            z,
        ) * jitter;
        let offset = offset.truncated(jitter.abs());

        let target = (self.wander_target + offset).normalize_or_zero();
        self.wander_target = if target.is_null() {
            Vec3::X * radius
        } else {
            target * radius
        };

        let world_target = self.wander_target_world(vehicle, distance);
        self.seek(vehicle, world_target)
    }

    /// Length of the obstacle detection segment; grows with speed
    #[must_use]
    pub fn detection_length<V: Vehicle + ?Sized>(&self, vehicle: &V) -> f32 {
        let min = self.config.detection_box_length;
        let max_speed = vehicle.max_speed();
        if max_speed > 0.0 {
            min * (1.0 + (vehicle.speed() / max_speed).min(1.0))
        } else {
            min
        }
    }

    /// Steer around the nearest obstacle in front of the vehicle.
    ///
    /// A segment is projected along the heading; obstacles whose bounding
    /// circle (grown by the vehicle radius and the safety margin) crosses it
    /// are candidates. The nearest candidate ahead produces a sideways push
    /// away from its centre, stronger the closer it is, plus a braking force
    /// that grows as the distance shrinks.
    #[must_use]
    pub fn obstacle_avoidance<V, O>(&self, vehicle: &V, obstacles: &[O]) -> Vec3
    where
        V: Vehicle + ?Sized,
        O: Entity,
    {
        let box_length = self.detection_length(vehicle);
        if box_length <= 0.0 {
            return Vec3::ZERO;
        }

        let start = vehicle.position();
        let end = start + vehicle.heading() * box_length;

        // (distance ahead, local position, expanded radius)
        let mut closest: Option<(f32, Vec3, f32)> = None;
        for obstacle in obstacles {
            let expanded = obstacle.bounding_radius()
                + vehicle.bounding_radius()
                + self.config.obstacle_margin;
            if !segment_circle_intersect(start, end, obstacle.position(), expanded) {
                continue;
            }

            let local = vehicle.world_to_local(obstacle.position());
            if local.x < 0.0 {
                continue;
            }

            if closest.is_none_or(|(ahead, ..)| local.x < ahead) {
                closest = Some((local.x, local, expanded));
            }
        }

        let Some((ahead, local, expanded)) = closest else {
            return Vec3::ZERO;
        };

        let proximity = ((box_length - ahead) / box_length).clamp(0.0, 1.0);
        let multiplier = 1.0 + proximity;

        let offset = Vec3::new(0.0, local.y, local.z);
        let lateral_distance = offset.length();
        let away = if lateral_distance > 0.0 {
            -offset / lateral_distance
        } else {
            // dead centre, pick a side
            Vec3::Y
        };
        let lateral = away * (expanded - lateral_distance).max(0.0) * multiplier;

        let braking = self.config.braking_weight * expanded * (expanded / ahead.max(expanded));

        log::trace!("Avoiding obstacle {ahead:.2} ahead, {lateral_distance:.2} off course");
        vehicle.local_direction_to_world(lateral - Vec3::X * braking)
    }

    /// Tips of the wall detection whiskers: one straight ahead, two angled to
    /// the sides at half length
    #[must_use]
    pub fn whiskers<V: Vehicle + ?Sized>(&self, vehicle: &V) -> SmallVec<[Vec3; 3]> {
        let position = vehicle.position();
        let heading = vehicle.heading();
        let up = heading.cross(vehicle.side());
        let length = self.config.whisker_length;
        let angle = self.config.whisker_angle;

        let mut tips = SmallVec::new();
        tips.push(position + heading * length);
        tips.push(position + rotate_3d(heading, angle, up) * length * 0.5);
        tips.push(position + rotate_3d(heading, -angle, up) * length * 0.5);
        tips
    }

    /// Push away from walls a whisker has crossed.
    ///
    /// For every whisker, the nearest wall it crosses contributes a force
    /// along that wall's normal equal to how far the whisker reaches past it.
    #[must_use]
    pub fn wall_avoidance<V, W>(&self, vehicle: &V, walls: &[W]) -> Vec3
    where
        V: Vehicle + ?Sized,
        W: Wall,
    {
        let position = vehicle.position();
        let mut force = Vec3::ZERO;

        for tip in self.whiskers(vehicle) {
            // (squared distance, hit point, wall normal)
            let mut nearest: Option<(f32, Vec3, Vec3)> = None;
            for wall in walls {
                let Some(hit) =
                    segment_segment_intersection_2d(position, tip, wall.start(), wall.end())
                else {
                    continue;
                };

                let dist2 = position.distance_squared(hit);
                if nearest.is_none_or(|(best, ..)| dist2 < best) {
                    nearest = Some((dist2, hit, wall.normal()));
                }
            }

            if let Some((_, hit, normal)) = nearest {
                force += normal * tip.distance(hit);
            }
        }

        force
    }

    fn in_perception<V, E>(&self, vehicle: &V, neighbour: &E) -> bool
    where
        V: Vehicle + ?Sized,
        E: Entity + ?Sized,
    {
        let to = neighbour.position() - vehicle.position();
        let range = self.config.perception_radius + neighbour.bounding_radius();
        let dist2 = to.length_squared();
        // anything closer than this overflows the inverse-distance weighting
        dist2 >= f32::MIN_POSITIVE && dist2 < range * range
    }

    /// Seek the centre of mass of the neighbours in range
    #[must_use]
    pub fn cohesion<V, E>(&self, vehicle: &V, neighbours: &[E]) -> Vec3
    where
        V: Vehicle + ?Sized,
        E: Entity,
    {
        let mut centre = Vec3::ZERO;
        let mut count = 0;
        for neighbour in neighbours.iter().filter(|n| self.in_perception(vehicle, *n)) {
            centre += neighbour.position();
            count += 1;
        }

        if count == 0 {
            return Vec3::ZERO;
        }
        self.seek(vehicle, centre / count as f32)
    }

    /// Push away from every neighbour in range, weighted by inverse distance
    #[must_use]
    pub fn separation<V, E>(&self, vehicle: &V, neighbours: &[E]) -> Vec3
    where
        V: Vehicle + ?Sized,
        E: Entity,
    {
        neighbours
            .iter()
            .filter(|n| self.in_perception(vehicle, *n))
            .map(|n| {
                let away = vehicle.position() - n.position();
                // unit direction divided by distance
                away / away.length_squared()
            })
            .sum()
    }

    /// Turn towards the average heading of the neighbours in range
    #[must_use]
    pub fn alignment<V, N>(&self, vehicle: &V, neighbours: &[N]) -> Vec3
    where
        V: Vehicle + ?Sized,
        N: Vehicle,
    {
        let mut heading = Vec3::ZERO;
        let mut count = 0;
        for neighbour in neighbours.iter().filter(|n| self.in_perception(vehicle, *n)) {
            heading += neighbour.heading();
            count += 1;
        }

        if count == 0 {
            return Vec3::ZERO;
        }
        heading / count as f32 - vehicle.heading()
    }

    /// Hold a position relative to `leader`.
    ///
    /// `offset` is in the leader's frame (x forward, y side, z up). The slot's
    /// future position is predicted from the leader's velocity and arrived at,
    /// so the follower settles into formation instead of overshooting.
    #[must_use]
    pub fn offset_pursuit<V, L>(&self, vehicle: &V, leader: &L, offset: Vec3) -> Vec3
    where
        V: Vehicle + ?Sized,
        L: Vehicle + ?Sized,
    {
        let slot = leader.local_to_world(offset);
        let to_slot = slot - vehicle.position();
        let look_ahead = look_ahead_time(to_slot.length(), vehicle.max_speed() + leader.speed());
        self.arrive(vehicle, slot + leader.velocity() * look_ahead)
    }

    /// Add `add` to `running_total` within the vehicle's force budget.
    ///
    /// Returns `false` once the budget is spent; see
    /// [`accumulate_force`](super::accumulate_force).
    pub fn accumulate<V: Vehicle + ?Sized>(
        &self,
        vehicle: &V,
        running_total: &mut Vec3,
        add: Vec3,
    ) -> bool {
        accumulate_force(vehicle.max_force(), running_total, add)
    }
}

fn look_ahead_time(distance: f32, speed: f32) -> f32 {
    if speed > 0.0 { distance / speed } else { 0.0 }
}
