//! What steering needs to know about the world
//!
//! Behaviours only read positions, velocities and geometry, so they are
//! written against small provider traits. The plain structs here implement
//! them for tests, scenes and the demo; game code can implement the traits on
//! its own component types instead.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::VectorExt;

/// Anything with a position and a bounding radius (neighbours, obstacles)
pub trait Entity {
    /// World-space position
    fn position(&self) -> Vec3;

    /// Radius of the bounding circle/sphere
    fn bounding_radius(&self) -> f32;
}

/// A steerable agent
pub trait Vehicle: Entity {
    /// Current velocity
    fn velocity(&self) -> Vec3;

    /// Unit vector the vehicle is facing
    fn heading(&self) -> Vec3;

    /// Maximum speed
    fn max_speed(&self) -> f32;

    /// Maximum steering force, used as the accumulator budget
    fn max_force(&self) -> f32;

    /// Current speed
    fn speed(&self) -> f32 {
        self.velocity().length()
    }

    /// Unit vector perpendicular to the heading.
    ///
    /// The heading rotated a quarter turn counter-clockwise in the xy plane,
    /// or any perpendicular if the heading points along z.
    fn side(&self) -> Vec3 {
        let heading = self.heading();
        let side = Vec3::new(-heading.y, heading.x, 0.0).normalize_or_zero();
        if side.is_null() {
            heading.any_orthonormal_vector()
        } else {
            side
        }
    }

    /// Express a world-space point in the vehicle's frame
    /// (x forward, y side, z up)
    fn world_to_local(&self, point: Vec3) -> Vec3 {
        let heading = self.heading();
        let side = self.side();
        let up = heading.cross(side);
        let rel = point - self.position();
        Vec3::new(rel.dot(heading), rel.dot(side), rel.dot(up))
    }

    /// Inverse of [`Vehicle::world_to_local`]
    fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.position() + self.local_direction_to_world(local)
    }

    /// Rotate a local-space direction into world space, without translating
    fn local_direction_to_world(&self, local: Vec3) -> Vec3 {
        let heading = self.heading();
        let side = self.side();
        let up = heading.cross(side);
        heading * local.x + side * local.y + up * local.z
    }
}

/// A wall segment with a facing normal
pub trait Wall {
    /// First endpoint
    fn start(&self) -> Vec3;

    /// Second endpoint
    fn end(&self) -> Vec3;

    /// Unit normal pointing to the side vehicles are kept on
    fn normal(&self) -> Vec3;
}

impl<T: Entity + ?Sized> Entity for &T {
    fn position(&self) -> Vec3 {
        (**self).position()
    }

    fn bounding_radius(&self) -> f32 {
        (**self).bounding_radius()
    }
}

impl<T: Vehicle + ?Sized> Vehicle for &T {
    fn velocity(&self) -> Vec3 {
        (**self).velocity()
    }

    fn heading(&self) -> Vec3 {
        (**self).heading()
    }

    fn max_speed(&self) -> f32 {
        (**self).max_speed()
    }

    fn max_force(&self) -> f32 {
        (**self).max_force()
    }

    fn side(&self) -> Vec3 {
        (**self).side()
    }
}

/// Static round body, e.g. an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Centre
    pub position: Vec3,
    /// Bounding radius
    pub radius: f32,
}

impl Body {
    /// Create a body at `position`
    #[must_use]
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self { position, radius }
    }
}

impl Entity for Body {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn bounding_radius(&self) -> f32 {
        self.radius
    }
}

/// Kinematic state of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// World-space position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Unit facing direction
    pub heading: Vec3,
    /// Bounding radius
    pub radius: f32,
    /// Maximum speed
    pub max_speed: f32,
    /// Maximum steering force
    pub max_force: f32,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            heading: Vec3::X,
            radius: 0.5,
            max_speed: 1.0,
            max_force: 1.0,
        }
    }
}

impl VehicleState {
    /// Create a stationary vehicle facing +x
    #[must_use]
    pub fn new(position: Vec3, max_speed: f32, max_force: f32) -> Self {
        Self {
            position,
            max_speed,
            max_force,
            ..Default::default()
        }
    }

    /// Set the velocity, turning the heading to match when moving
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.set_velocity(velocity);
        self
    }

    /// Set the heading (normalized; zero is ignored)
    #[must_use]
    pub fn with_heading(mut self, heading: Vec3) -> Self {
        let heading = heading.normalize_or_zero();
        if !heading.is_null() {
            self.heading = heading;
        }
        self
    }

    /// Set the bounding radius
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Replace the velocity and keep the heading aligned with it.
    ///
    /// A stopped vehicle keeps its previous heading.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        let heading = velocity.normalize_or_zero();
        if !heading.is_null() {
            self.heading = heading;
        }
    }
}

impl Entity for VehicleState {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn bounding_radius(&self) -> f32 {
        self.radius
    }
}

impl Vehicle for VehicleState {
    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn heading(&self) -> Vec3 {
        self.heading
    }

    fn max_speed(&self) -> f32 {
        self.max_speed
    }

    fn max_force(&self) -> f32 {
        self.max_force
    }
}

/// Straight wall between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    /// First endpoint
    pub start: Vec3,
    /// Second endpoint
    pub end: Vec3,
    /// Unit facing normal
    pub normal: Vec3,
}

impl WallSegment {
    /// Create a wall whose normal faces left of `start -> end` in the xy plane
    #[must_use]
    pub fn new(start: Vec3, end: Vec3) -> Self {
        let dir = (end - start).normalize_or_zero();
        Self {
            start,
            end,
            normal: Vec3::new(-dir.y, dir.x, 0.0),
        }
    }

    /// Flip the facing normal
    #[must_use]
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }

    /// Midpoint of the segment
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }
}

impl Wall for WallSegment {
    fn start(&self) -> Vec3 {
        self.start
    }

    fn end(&self) -> Vec3 {
        self.end
    }

    fn normal(&self) -> Vec3 {
        self.normal
    }
}
