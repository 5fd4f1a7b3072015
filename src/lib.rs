//! Steering behaviours for autonomous agents
//!
//! This crate provides:
//! - Vector helpers and geometric queries (distances, intersections, rotations)
//! - Steering behaviours: seek, flee, arrive, pursuit, evade, wander, obstacle
//!   and wall avoidance, flocking and offset pursuit
//! - A bounded force accumulator and prioritized combination
//! - Serializable configuration and scenes

pub mod ai;
pub mod core;
pub mod math;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        BehaviorKind, Body, Entity, ForceAccumulator, NeighbourGrid, Steering, SteeringInputs,
        Vehicle, VehicleState, Wall, WallSegment, accumulate_force,
    };
    pub use crate::core::{Agent, Goals, Scene, SteeringConfig, TickStats, Weights};
    pub use crate::math::VectorExt;
    pub use glam::{Quat, Vec2, Vec3};
}
