//! AI module
//!
//! Provides vehicle and entity abstractions, steering behaviours, force
//! accumulation, prioritized combination and neighbour lookups.

mod accumulator;
mod agent;
mod neighbours;
mod priority;
mod steering;

pub use accumulator::{ForceAccumulator, accumulate_force};
pub use agent::{Body, Entity, Vehicle, VehicleState, Wall, WallSegment};
pub use neighbours::NeighbourGrid;
pub use priority::{BehaviorKind, SteeringInputs};
pub use steering::Steering;
