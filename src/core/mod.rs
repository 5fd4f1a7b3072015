//! Core module
//!
//! Configuration, scenes and tick statistics

mod config;
mod debug;
mod scene;

pub use config::{ConfigError, SteeringConfig, Weights};
pub use debug::{TickSample, TickStats};
pub use scene::{Agent, Goals, Scene, SceneError};
