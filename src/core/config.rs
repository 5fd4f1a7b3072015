//! Steering configuration
//!
//! Tuning parameters shared by the behaviours. Configs are plain serde data and
//! can be kept in RON or JSON files next to a scene.

use std::f32::consts::FRAC_PI_4;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ai::BehaviorKind;

/// Multipliers applied to each behaviour before it is accumulated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Wall avoidance
    pub wall_avoidance: f32,
    /// Obstacle avoidance
    pub obstacle_avoidance: f32,
    /// Evade
    pub evade: f32,
    /// Flee
    pub flee: f32,
    /// Separation
    pub separation: f32,
    /// Alignment
    pub alignment: f32,
    /// Cohesion
    pub cohesion: f32,
    /// Seek
    pub seek: f32,
    /// Arrive
    pub arrive: f32,
    /// Pursuit
    pub pursuit: f32,
    /// Offset pursuit
    pub offset_pursuit: f32,
    /// Wander
    pub wander: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            wall_avoidance: 10.0,
            obstacle_avoidance: 10.0,
            evade: 1.0,
            flee: 1.0,
            separation: 1.0,
            alignment: 1.0,
            cohesion: 1.0,
            seek: 1.0,
            arrive: 1.0,
            pursuit: 1.0,
            offset_pursuit: 1.0,
            wander: 1.0,
        }
    }
}

impl Weights {
    /// Weight for a behaviour
    #[must_use]
    pub fn get(&self, kind: BehaviorKind) -> f32 {
        match kind {
            BehaviorKind::WallAvoidance => self.wall_avoidance,
            BehaviorKind::ObstacleAvoidance => self.obstacle_avoidance,
            BehaviorKind::Evade => self.evade,
            BehaviorKind::Flee => self.flee,
            BehaviorKind::Separation => self.separation,
            BehaviorKind::Alignment => self.alignment,
            BehaviorKind::Cohesion => self.cohesion,
            BehaviorKind::Seek => self.seek,
            BehaviorKind::Arrive => self.arrive,
            BehaviorKind::Pursuit => self.pursuit,
            BehaviorKind::OffsetPursuit => self.offset_pursuit,
            BehaviorKind::Wander => self.wander,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (BehaviorKind, f32)> + '_ {
        BehaviorKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

/// Steering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Distance from an arrive target where the desired speed starts ramping down
    pub deceleration_radius: f32,
    /// Pursuit seeks the target directly when the heading dot product is below this
    pub pursuit_heading_threshold: f32,
    /// Default wander circle radius
    pub wander_radius: f32,
    /// Default distance of the wander circle ahead of the vehicle
    pub wander_distance: f32,
    /// Default maximum random displacement per wander call
    pub wander_jitter: f32,
    /// Keep wandering in the vehicle's horizontal plane
    pub planar: bool,
    /// Obstacle detection length at zero speed; doubles at max speed
    pub detection_box_length: f32,
    /// Strength of the braking part of obstacle avoidance
    pub braking_weight: f32,
    /// Extra clearance added around obstacles
    pub obstacle_margin: f32,
    /// Length of the forward whisker; side whiskers are half as long
    pub whisker_length: f32,
    /// Angle between the forward whisker and each side whisker, in radians
    pub whisker_angle: f32,
    /// Range used to pick flocking neighbours
    pub perception_radius: f32,
    /// Evaluation order for prioritized combination
    pub priorities: Vec<BehaviorKind>,
    /// Per-behaviour multipliers
    pub weights: Weights,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            deceleration_radius: 5.0,
            pursuit_heading_threshold: -0.95,
            wander_radius: 2.0,
            wander_distance: 1.0,
            wander_jitter: 3.0,
            planar: true,
            detection_box_length: 4.0,
            braking_weight: 0.2,
            obstacle_margin: 0.1,
            whisker_length: 4.0,
            whisker_angle: FRAC_PI_4,
            perception_radius: 5.0,
            priorities: BehaviorKind::ALL.to_vec(),
            weights: Weights::default(),
        }
    }
}

impl SteeringConfig {
    /// Set the arrive deceleration radius
    #[must_use]
    pub fn with_deceleration_radius(mut self, radius: f32) -> Self {
        self.deceleration_radius = radius;
        self
    }

    /// Set the default wander circle
    #[must_use]
    pub fn with_wander(mut self, radius: f32, distance: f32, jitter: f32) -> Self {
        self.wander_radius = radius;
        self.wander_distance = distance;
        self.wander_jitter = jitter;
        self
    }

    /// Set the flocking perception radius
    #[must_use]
    pub fn with_perception_radius(mut self, radius: f32) -> Self {
        self.perception_radius = radius;
        self
    }

    /// Set the whisker length and spread
    #[must_use]
    pub fn with_whiskers(mut self, length: f32, angle: f32) -> Self {
        self.whisker_length = length;
        self.whisker_angle = angle;
        self
    }

    /// Replace the priority order
    #[must_use]
    pub fn with_priorities(mut self, priorities: impl Into<Vec<BehaviorKind>>) -> Self {
        self.priorities = priorities.into();
        self
    }

    /// Replace the weights
    #[must_use]
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lengths = [
            ("deceleration_radius", self.deceleration_radius),
            ("wander_radius", self.wander_radius),
            ("wander_distance", self.wander_distance),
            ("wander_jitter", self.wander_jitter),
            ("detection_box_length", self.detection_box_length),
            ("braking_weight", self.braking_weight),
            ("obstacle_margin", self.obstacle_margin),
            ("whisker_length", self.whisker_length),
            ("perception_radius", self.perception_radius),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        if !self.whisker_angle.is_finite() {
            return Err(ConfigError::Invalid("whisker_angle must be finite".into()));
        }
        if !(-1.0..=1.0).contains(&self.pursuit_heading_threshold) {
            return Err(ConfigError::Invalid(format!(
                "pursuit_heading_threshold must be within [-1, 1], got {}",
                self.pursuit_heading_threshold
            )));
        }

        if let Some((kind, weight)) = self.weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "weight for {} is not finite: {weight}",
                kind.name()
            )));
        }

        for (i, kind) in self.priorities.iter().enumerate() {
            if self.priorities[..i].contains(kind) {
                return Err(ConfigError::Invalid(format!(
                    "{} listed twice in priorities",
                    kind.name()
                )));
            }
        }

        Ok(())
    }

    /// Load and validate a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Self =
            ron::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.checked(path)
    }

    /// Load and validate a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.checked(path)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Save the config to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    fn checked(self, path: &Path) -> Result<Self, ConfigError> {
        if let Err(e) = self.validate() {
            log::warn!("Rejected steering config {}: {e}", path.display());
            return Err(e);
        }
        log::debug!("Loaded steering config from {}", path.display());
        Ok(self)
    }
}

/// Errors that can occur while loading or saving a config
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
