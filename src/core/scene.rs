//! Scene description and per-tick force pass
//!
//! A scene holds the static geometry (obstacles, walls) and the agents with
//! their goals. It can be saved and loaded in RON (Rusty Object Notation) or
//! JSON.
//!
//! [`Scene::compute_forces`] reads the scene through `&self`, so every agent
//! sees the same snapshot of positions no matter in which order they are
//! processed. The caller integrates the returned forces afterwards.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ai::{Body, NeighbourGrid, Steering, SteeringInputs, VehicleState, WallSegment};
use crate::core::SteeringConfig;

/// What an agent is trying to do. Indices refer to other agents in the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Goals {
    /// Point to seek
    pub seek: Option<Vec3>,
    /// Point to flee from
    pub flee: Option<Vec3>,
    /// Point to arrive at
    pub arrive: Option<Vec3>,
    /// Agent to pursue
    pub pursue: Option<usize>,
    /// Agent to evade
    pub evade: Option<usize>,
    /// Agent to follow, and the offset to hold in its frame
    pub follow: Option<(usize, Vec3)>,
    /// Wander when nothing else is going on
    pub wander: bool,
    /// Take part in flocking with nearby agents
    pub flock: bool,
}

/// A vehicle in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Optional agent name
    pub name: Option<String>,
    /// Kinematic state
    pub state: VehicleState,
    /// Goals
    #[serde(default)]
    pub goals: Goals,
}

impl Agent {
    /// Create an agent with no goals
    #[must_use]
    pub fn new(state: VehicleState) -> Self {
        Self {
            name: None,
            state,
            goals: Goals::default(),
        }
    }

    /// Set the name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the goals
    #[must_use]
    pub fn with_goals(mut self, goals: Goals) -> Self {
        self.goals = goals;
        self
    }
}

/// A serializable scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name
    pub name: String,
    /// Scene version for compatibility
    pub version: u32,
    /// Static round obstacles
    #[serde(default)]
    pub obstacles: Vec<Body>,
    /// Walls
    #[serde(default)]
    pub walls: Vec<WallSegment>,
    /// Agents
    #[serde(default)]
    pub agents: Vec<Agent>,
}

impl Scene {
    /// Create a new empty scene
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            obstacles: Vec::new(),
            walls: Vec::new(),
            agents: Vec::new(),
        }
    }

    /// Add an obstacle
    pub fn add_obstacle(&mut self, obstacle: Body) {
        self.obstacles.push(obstacle);
    }

    /// Add a wall
    pub fn add_wall(&mut self, wall: WallSegment) {
        self.walls.push(wall);
    }

    /// Add an agent to the scene, returning its index
    pub fn add_agent(&mut self, agent: Agent) -> usize {
        let index = self.agents.len();
        self.agents.push(agent);
        index
    }

    /// One steering instance per agent, seeded from `seed` and the agent index
    #[must_use]
    pub fn spawn_steering(&self, config: &SteeringConfig, seed: u64) -> Vec<Steering> {
        (0..self.agents.len())
            .map(|i| Steering::with_seed(config.clone(), seed.wrapping_add(i as u64)))
            .collect()
    }

    /// Compute the steering force of every agent from the current snapshot.
    ///
    /// `steering[i]` drives `agents[i]`. Goals pointing at missing agents are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if there is not exactly one steering instance per
    /// agent, or if [`Scene::validate`] fails
    pub fn compute_forces(
        &self,
        steering: &mut [Steering],
        grid: &mut NeighbourGrid,
    ) -> Result<Vec<Vec3>, SceneError> {
        if steering.len() != self.agents.len() {
            return Err(SceneError::SteeringMismatch {
                agents: self.agents.len(),
                steering: steering.len(),
            });
        }
        self.validate()?;

        grid.rebuild(self.agents.iter().map(|a| a.state.position));
        let largest_radius = self
            .agents
            .iter()
            .map(|a| a.state.radius)
            .fold(0.0_f32, f32::max);

        let mut forces = Vec::with_capacity(self.agents.len());
        for (i, (agent, steering)) in self.agents.iter().zip(steering.iter_mut()).enumerate() {
            let goals = &agent.goals;

            let neighbours: SmallVec<[&VehicleState; 16]> = if goals.flock {
                let radius = steering.config().perception_radius + largest_radius;
                grid.query(i, radius)
                    .into_iter()
                    .map(|j| &self.agents[j].state)
                    .collect()
            } else {
                SmallVec::new()
            };

            let inputs: SteeringInputs = SteeringInputs {
                obstacles: self.obstacles.as_slice(),
                walls: self.walls.as_slice(),
                neighbours: neighbours.as_slice(),
                seek: goals.seek,
                flee: goals.flee,
                arrive: goals.arrive,
                pursue: self.other_state(i, goals.pursue),
                evade: self.other_state(i, goals.evade),
                follow: goals
                    .follow
                    .and_then(|(j, offset)| self.other_state(i, Some(j)).map(|s| (s, offset))),
                wander: goals.wander,
            };

            forces.push(steering.calculate_prioritized(&agent.state, &inputs));
        }

        Ok(forces)
    }

    /// Check that every size and limit is finite and non-negative and that
    /// every position and velocity is finite
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Invalid`] naming the first offending value
    pub fn validate(&self) -> Result<(), SceneError> {
        fn non_negative(item: (&str, usize), field: &str, value: f32) -> Result<(), SceneError> {
            if value.is_finite() && value >= 0.0 {
                return Ok(());
            }
            let (list, i) = item;
            Err(SceneError::Invalid(format!(
                "{list}[{i}].{field} must be finite and >= 0, got {value}"
            )))
        }

        fn finite(item: (&str, usize), field: &str, value: Vec3) -> Result<(), SceneError> {
            if value.is_finite() {
                return Ok(());
            }
            let (list, i) = item;
            Err(SceneError::Invalid(format!("{list}[{i}].{field} must be finite, got {value}")))
        }

        for (i, agent) in self.agents.iter().enumerate() {
            let (item, state) = (("agents", i), &agent.state);
            non_negative(item, "radius", state.radius)?;
            non_negative(item, "max_speed", state.max_speed)?;
            non_negative(item, "max_force", state.max_force)?;
            finite(item, "position", state.position)?;
            finite(item, "velocity", state.velocity)?;
        }
        for (i, obstacle) in self.obstacles.iter().enumerate() {
            let item = ("obstacles", i);
            non_negative(item, "radius", obstacle.radius)?;
            finite(item, "position", obstacle.position)?;
        }
        Ok(())
    }

    fn other_state(&self, me: usize, other: Option<usize>) -> Option<&VehicleState> {
        other
            .filter(|&j| j != me)
            .and_then(|j| self.agents.get(j))
            .map(|a| &a.state)
    }

    /// Save the scene to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, deserialization fails or
    /// the scene does not validate
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: Scene =
            ron::from_str(&content).map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Save the scene to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, deserialization fails or
    /// the scene does not validate
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: Scene = serde_json::from_str(&content)
            .map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Get the number of agents
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Errors that can occur during scene operations
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// Steering instances do not line up with agents
    SteeringMismatch { agents: usize, steering: usize },
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::SteeringMismatch { agents, steering } => write!(
                f,
                "{steering} steering instances for {agents} agents"
            ),
            Self::Invalid(e) => write!(f, "Invalid scene: {e}"),
        }
    }
}

impl std::error::Error for SceneError {}
