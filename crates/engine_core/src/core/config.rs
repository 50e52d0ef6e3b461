//! # Unified Configuration
//!
//! Configuration for the simulation step, camera, culling and collision
//! subsystems. Everything here is plain serde data with defaults, so a
//! config file only needs to list the values it changes.

use serde::{Serialize, Deserialize};

use crate::camera::ProjectionType;
use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::physics::BroadPhaseKind;
use crate::spatial::OctreeConfig;

/// # Simulation Configuration
///
/// Fixed-step parameters for the simulation tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation ticks per second
    pub tick_rate_hz: f32,
    /// Upper bound on catch-up ticks run in a single frame
    pub max_ticks_per_frame: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_ticks_per_frame: 5,
        }
    }
}

/// # Camera Configuration
///
/// Initial placement and projection parameters for the active camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Full vertical field of view in degrees (perspective only)
    pub fov_degrees: f32,
    /// Near clipping distance
    pub z_near: f32,
    /// Far clipping distance
    pub z_far: f32,
    /// Projection kind
    pub projection: ProjectionType,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Initial camera position
    pub position: Vec3,
    /// Initial look-at target
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            z_near: 0.1,
            z_far: 1000.0,
            projection: ProjectionType::Perspective,
            viewport_width: 1280,
            viewport_height: 720,
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::zeros(),
        }
    }
}

/// # Culling Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Bounds scale for the render-pass visibility tier
    ///
    /// Shadow casters and animated objects lag culling by a frame; testing
    /// them against slightly inflated bounds avoids popping.
    pub render_pass_expansion: f32,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self { render_pass_expansion: 1.25 }
    }
}

/// # Collision Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Broad-phase strategy used by the collision pipeline
    pub broad_phase: BroadPhaseKind,
    /// Octree parameters (used by the octree broad phase and ray queries)
    pub octree: OctreeConfig,
    /// Half edge length of the cubic world region covered by the octree root
    pub world_half_extent: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            broad_phase: BroadPhaseKind::SweepAndPrune,
            octree: OctreeConfig::default(),
            world_half_extent: 512.0,
        }
    }
}

/// # Core Configuration
///
/// Root configuration loaded by applications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Log level used by `foundation::logging::init_with_level`
    pub log_level: String,
    /// Simulation step settings
    pub simulation: SimulationConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Culling settings
    pub culling: CullingConfig,
    /// Collision settings
    pub collision: CollisionConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            simulation: SimulationConfig::default(),
            camera: CameraConfig::default(),
            culling: CullingConfig::default(),
            collision: CollisionConfig::default(),
        }
    }
}

impl Config for CoreConfig {}

impl CoreConfig {
    /// Validate value ranges across all sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.simulation.tick_rate_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tick rate must be positive, got {}", self.simulation.tick_rate_hz
            )));
        }

        if self.simulation.max_ticks_per_frame == 0 {
            return Err(ConfigError::Invalid("max ticks per frame must be at least 1".to_string()));
        }

        if !(self.camera.z_near > 0.0) || self.camera.z_far <= self.camera.z_near {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.camera.z_near, self.camera.z_far
            )));
        }

        if self.camera.viewport_width == 0 || self.camera.viewport_height == 0 {
            return Err(ConfigError::Invalid("viewport must not be empty".to_string()));
        }

        if self.culling.render_pass_expansion < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "render pass expansion must be >= 1.0, got {}", self.culling.render_pass_expansion
            )));
        }

        if self.collision.octree.max_items_per_node == 0 {
            return Err(ConfigError::Invalid("octree node capacity must be at least 1".to_string()));
        }

        if !(self.collision.world_half_extent > 0.0) {
            return Err(ConfigError::Invalid("world half extent must be positive".to_string()));
        }

        Ok(())
    }
}
