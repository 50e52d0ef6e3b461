//! Frame driver
//!
//! [`Engine::advance_frame`] enforces the ordering the rest of the core
//! relies on. Per simulation tick: snapshot previous state, let gameplay
//! mutate current state, run the broad phase to completion, run the narrow
//! phase, hand the contacts back to gameplay. Per render frame: blend every
//! object and the camera, rebuild the frustum from the blended camera and
//! the ray-query index from the blended objects, then evaluate visibility.

use thiserror::Error;

use crate::camera::Camera;
use crate::config::{Config, ConfigError};
use crate::core::CoreConfig;
use crate::foundation::math::Vec2;
use crate::foundation::time::FixedTimestep;
use crate::physics::{CollisionEvents, RayHit, TerrainIntersection};
use crate::scene::{FrameContext, ObjectId, World};

/// Gameplay hooks called by the frame driver
pub trait Simulation {
    /// Advance gameplay by one fixed tick, mutating current state only
    fn tick(&mut self, world: &mut World, camera: &mut Camera, delta_time: f32);

    /// Apply corrections for this tick's contacts
    ///
    /// The core never moves objects on its own; the default does nothing.
    fn resolve(&mut self, world: &mut World, events: &CollisionEvents, terrain: &[TerrainIntersection]) {
        let _ = (world, events, terrain);
    }
}

/// Statistics for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Simulation ticks run this frame
    pub ticks: u32,
    /// Blend factor used for the render state
    pub alpha: f32,
    /// Object/object intersections reported across all ticks
    pub intersections: usize,
    /// Object/terrain contacts reported across all ticks
    pub terrain_contacts: usize,
    /// Contacts that started across all ticks
    pub contacts_started: usize,
    /// Contacts that ended across all ticks
    pub contacts_ended: usize,
    /// Objects inside the exact-bounds tier
    pub visible: usize,
    /// Objects inside the expanded render-pass tier
    pub visible_for_render_pass: usize,
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded or is out of range
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Owns the world, the camera and the fixed-step clock
#[derive(Debug)]
pub struct Engine {
    config: CoreConfig,
    world: World,
    camera: Camera,
    timestep: FixedTimestep,
}

impl Engine {
    /// Create an engine from a validated configuration
    pub fn new(config: CoreConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Initializing engine core: {} Hz tick, {:?} broad phase",
            config.simulation.tick_rate_hz,
            config.collision.broad_phase
        );

        Ok(Self {
            world: World::new(&config.collision),
            camera: Camera::from_config(&config.camera),
            timestep: FixedTimestep::new(config.simulation.tick_rate_hz, config.simulation.max_ticks_per_frame),
            config,
        })
    }

    /// Load a TOML or RON configuration file and create the engine
    pub fn from_config_file(path: &str) -> Result<Self, EngineError> {
        let config = CoreConfig::load_from_file(path)?;
        log::info!("Loaded configuration from {path}");
        Self::new(config)
    }

    /// Active configuration
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Get the world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get the camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Get mutable access to the camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Fixed-step clock
    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    /// Run as many ticks as `frame_time` allows, then blend and cull
    pub fn advance_frame<S: Simulation + ?Sized>(&mut self, frame_time: f32, simulation: &mut S) -> FrameReport {
        let ticks = self.timestep.advance(frame_time);
        let mut report = FrameReport { ticks, ..FrameReport::default() };

        for _ in 0..ticks {
            let (events, terrain) = self.tick(simulation);
            report.intersections += events.intersections.len();
            report.contacts_started += events.started.len();
            report.contacts_ended += events.ended.len();
            report.terrain_contacts += terrain.len();
        }

        report.alpha = self.timestep.alpha();
        self.world.blend(report.alpha);
        self.camera.blend(report.alpha);
        self.world.rebuild_octree();

        let context = FrameContext::new(&self.camera, self.config.culling.render_pass_expansion);
        report.visible = self.world.update_visibility(&context);
        report.visible_for_render_pass = self
            .world
            .objects()
            .filter(|(_, object)| object.screen_space().inside_screen_space_for_render_pass)
            .count();

        log::trace!("Frame: {report:?}");
        report
    }

    /// Object under the cursor, as drawn in the last frame
    ///
    /// Uses the ray-query index when no object changed since the frame.
    pub fn pick(&self, cursor_ndc: &Vec2) -> Option<(ObjectId, RayHit)> {
        let context = FrameContext::new(&self.camera, self.config.culling.render_pass_expansion)
            .with_octree(self.world.octree());
        self.world.pick(&context, cursor_ndc)
    }

    fn tick<S: Simulation + ?Sized>(&mut self, simulation: &mut S) -> (CollisionEvents, Vec<TerrainIntersection>) {
        let delta_time = self.timestep.tick_duration();

        self.world.begin_tick();
        self.camera.snapshot();
        simulation.tick(&mut self.world, &mut self.camera, delta_time);

        let events = self.world.detect_collisions();
        let terrain = self.world.terrain_intersections();
        simulation.resolve(&mut self.world, &events, &terrain);

        (events, terrain)
    }
}
