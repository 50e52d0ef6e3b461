//! Headless collision sandbox
//!
//! Drops a crowd of crates with random velocities onto a bumpy terrain and
//! drives the full frame pipeline without a window: fixed ticks, broad and
//! narrow phase, contact response, blending and culling. Statistics are
//! written to the log.
//!
//! Usage: `collision_sandbox [config.toml|config.ron]`

use engine_core::foundation::logging;
use engine_core::foundation::time::Timer;
use engine_core::prelude::*;
use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;

const CRATE_COUNT: usize = 64;
const FRAME_COUNT: u32 = 600;
const FRAME_TIME: f32 = 1.0 / 60.0;
const GRAVITY: f32 = 9.8;
const ARENA_HALF: f32 = 24.0;
const ORBIT_DISTANCE: f32 = 40.0;
const ORBIT_DEGREES_PER_SECOND: f32 = 20.0;

/// Sandbox errors
#[derive(Error, Debug)]
enum SandboxError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Terrain error: {0}")]
    Terrain(#[from] engine_core::physics::GeometryError),
}

/// Ballistic crates with a naive contact response
struct CrateSimulation {
    velocities: HashMap<ObjectId, Vec3>,
}

impl Simulation for CrateSimulation {
    fn tick(&mut self, world: &mut World, camera: &mut Camera, dt: f32) {
        for (id, velocity) in &mut self.velocities {
            velocity.y -= GRAVITY * dt;
            if let Some(object) = world.get_mut(*id) {
                object.translate(&(*velocity * dt));
            }
        }

        // Keep everything inside the arena walls
        for (id, object) in world.objects_mut() {
            let position = object.current().position();
            let clamped = Vec3::new(
                position.x.clamp(-ARENA_HALF, ARENA_HALF),
                position.y,
                position.z.clamp(-ARENA_HALF, ARENA_HALF),
            );
            if clamped != position {
                object.set_position(clamped);
                if let Some(velocity) = self.velocities.get_mut(&id) {
                    velocity.x = -velocity.x;
                    velocity.z = -velocity.z;
                }
            }
        }

        // Slow orbit so objects drift in and out of the frustum
        camera.arc_ball(&Vec3::zeros(), ORBIT_DEGREES_PER_SECOND * dt, 0.0, ORBIT_DISTANCE);
    }

    fn resolve(&mut self, world: &mut World, events: &CollisionEvents, terrain: &[TerrainIntersection]) {
        for contact in &events.intersections {
            if let Some(object) = world.get_mut(contact.caller) {
                object.translate(&(contact.minimum_translation_vector * 0.5));
            }
            if let Some(velocity) = self.velocities.get_mut(&contact.caller) {
                let normal = contact.collision_surface_normal;
                let into = velocity.dot(&normal);
                if into < 0.0 {
                    *velocity -= normal * into;
                }
            }
        }

        for contact in terrain {
            if let Some(object) = world.get_mut(contact.caller) {
                object.translate(&contact.minimum_translation_vector_vertical);
            }
            if let Some(velocity) = self.velocities.get_mut(&contact.caller) {
                velocity.y = velocity.y.max(0.0);
                *velocity *= 0.98;
            }
        }
    }
}

/// Gently rolling terrain grid centred on the origin
fn build_terrain() -> Result<TerrainCollider, SandboxError> {
    const CELLS: u32 = 16;
    let cell_size = ARENA_HALF * 2.0 / CELLS as f32;

    let mut positions = Vec::new();
    for z in 0..=CELLS {
        for x in 0..=CELLS {
            let wx = -ARENA_HALF + x as f32 * cell_size;
            let wz = -ARENA_HALF + z as f32 * cell_size;
            let height = (wx * 0.2).sin() * (wz * 0.2).cos();
            positions.push(Vec3::new(wx, height, wz));
        }
    }

    let mut indices = Vec::new();
    let row = CELLS + 1;
    for z in 0..CELLS {
        for x in 0..CELLS {
            let i = z * row + x;
            indices.extend_from_slice(&[i, i + row, i + 1, i + 1, i + row, i + row + 1]);
        }
    }

    Ok(TerrainCollider::from_mesh("rolling_hills", &positions, &indices, cell_size * 2.0)?)
}

fn run() -> Result<(), SandboxError> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::load_from_file(&path).map_err(EngineError::from)?,
        None => CoreConfig::default(),
    };
    logging::init_with_level(&config.log_level);

    let mut engine = Engine::new(config)?;
    engine.world_mut().add_terrain(build_terrain()?);

    let mut rng = rand::thread_rng();
    let mut simulation = CrateSimulation { velocities: HashMap::new() };
    engine.camera_mut().arc_ball(&Vec3::zeros(), 0.0, -35.0, ORBIT_DISTANCE);
    engine.camera_mut().reset_history();
    for i in 0..CRATE_COUNT {
        let position = Vec3::new(
            rng.gen_range(-ARENA_HALF..ARENA_HALF),
            rng.gen_range(4.0..20.0),
            rng.gen_range(-ARENA_HALF..ARENA_HALF),
        );
        let half = rng.gen_range(0.3..1.0);
        let id = engine.world_mut().spawn(
            GameObject::new(format!("crate_{i}"), EntityState::from_position(position))
                .with_hitbox(HitboxTemplate::cuboid(Vec3::new(half, half, half))),
        );
        let velocity = Vec3::new(rng.gen_range(-3.0..3.0), 0.0, rng.gen_range(-3.0..3.0));
        simulation.velocities.insert(id, velocity);
    }
    log::info!("Spawned {} crates", engine.world().len());

    let mut timer = Timer::new();
    let mut totals = FrameReport::default();
    for frame in 0..FRAME_COUNT {
        let report = engine.advance_frame(FRAME_TIME, &mut simulation);
        timer.update();
        totals.ticks += report.ticks;
        totals.intersections += report.intersections;
        totals.terrain_contacts += report.terrain_contacts;
        totals.contacts_started += report.contacts_started;
        totals.contacts_ended += report.contacts_ended;

        if frame % 120 == 0 {
            log::info!(
                "Frame {frame}: {} visible, {} in render pass, {} contacts",
                report.visible,
                report.visible_for_render_pass,
                report.intersections
            );
        }
    }

    let instances = engine.world().render_instances();
    let center_pick = engine.pick(&Vec2::zeros()).and_then(|(id, _)| engine.world().get(id));

    log::info!(
        "Simulated {} ticks in {:.3}s ({:.0} frames/s): {} object contacts ({} started, {} ended), {} terrain contacts",
        totals.ticks,
        timer.total_time(),
        timer.average_fps(),
        totals.intersections,
        totals.contacts_started,
        totals.contacts_ended,
        totals.terrain_contacts
    );
    log::info!(
        "{} render instances ({} bytes), object under screen centre: {}",
        instances.len(),
        instances.len() * std::mem::size_of::<RenderInstance>(),
        center_pick.map_or("none", GameObject::name)
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("collision_sandbox: {e}");
        std::process::exit(1);
    }
}
