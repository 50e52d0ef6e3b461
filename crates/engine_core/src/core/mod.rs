//! # Core Module
//!
//! Shared configuration for every subsystem of the core. The individual
//! subsystems only see their own section; [`CoreConfig`] ties them together
//! and is what binaries load from disk.

pub mod config;

pub use config::{
    CoreConfig,
    SimulationConfig,
    CameraConfig,
    CullingConfig,
    CollisionConfig,
};
pub use crate::config::{Config, ConfigError, ConfigFormat};
