//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine core:
//! - Math types, rotation helpers and interpolation
//! - Frame timing and the fixed simulation step
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
