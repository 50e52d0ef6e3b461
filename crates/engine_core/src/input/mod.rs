//! Input helpers for picking
//!
//! Window events are pumped by the host application; this module only
//! keeps the cursor state needed to build picking rays.

pub mod picking;

pub use picking::MouseState;
