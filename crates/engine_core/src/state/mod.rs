//! Dual-state object model
//!
//! Every simulated entity carries three independent copies of its spatial
//! state:
//!
//! - `previous`: snapshot of `current` taken at the start of each tick
//! - `current`: the authoritative state mutated by gameplay and physics
//! - `render`: interpolated between the two for drawing
//!
//! The per-frame order is fixed: [`StateSlots::snapshot`], then mutation of
//! `current`, then [`StateSlots::blend`].

mod entity_state;
mod slots;

pub use entity_state::EntityState;
pub use slots::{blend, StateSlots};
