//! Previous/current/render triple and the blend step

use super::EntityState;
use crate::foundation::math::utils;

/// Interpolate between two states
///
/// `alpha` is clamped to `[0, 1]`. Position and scale use
/// `lerp(previous, current, alpha)`, rotation uses `slerp` in the same
/// direction, so `alpha = 0` yields `previous` and `alpha = 1` yields
/// `current` for every field.
pub fn blend(previous: &EntityState, current: &EntityState, alpha: f32) -> EntityState {
    let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 };

    // Exact endpoints keep blend(S, S, a) == S bit-for-bit
    if previous == current || alpha >= 1.0 {
        return current.clone();
    }
    if alpha <= 0.0 {
        return previous.clone();
    }

    EntityState::from_trs(
        utils::lerp_vec3(&previous.position(), &current.position(), alpha),
        utils::slerp(&previous.rotation(), &current.rotation(), alpha),
        utils::lerp_vec3(&previous.scale(), &current.scale(), alpha),
    )
}

/// The three lifecycle copies of an entity's spatial state
#[derive(Debug, Clone, Default)]
pub struct StateSlots {
    previous: EntityState,
    current: EntityState,
    render: EntityState,
}

impl StateSlots {
    /// Start with all three slots equal to `initial`
    pub fn new(initial: EntityState) -> Self {
        Self {
            previous: initial.clone(),
            current: initial.clone(),
            render: initial,
        }
    }

    /// State at the start of the current tick
    pub fn previous(&self) -> &EntityState {
        &self.previous
    }

    /// Authoritative simulation state
    pub fn current(&self) -> &EntityState {
        &self.current
    }

    /// Mutable access to the simulation state
    pub fn current_mut(&mut self) -> &mut EntityState {
        &mut self.current
    }

    /// Interpolated state used for drawing
    pub fn render(&self) -> &EntityState {
        &self.render
    }

    /// Copy `current` into `previous`; call once per tick before mutation
    pub fn snapshot(&mut self) {
        self.previous.clone_from(&self.current);
    }

    /// Write the interpolated state into the render slot
    pub fn blend(&mut self, alpha: f32) {
        self.render = blend(&self.previous, &self.current, alpha);
    }

    /// Overwrite every slot, skipping interpolation (teleports, spawns)
    pub fn reset(&mut self, state: EntityState) {
        self.previous = state.clone();
        self.current = state.clone();
        self.render = state;
    }
}
