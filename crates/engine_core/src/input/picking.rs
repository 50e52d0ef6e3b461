//! Mouse state for picking operations
//!
//! Converts screen-space cursor coordinates (pixels, origin top-left, Y
//! down) into Normalized Device Coordinates with Y up, which is what the
//! camera's unprojection expects.

use crate::foundation::math::Vec2;

/// Mouse state for picking operations
#[derive(Debug, Clone)]
pub struct MouseState {
    /// Current screen-space X position (pixels)
    pub screen_x: f64,
    /// Current screen-space Y position (pixels)
    pub screen_y: f64,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
}

impl MouseState {
    /// Create a new mouse state for a window of the given size
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            screen_x: 0.0,
            screen_y: 0.0,
            window_width: window_width.max(1),
            window_height: window_height.max(1),
        }
    }

    /// Cursor position in NDC
    ///
    /// X: -1 = left, +1 = right. Y: -1 = bottom, +1 = top.
    pub fn cursor_ndc(&self) -> Vec2 {
        let ndc_x = (self.screen_x / f64::from(self.window_width)) as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - (self.screen_y / f64::from(self.window_height)) as f32 * 2.0;
        Vec2::new(ndc_x, ndc_y)
    }

    /// Update mouse position from window events
    pub fn update_position(&mut self, x: f64, y: f64) {
        self.screen_x = x;
        self.screen_y = y;
    }

    /// Update window size (for NDC conversion)
    pub fn update_window_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring zero-sized window {width}x{height} for cursor mapping");
            return;
        }
        self.window_width = width;
        self.window_height = height;
    }
}
