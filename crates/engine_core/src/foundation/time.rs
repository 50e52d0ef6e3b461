//! Time management utilities
//!
//! [`Timer`] measures real frame time; [`FixedTimestep`] turns that frame
//! time into a whole number of simulation ticks plus the blend factor used
//! to interpolate render state between the last two ticks.

use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Fixed-step accumulator for the simulation tick
///
/// Frame time is accumulated and consumed in whole ticks. Whatever is left
/// over, divided by the tick duration, is the blend alpha for the render
/// state: `0.0` right after a tick, approaching `1.0` just before the next.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick_duration: f32,
    accumulator: f32,
    max_ticks_per_frame: u32,
    tick_count: u64,
}

impl FixedTimestep {
    /// Create an accumulator running at `tick_rate_hz` ticks per second
    ///
    /// `max_ticks_per_frame` bounds catch-up work after a long stall; any
    /// time beyond that is dropped.
    pub fn new(tick_rate_hz: f32, max_ticks_per_frame: u32) -> Self {
        let tick_rate_hz = if tick_rate_hz > 0.0 { tick_rate_hz } else {
            log::warn!("Invalid tick rate {tick_rate_hz}, falling back to 60 Hz");
            60.0
        };
        Self {
            tick_duration: 1.0 / tick_rate_hz,
            accumulator: 0.0,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            tick_count: 0,
        }
    }

    /// Duration of one simulation tick in seconds
    pub fn tick_duration(&self) -> f32 {
        self.tick_duration
    }

    /// Total ticks consumed so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Add frame time and return how many ticks must run this frame
    pub fn advance(&mut self, delta_time: f32) -> u32 {
        if delta_time.is_finite() && delta_time > 0.0 {
            self.accumulator += delta_time;
        }

        let mut ticks = 0;
        while self.accumulator >= self.tick_duration && ticks < self.max_ticks_per_frame {
            self.accumulator -= self.tick_duration;
            ticks += 1;
        }

        if ticks == self.max_ticks_per_frame && self.accumulator >= self.tick_duration {
            log::debug!(
                "Dropping {:.3}s of simulation time after {} catch-up ticks",
                self.accumulator,
                ticks
            );
            self.accumulator %= self.tick_duration;
        }

        self.tick_count += u64::from(ticks);
        ticks
    }

    /// Blend factor in `[0, 1]`: time since the last tick over tick duration
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.tick_duration).clamp(0.0, 1.0)
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(60.0, 5)
    }
}
