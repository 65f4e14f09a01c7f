//! Simulation clock.
//!
//! The host owns the render loop and hands a raw frame delta to
//! [`crate::RainSimulation::step`]; the clock turns it into the delta the
//! subsystems actually see, honoring pause, a fixed step and a time scale.
//!
//! # Example
//!
//! ```ignore
//! use rainfx::SimClock;
//!
//! let mut clock = SimClock::new();
//! clock.set_fixed_delta(Some(1.0 / 60.0));
//! clock.set_time_scale(0.5);
//!
//! let dt = clock.advance(frame_seconds); // 1/120
//! println!("t = {:.2}s, tick {}", clock.elapsed(), clock.tick());
//! ```

/// Time tracking for the simulation.
///
/// Elapsed time is simulation time: the sum of every delta handed out,
/// so pausing or scaling never lets it drift from what the subsystems saw.
#[derive(Clone, Debug, PartialEq)]
pub struct SimClock {
    /// Total simulated seconds.
    elapsed: f64,
    /// Delta handed out by the last advance.
    delta: f32,
    /// Ticks advanced while running.
    tick: u64,
    paused: bool,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            tick: 0,
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Consume one frame of `raw_delta` seconds and return the simulation
    /// delta for this tick (0 while paused).
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        if self.paused {
            self.delta = 0.0;
            return 0.0;
        }
        self.delta = self.fixed_delta.unwrap_or(raw_delta.max(0.0)) * self.time_scale;
        self.elapsed += self.delta as f64;
        self.tick += 1;
        self.delta
    }

    /// Simulated seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    #[inline]
    pub fn fixed_delta(&self) -> Option<f32> {
        self.fixed_delta
    }

    /// While paused, `advance` returns 0 and neither elapsed time nor the
    /// tick counter moves.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Use `delta` for every tick regardless of the frame time.
    /// Pass `None` to follow the host's frame deltas.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.map(|d| d.max(0.0));
    }

    /// Set time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed (slow motion)
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Back to zero; pause state, fixed delta and scale are kept.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.delta = 0.0;
        self.tick = 0;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}
