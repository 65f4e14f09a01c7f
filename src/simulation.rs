//! Simulation driver.
//!
//! [`RainSimulation`] owns both subsystems and a [`SimClock`]. The wind
//! side (cascade plus field generator) and the surface automaton share no
//! state, so with [`SimulationConfig::parallel`] set they are stepped on
//! two rayon tasks.
//!
//! ```ignore
//! let mut sim = RainSimulation::new(&SimulationConfig::default().with_seed(7))?;
//! sim.surface_mut().add_drop(32, 60, Vec2::ZERO)?;
//! loop {
//!     sim.step(frame_seconds);
//!     upload(sim.wind().composite_bytes(), sim.surface().flow_map());
//! }
//! ```

use crate::cascade::{CascadeEvent, CascadeStats, EnergyCascade};
use crate::clock::SimClock;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::rainflow::{RainFlow, SurfaceEvent};
use crate::wind::WindFieldGenerator;

/// Mixed into the session seed for the surface automaton so the two
/// subsystems draw from independent streams.
pub const SURFACE_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Aggregate state of a running session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationStats {
    pub tick: u64,
    pub elapsed: f32,
    pub cascade: CascadeStats,
    pub droplets: usize,
    /// Water mass on the surface.
    pub surface_mass: f32,
}

/// Events raised by the most recent [`RainSimulation::step`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationEvents {
    pub cascade: Vec<CascadeEvent>,
    pub surface: Vec<SurfaceEvent>,
}

/// A rain session: wind cascade, wind field and surface flow.
pub struct RainSimulation {
    config: SimulationConfig,
    cascade: EnergyCascade,
    wind: WindFieldGenerator,
    surface: RainFlow,
    clock: SimClock,
}

impl RainSimulation {
    /// Build every subsystem and seed the cascade from the global wind.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut cascade = EnergyCascade::new(&config.cascade, &config.wind, config.seed)?;
        cascade.reset(config.wind.global_wind.length());
        let mut wind = WindFieldGenerator::new(&config.wind)?;
        wind.update(&cascade);
        let surface = RainFlow::new(&config.surface, config.seed ^ SURFACE_SEED_SALT)?;

        log::info!(
            "rain simulation ready: seed {}, {} composites, {}x{} surface, parallel {}",
            config.seed,
            cascade.len(),
            config.surface.size,
            config.surface.size,
            config.parallel
        );
        Ok(Self { config: config.clone(), cascade, wind, surface, clock: SimClock::new() })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn cascade(&self) -> &EnergyCascade {
        &self.cascade
    }

    pub fn cascade_mut(&mut self) -> &mut EnergyCascade {
        &mut self.cascade
    }

    pub fn wind(&self) -> &WindFieldGenerator {
        &self.wind
    }

    pub fn surface(&self) -> &RainFlow {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut RainFlow {
        &mut self.surface
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimClock {
        &mut self.clock
    }

    /// Advance one frame of `raw_delta` seconds and return the delta the
    /// subsystems were stepped with. Nothing moves while the clock is paused.
    pub fn step(&mut self, raw_delta: f32) -> f32 {
        let dt = self.clock.advance(raw_delta);
        if dt <= 0.0 {
            return 0.0;
        }

        let Self { cascade, wind, surface, config, .. } = self;
        if config.parallel {
            rayon::join(
                || {
                    cascade.step(dt);
                    wind.update(cascade);
                },
                || surface.step(dt),
            );
        } else {
            cascade.step(dt);
            wind.update(cascade);
            surface.step(dt);
        }
        dt
    }

    /// Reseed the cascade for a new wind magnitude and refresh the field.
    pub fn reset_wind(&mut self, wind_magnitude: f32) {
        self.cascade.reset(wind_magnitude);
        self.wind.update(&self.cascade);
    }

    /// Back to the initial state: cascade reseeded from the global wind,
    /// surface dried, clock at zero.
    pub fn reset(&mut self) {
        self.reset_wind(self.config.wind.global_wind.length());
        self.surface.clear_water();
        self.clock.reset();
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            tick: self.clock.tick(),
            elapsed: self.clock.elapsed(),
            cascade: self.cascade.stats(),
            droplets: self.surface.len(),
            surface_mass: self.surface.total_mass(),
        }
    }

    /// Take both subsystems' events. Each step discards whatever the
    /// previous one left undrained.
    pub fn drain_events(&mut self) -> SimulationEvents {
        SimulationEvents {
            cascade: self.cascade.drain_events(),
            surface: self.surface.drain_events(),
        }
    }
}
