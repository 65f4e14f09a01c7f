//! The energy cascade.
//!
//! The cascade owns the population of [`CompositePrimitive`]s and runs a
//! closed energy economy over it. Each tick every composite is classified
//! by size into a [`SizeBand`] and loses energy:
//!
//! | Band | Condition | Loses energy by |
//! |------|-----------|-----------------|
//! | Tall | `size > min_size_tall` | transfer into bucket 1 |
//! | Medium | `min_size_medium < size ≤ min_size_tall` | transfer into bucket 0 and dissipation |
//! | Small | `size ≤ min_size_medium` | dissipation |
//!
//! with rates
//!
//! ```text
//! transfer    = (speed / energy_speed) * size * coeff_transfer
//! dissipation = (speed / energy_speed) * coeff_dissip / size
//! ```
//!
//! After collection a diffusion pass leaks part of each bucket into the
//! dissipation pool, hands bucket 1 to medium composites and bucket 0 to
//! small ones, folds leftovers into the pool, removes exhausted small
//! composites and spawns a new composite once the pool holds a full mean
//! energy. Energy only enters or leaves the system through that pool, so
//! `Σ size + pool + buckets` never grows.

use crate::composite::{CompositeId, CompositePrimitive};
use crate::config::{CascadeConfig, WindConfig};
use crate::error::Result;
use crate::math::{normal_energy, uniform_energy, Bounds, SimRng};
use crate::path::WindPath;
use glam::Vec3;
use rand::SeedableRng;

/// Size band of a composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeBand {
    Tall,
    Medium,
    Small,
}

impl SizeBand {
    /// Classify `size` against the configured thresholds.
    pub fn classify(size: f32, config: &CascadeConfig) -> Self {
        if size > config.min_size_tall {
            SizeBand::Tall
        } else if size > config.min_size_medium {
            SizeBand::Medium
        } else {
            SizeBand::Small
        }
    }
}

/// Population change reported to whoever owns per-primitive resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeEvent {
    Spawned(CompositeId),
    Destroyed(CompositeId),
}

/// Read-only view of one composite for visualization layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimitiveDiagnostic {
    pub id: CompositeId,
    /// World-space anchor.
    pub position: Vec3,
    pub size: f32,
    pub band: SizeBand,
}

/// Aggregate state of the cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CascadeStats {
    pub population: usize,
    pub total_size: f32,
    pub dissipated: f32,
    pub transfer: [f32; 2],
}

impl CascadeStats {
    /// Sizes plus every accumulator.
    pub fn total_energy(&self) -> f32 {
        self.total_size + self.dissipated + self.transfer[0] + self.transfer[1]
    }
}

/// Owner of the composite population and its energy accumulators.
pub struct EnergyCascade {
    config: CascadeConfig,
    bounds: Bounds,
    path: WindPath,
    wind_direction: Vec3,
    composites: Vec<CompositePrimitive>,
    /// Transfer buckets: `[0]` fed by medium composites, `[1]` by tall ones.
    transfer: [f32; 2],
    /// Dissipation pool.
    dissipated: f32,
    next_id: CompositeId,
    rng: SimRng,
    events: Vec<CascadeEvent>,
}

impl EnergyCascade {
    /// Create an empty cascade. Call [`EnergyCascade::reset`] to populate it.
    pub fn new(config: &CascadeConfig, wind: &WindConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        wind.validate()?;
        Ok(Self {
            config: config.clone(),
            bounds: wind.bounds,
            path: wind.resolved_path(),
            wind_direction: wind.global_wind,
            composites: Vec::new(),
            transfer: [0.0; 2],
            dissipated: 0.0,
            next_id: 0,
            rng: SimRng::seed_from_u64(seed),
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub fn path(&self) -> &WindPath {
        &self.path
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Live composites in creation order.
    pub fn composites(&self) -> &[CompositePrimitive] {
        &self.composites
    }

    pub fn len(&self) -> usize {
        self.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composites.is_empty()
    }

    pub fn dissipated(&self) -> f32 {
        self.dissipated
    }

    pub fn transfer(&self) -> [f32; 2] {
        self.transfer
    }

    pub fn stats(&self) -> CascadeStats {
        CascadeStats {
            population: self.composites.len(),
            total_size: self.composites.iter().map(CompositePrimitive::size).sum(),
            dissipated: self.dissipated,
            transfer: self.transfer,
        }
    }

    pub fn total_energy(&self) -> f32 {
        self.stats().total_energy()
    }

    /// One entry per composite.
    pub fn diagnostics(&self) -> Vec<PrimitiveDiagnostic> {
        self.composites
            .iter()
            .map(|c| PrimitiveDiagnostic {
                id: c.id(),
                position: c.world_position(),
                size: c.size(),
                band: SizeBand::classify(c.size(), &self.config),
            })
            .collect()
    }

    /// Take the spawn/destroy events of the most recent tick, plus any
    /// raised by [`EnergyCascade::reset`] or [`EnergyCascade::spawn`] since.
    /// Each [`EnergyCascade::step`] starts a fresh list.
    pub fn drain_events(&mut self) -> Vec<CascadeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Destroy every composite and reseed the population.
    ///
    /// All composites are destroyed (and reported) before any new one is
    /// created. `initial_primitives` composites are then spawned with
    /// energy drawn from a normal distribution around
    /// `mean_energy * wind_magnitude`.
    pub fn reset(&mut self, wind_magnitude: f32) {
        for c in self.composites.drain(..) {
            self.events.push(CascadeEvent::Destroyed(c.id()));
        }
        self.transfer = [0.0; 2];
        self.dissipated = 0.0;

        let mean = self.config.mean_energy * wind_magnitude;
        if mean <= 0.0 {
            log::warn!("cascade reset with wind magnitude {wind_magnitude}, population left empty");
            return;
        }
        for _ in 0..self.config.initial_primitives {
            let energy = normal_energy(&mut self.rng, mean, self.config.std_energy);
            self.spawn(energy);
        }
        log::info!(
            "cascade reset: {} composites, total size {:.3}",
            self.composites.len(),
            self.stats().total_size
        );
    }

    /// Create a composite with `energy` and return its id.
    ///
    /// The energy is added to the system as-is; diffusion spawns take it
    /// from the pool instead.
    pub fn spawn(&mut self, energy: f32) -> CompositeId {
        let id = self.next_id;
        self.next_id += 1;
        let composite = CompositePrimitive::new(
            id,
            energy,
            &self.config,
            self.wind_direction,
            &self.path,
            &self.bounds,
            &mut self.rng,
        );
        log::debug!("spawned composite {id} ({:?}) with energy {energy:.3}", composite.base_kind());
        self.composites.push(composite);
        self.events.push(CascadeEvent::Spawned(id));
        id
    }

    /// Advance the cascade by `dt` seconds.
    ///
    /// With no composites this is a no-op: accumulators are left untouched.
    /// Events not drained since the previous tick are discarded.
    pub fn step(&mut self, dt: f32) {
        self.events.clear();
        if self.composites.is_empty() {
            return;
        }
        self.collect(dt);
        let doomed = self.diffuse();
        self.remove(&doomed);
        self.spawn_from_pool();
    }

    /// Move every composite and drain its transfer/dissipation energy.
    fn collect(&mut self, dt: f32) {
        let config = &self.config;
        for c in &mut self.composites {
            c.update(dt, &self.path, &self.bounds, &mut self.rng);

            let size = c.size();
            let ratio = c.speed() / config.energy_speed;
            let transfer_rate = ratio * size * config.coeff_transfer;
            let dissip_rate = if size > 0.0 { ratio * config.coeff_dissip / size } else { 0.0 };

            let (transfer, dissip) = match SizeBand::classify(size, config) {
                SizeBand::Tall => {
                    self.transfer[1] += transfer_rate * dt;
                    (transfer_rate, 0.0)
                }
                SizeBand::Medium => {
                    self.transfer[0] += transfer_rate * dt;
                    (transfer_rate, dissip_rate)
                }
                SizeBand::Small => (0.0, dissip_rate),
            };
            self.dissipated += dissip * dt;
            c.sub_energy((transfer + dissip) * dt);
        }
    }

    /// Redistribute the transfer buckets. Returns the indices of small
    /// composites that fell below `min_size_small`.
    fn diffuse(&mut self) -> Vec<usize> {
        let config = &self.config;

        for bucket in &mut self.transfer {
            let leak = *bucket * config.coeff_dissip;
            *bucket -= leak;
            self.dissipated += leak;
        }

        let mut medium = Vec::new();
        let mut small = Vec::new();
        let mut doomed = Vec::new();
        for (i, c) in self.composites.iter().enumerate() {
            match SizeBand::classify(c.size(), config) {
                SizeBand::Tall => {}
                SizeBand::Medium => medium.push(i),
                SizeBand::Small if c.size() < config.min_size_small => doomed.push(i),
                SizeBand::Small => small.push(i),
            }
        }

        if !medium.is_empty() {
            let share = self.transfer[1] / medium.len() as f32;
            for &i in &medium {
                self.composites[i].add_energy(share);
            }
            self.transfer[1] = 0.0;
        }
        if !small.is_empty() {
            let share = self.transfer[0] / small.len() as f32;
            for &i in &small {
                self.composites[i].add_energy(share);
            }
            self.transfer[0] = 0.0;
        }

        // Nobody to receive it: fold into the pool.
        self.dissipated += self.transfer[0] + self.transfer[1];
        self.transfer = [0.0; 2];

        doomed
    }

    /// Destroy the composites at `indices`, crediting what is left of them
    /// to the dissipation pool.
    fn remove(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        let mut index = 0;
        let mut freed = 0.0;
        let events = &mut self.events;
        self.composites.retain(|c| {
            let keep = !indices.contains(&index);
            index += 1;
            if !keep {
                freed += c.size().max(0.0);
                events.push(CascadeEvent::Destroyed(c.id()));
                log::debug!("destroyed composite {} at size {:.3}", c.id(), c.size());
            }
            keep
        });
        self.dissipated += freed;
    }

    /// Spawn one composite from the pool once it holds a mean energy.
    fn spawn_from_pool(&mut self) {
        if self.dissipated < self.config.mean_energy {
            return;
        }
        let drawn = uniform_energy(&mut self.rng, self.config.mean_energy, self.config.std_energy);
        let energy = self.take_from_pool(drawn);
        self.spawn(energy);
    }

    /// Withdraw `drawn` from the pool, clamped to what the pool holds.
    fn take_from_pool(&mut self, drawn: f32) -> f32 {
        let energy = drawn.min(self.dissipated);
        if energy < drawn {
            log::debug!("pool draw {drawn:.3} clamped to {energy:.3}");
        }
        self.dissipated -= energy;
        energy
    }
}
