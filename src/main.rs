//! Headless demo: rain on a 64×64 surface under a gusting wind.
//!
//! Set `RUST_LOG=debug` (or `trace`) for per-tick output.

use rainfx::prelude::*;

const TICKS_PER_SECOND: u32 = 60;
const SECONDS: u32 = 10;

fn main() -> Result<(), SimError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SimulationConfig::default()
        .with_seed(7)
        .with_parallel(true)
        .with_wind(WindConfig::default().with_global_wind(Vec3::new(1.0, 0.0, 0.3)))
        .with_surface(SurfaceConfig::new(64).with_rain_rate(30.0).with_affinity(0.3));
    let mut sim = RainSimulation::new(&config)?;
    sim.clock_mut().set_fixed_delta(Some(1.0 / TICKS_PER_SECOND as f32));

    // A ledge across the lower third.
    for x in 16..48 {
        sim.surface_mut().add_obstacle(x, 20)?;
    }

    let (mut dripped, mut stalled, mut merged) = (0usize, 0usize, 0usize);
    for tick in 1..=TICKS_PER_SECOND * SECONDS {
        sim.step(1.0 / TICKS_PER_SECOND as f32);

        for event in sim.drain_events().surface {
            match event {
                SurfaceEvent::Dripped { .. } => dripped += 1,
                SurfaceEvent::Stalled { .. } => stalled += 1,
                SurfaceEvent::Merged { .. } => merged += 1,
            }
        }

        if tick % TICKS_PER_SECOND == 0 {
            let stats = sim.stats();
            log::info!(
                "t={:>4.1}s wind: {} composites, energy {:.3} | \
                 surface: {} drops, mass {:.1}, dripped {}, stalled {}, merged {}",
                stats.elapsed,
                stats.cascade.population,
                stats.cascade.total_energy(),
                stats.droplets,
                stats.surface_mass,
                dripped,
                stalled,
                merged
            );
        }
    }
    Ok(())
}
