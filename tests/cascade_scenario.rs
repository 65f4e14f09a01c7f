//! End-to-end scenarios for the wind side: cascade plus field generator.

use glam::Vec3;
use rainfx::config::{CascadeConfig, WindConfig, WindOutput};
use rainfx::{CascadeEvent, EnergyCascade, SizeBand, WindFieldGenerator};

const DT: f32 = 1.0 / 60.0;

fn run(seed: u64, ticks: usize) -> EnergyCascade {
    let mut cascade =
        EnergyCascade::new(&CascadeConfig::default(), &WindConfig::default(), seed).unwrap();
    cascade.reset(1.0);
    for _ in 0..ticks {
        cascade.step(DT);
    }
    cascade
}

fn tally(events: &[CascadeEvent]) -> (usize, usize) {
    let spawned = events.iter().filter(|e| matches!(e, CascadeEvent::Spawned(_))).count();
    (spawned, events.len() - spawned)
}

// ============================================================================
// Energy Budget
// ============================================================================

#[test]
fn test_hundred_ticks_stay_bounded() {
    let mut cascade =
        EnergyCascade::new(&CascadeConfig::default(), &WindConfig::default(), 0).unwrap();
    cascade.reset(1.0);
    let initial = cascade.total_energy();
    assert_eq!(cascade.len(), 5);

    for _ in 0..100 {
        cascade.step(DT);
        let stats = cascade.stats();
        assert!(stats.dissipated >= 0.0);
        assert!(stats.total_energy() <= initial + 1e-3);
    }

    // Recorded baseline for seed 0.
    let stats = cascade.stats();
    assert_eq!(stats.population, 5);
    assert!((stats.total_size - 9.2499).abs() < 1e-3, "total size {}", stats.total_size);
}

#[test]
fn test_same_seed_same_history() {
    let a = run(0, 100);
    let b = run(0, 100);
    assert_eq!(a.stats(), b.stats());
    assert_eq!(a.diagnostics(), b.diagnostics());
}

#[test]
fn test_different_seed_different_history() {
    let a = run(1, 10);
    let b = run(2, 10);
    assert_ne!(a.diagnostics(), b.diagnostics());
}

// ============================================================================
// Population Lifecycle
// ============================================================================

#[test]
fn test_events_balance_population() {
    let mut cascade =
        EnergyCascade::new(&CascadeConfig::default(), &WindConfig::default(), 4).unwrap();
    cascade.reset(1.0);
    let (mut spawned, mut destroyed) = tally(&cascade.drain_events());
    for _ in 0..1000 {
        cascade.step(DT);
        let (s, d) = tally(&cascade.drain_events());
        spawned += s;
        destroyed += d;
    }
    assert_eq!(spawned - destroyed, cascade.len());
}

#[test]
fn test_diagnostics_follow_bands() {
    let cascade = run(5, 30);
    let config = cascade.config().clone();
    for d in cascade.diagnostics() {
        assert_eq!(d.band, SizeBand::classify(d.size, &config));
    }
}

#[test]
fn test_reset_rescales_with_wind() {
    let mut cascade =
        EnergyCascade::new(&CascadeConfig::default(), &WindConfig::default(), 6).unwrap();
    cascade.reset(1.0);
    let calm = cascade.total_energy();
    cascade.reset(10.0);
    let gusty = cascade.total_energy();
    // truncated normal: every draw is within ±3σ of the mean
    assert!(calm <= 5.0 * 2.0 * 1.75 + 1e-3);
    assert!(gusty >= 5.0 * 20.0 * 0.25 - 1e-3);
    assert!(gusty > calm);
}

// ============================================================================
// Wind Field
// ============================================================================

#[test]
fn test_field_follows_population() {
    let wind = WindConfig::default()
        .with_resolution(6, 6, 6)
        .with_output(WindOutput::DenseGrid)
        .with_global_wind(Vec3::new(0.0, 0.0, 1.0));
    let mut cascade = EnergyCascade::new(&CascadeConfig::default(), &wind, 8).unwrap();
    cascade.reset(1.0);
    let mut generator = WindFieldGenerator::new(&wind).unwrap();

    for _ in 0..20 {
        cascade.step(DT);
        generator.update(&cascade);
        assert_eq!(generator.composite_params().len(), cascade.len());
        assert_eq!(generator.primitive_params().len(), 2 * cascade.len());
        assert_eq!(generator.grid().as_bytes().len(), 6 * 6 * 6 * 12);
    }
    assert!(generator.grid().data().iter().all(|v| v.is_finite()));
}
