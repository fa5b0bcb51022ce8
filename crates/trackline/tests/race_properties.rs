//! # Race Simulation Properties
//!
//! End-to-end checks through the public API:
//!
//! 1. **Bounds**: lanes stay in range and every array stays finite
//! 2. **Pacing**: split lookup and the acceleration clamp
//! 3. **Collision**: trailing runners step aside and pairs separate
//! 4. **Determinism**: same seed and deltas, same arrays
//! 5. **Snapshot source**: external state drives the same pipeline
//!
//! Run with: cargo test --package trackline --test race_properties

use trackline::{
    CollisionConfig, EntityId, MovementConfig, Orchestrator, RaceProfile, RaceSession, SimConfig,
    SimError, SnapshotSource, StraightPath, TickInput,
};
use trackline_shared::constants::{LANE_OVERFLOW, MAX_LANE, MIN_LANE};
use trackline_shared::{RaceSnapshot, RaceStatus, RunnerSnapshot};

// ============================================================================
// HELPERS
// ============================================================================

/// A 500 m race with the full default field, real-time clock.
fn crowded_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.race.distance = 500.0;
    config.race.time_scale = 1.0;
    config.race.countdown = 0.0;
    config.movement.segment_length = 100.0;
    config
}

/// Orchestrator over a straight route, one meter per lane unit.
fn straight_orchestrator(config: &SimConfig) -> Orchestrator {
    Orchestrator::from_config(config).with_path_provider(StraightPath::new(1.0))
}

fn even_profile(segment_time: f32, segments: usize) -> RaceProfile {
    #[allow(clippy::cast_precision_loss)]
    let splits = (1..=segments).map(|k| segment_time * k as f32).collect();
    RaceProfile::new(splits).unwrap()
}

/// Planar distance computed from route state on the straight route.
fn route_gap(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dl = a.1 - b.1;
    let dd = a.0 - b.0;
    (dl * dl + dd * dd).sqrt()
}

// ============================================================================
// BOUNDS
// ============================================================================

#[test]
fn lanes_bounded_and_state_finite_through_a_crowded_start() {
    let mut session =
        RaceSession::new(&crowded_config(), Box::new(StraightPath::new(1.0))).unwrap();
    session.start();

    let mut last_distance: Vec<f32> = session
        .orchestrator()
        .view()
        .positions
        .iter()
        .map(|p| p.distance)
        .collect();

    for frame in 0..3_000 {
        session.update(1.0 / 60.0).unwrap();
        let view = session.orchestrator().view();

        for (i, pos) in view.positions.iter().enumerate() {
            assert!(pos.is_finite(), "frame {frame}: runner {i} {pos:?}");
            assert!(
                (MIN_LANE..=MAX_LANE + LANE_OVERFLOW).contains(&pos.lane),
                "frame {frame}: runner {i} lane {}",
                pos.lane
            );
            assert!(pos.distance >= last_distance[i], "runner {i} went backwards");
            last_distance[i] = pos.distance;
        }
        for vel in view.velocities {
            assert!(vel.current.is_finite() && vel.current >= 0.0);
            assert!(vel.target.is_finite() && vel.target >= 0.0);
        }
        assert!(view.animations.iter().all(|a| a.phase.is_finite()));
    }
}

// ============================================================================
// PACING
// ============================================================================

#[test]
fn target_speed_follows_current_split() {
    let mut config = SimConfig::default();
    config.store.segments = 4;
    config.movement.segment_length = 50.0;
    let mut sim = straight_orchestrator(&config);

    let id = sim
        .add_runner(&RaceProfile::new(vec![50.0, 100.0, 150.0, 200.0]).unwrap(), 1.0, false)
        .unwrap();
    sim.reset_runner(id, 175.0, 1.0);
    sim.tick(TickInput::new(0.1, 200.0, 10.0)).unwrap();

    let target = sim.view().velocities[0].target;
    assert!((target - 50.0 / (200.0 - 150.0) / 10.0).abs() < 1e-6);
}

#[test]
fn speed_rises_monotonically_to_target_without_overshoot() {
    let mut config = SimConfig::default();
    config.store.segments = 2;
    config.movement = MovementConfig {
        segment_length: 1000.0,
        acceleration_rate: 2.0,
        ..MovementConfig::default()
    };
    let mut sim = straight_orchestrator(&config);
    sim.add_runner(&even_profile(1000.0, 2), 1.0, false).unwrap();

    // 1 m/s target, 0.02 m/s gained per tick: reached after 50 ticks.
    let target = 1.0;
    let mut previous = 0.0;
    for tick in 0..80 {
        sim.tick(TickInput::new(0.01, 2000.0, 1.0)).unwrap();
        let speed = sim.view().velocities[0].current;
        assert!(speed >= previous, "tick {tick}: {speed} < {previous}");
        assert!(speed <= target + 1e-6, "tick {tick}: overshoot {speed}");
        assert!(speed - previous <= 0.02 + 1e-6);
        previous = speed;
    }
    assert!((previous - target).abs() < 1e-6);
}

#[test]
fn lone_runner_finishes_close_to_planned_time() {
    let mut config = SimConfig::default();
    config.race.runner_count = 1;
    config.race.distance = 1000.0;
    config.race.time_scale = 1.0;
    config.race.countdown = 0.0;
    config.movement.segment_length = 200.0;

    let mut session = RaceSession::new(&config, Box::new(StraightPath::new(1.0))).unwrap();
    let planned = session
        .orchestrator()
        .store()
        .final_time(EntityId::new(0));
    session.start();
    for _ in 0..10_000 {
        session.update(0.1).unwrap();
        if session.status() == RaceStatus::Finished {
            break;
        }
    }

    let actual = session.results()[0].finish_time;
    // Start acceleration and pace changes at segment boundaries cost a few seconds at most.
    assert!((actual / planned - 1.0).abs() < 0.05, "planned {planned}, took {actual}");
}

#[test]
fn mismatched_route_segments_rejected() {
    let mut config = SimConfig::default();
    config.race.distance = 10_000.0;
    let result = RaceSession::new(&config, Box::new(StraightPath::new(1.0)));
    assert!(matches!(result, Err(SimError::Config(_))));
}

// ============================================================================
// COLLISION
// ============================================================================

fn no_drift_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.store.segments = 5;
    config.collision = CollisionConfig {
        drift_speed: 0.0,
        ..CollisionConfig::default()
    };
    config
}

#[test]
fn trailing_runner_steps_aside_in_one_tick() {
    let config = no_drift_config();
    let mut sim = straight_orchestrator(&config);
    let profile = even_profile(200.0, 5);
    let a = sim.add_runner(&profile, 1.0, false).unwrap();
    let b = sim.add_runner(&profile, 1.1, false).unwrap();
    sim.reset_runner(a, 100.0, 1.0);
    sim.reset_runner(b, 100.2, 1.1);

    let before = route_gap((100.0, 1.0), (100.2, 1.1));
    let stats = sim.tick(TickInput::new(0.1, 5000.0, 1.0)).unwrap();
    assert_eq!(stats.overlapping_pairs, 1);

    // Both ran the same profile from rest, so they moved the same distance
    // and the pushed lane sees the pre-tick gap.
    let overlap = config.collision.min_separation() - before;
    let expected = 1.0 - overlap * config.collision.push_strength * 0.1;

    let view = sim.view();
    let (pa, pb) = (view.positions[0], view.positions[1]);
    assert!((pa.lane - expected).abs() < 1e-4, "lane {}", pa.lane);
    assert!((pb.lane - 1.1).abs() < f32::EPSILON);
    assert!(route_gap((pa.distance, pa.lane), (pb.distance, pb.lane)) > before);
}

#[test]
fn overlapping_pair_converges_to_min_separation() {
    let config = no_drift_config();
    let mut sim = straight_orchestrator(&config);
    let profile = even_profile(200.0, 5);
    let trail = sim.add_runner(&profile, 1.0, false).unwrap();
    let lead = sim.add_runner(&profile, 0.9, false).unwrap();
    sim.reset_runner(trail, 100.0, 1.0);
    sim.reset_runner(lead, 100.1, 0.9);

    for _ in 0..200 {
        sim.tick(TickInput::new(0.05, 5000.0, 1.0)).unwrap();
        let view = sim.view();
        let (a, b) = (view.positions[0], view.positions[1]);
        assert!(route_gap((a.distance, a.lane), (b.distance, b.lane)) > 0.0);
    }

    let view = sim.view();
    let (a, b) = (view.positions[0], view.positions[1]);
    let gap = route_gap((a.distance, a.lane), (b.distance, b.lane));
    assert!(gap >= config.collision.min_separation() - 1e-3, "gap {gap}");
    // Pushed outward, away from the leader's inside lane.
    assert!(a.lane > 1.0);
    assert!((b.lane - 0.9).abs() < f32::EPSILON);
}

#[test]
fn runner_pinned_on_inner_edge_separates_round_the_outside() {
    let config = no_drift_config();
    let mut sim = straight_orchestrator(&config);
    let profile = even_profile(200.0, 5);
    let trail = sim.add_runner(&profile, MIN_LANE, false).unwrap();
    let lead = sim.add_runner(&profile, 0.85, false).unwrap();
    sim.reset_runner(trail, 100.0, MIN_LANE);
    sim.reset_runner(lead, 100.1, 0.85);

    for _ in 0..400 {
        sim.tick(TickInput::new(0.05, 5000.0, 1.0)).unwrap();
    }

    let view = sim.view();
    let (a, b) = (view.positions[0], view.positions[1]);
    let gap = route_gap((a.distance, a.lane), (b.distance, b.lane));
    assert!(gap >= config.collision.min_separation() - 1e-3, "gap {gap}");
    assert!(a.lane > b.lane);
    assert!((b.lane - 0.85).abs() < f32::EPSILON);
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn identical_sessions_produce_identical_arrays() {
    let config = crowded_config();
    let mut first = RaceSession::new(&config, Box::new(StraightPath::new(1.2))).unwrap();
    let mut second = RaceSession::new(&config, Box::new(StraightPath::new(1.2))).unwrap();
    first.start();
    second.start();

    let deltas = [1.0 / 60.0, 1.0 / 30.0, 0.05, 1.0 / 144.0];
    for i in 0..2_000 {
        let delta = deltas[i % deltas.len()];
        first.update(delta).unwrap();
        second.update(delta).unwrap();
    }

    let (a, b) = (first.orchestrator().view(), second.orchestrator().view());
    assert_eq!(a.positions, b.positions);
    assert_eq!(a.velocities, b.velocities);
    assert_eq!(a.animations, b.animations);
    assert_eq!(a.flags, b.flags);
    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn different_seeds_diverge() {
    let config = crowded_config();
    let mut other = crowded_config();
    other.store.seed ^= 1;

    let first = RaceSession::new(&config, Box::new(StraightPath::new(1.0))).unwrap();
    let second = RaceSession::new(&other, Box::new(StraightPath::new(1.0))).unwrap();
    assert_ne!(
        first.orchestrator().view().positions,
        second.orchestrator().view().positions
    );
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn tick_without_provider_fails_loudly() {
    let mut sim = Orchestrator::from_config(&SimConfig::default());
    sim.add_runner(&even_profile(200.0, 5), 1.0, false).unwrap();
    let result = sim.tick(TickInput::new(1.0 / 60.0, 5000.0, 10.0));
    assert!(matches!(result, Err(SimError::MissingPathProvider)));
    assert_eq!(sim.frame(), 0);
}

#[test]
fn full_store_is_reported() {
    let mut config = SimConfig::default();
    config.store.capacity = 2;
    config.race.runner_count = 2;
    let mut sim = straight_orchestrator(&config);
    let profile = even_profile(200.0, 5);
    sim.add_runner(&profile, 1.0, false).unwrap();
    sim.add_runner(&profile, 1.0, false).unwrap();
    assert!(matches!(
        sim.add_runner(&profile, 1.0, false),
        Err(SimError::Core(_))
    ));
    assert_eq!(sim.store().active_count(), 2);
}

// ============================================================================
// SNAPSHOT SOURCE
// ============================================================================

#[test]
fn snapshot_source_drives_the_pipeline() {
    let config = SimConfig::default();
    let (feed, source) = SnapshotSource::channel(8);
    let mut sim = straight_orchestrator(&config).with_source(Box::new(source));
    assert_eq!(sim.source_name(), "snapshot");

    let profile = even_profile(200.0, 5);
    sim.add_runner(&profile, 1.0, true).unwrap();
    sim.add_runner(&profile, 1.0, false).unwrap();

    let runner = |id, distance, flags| RunnerSnapshot {
        id,
        distance,
        lane: 1.25,
        speed: 4.0,
        animation_phase: 3.0,
        flags,
    };
    assert!(feed.push(RaceSnapshot {
        frame: 40,
        status: RaceStatus::Racing,
        runners: vec![runner(0, 4999.0, 0), runner(1, 5001.0, 1)],
        ..RaceSnapshot::default()
    }));

    let stats = sim.tick(TickInput::new(1.0 / 60.0, 5000.0, 10.0)).unwrap();
    assert_eq!(stats.newly_finished, 1);
    assert_eq!(stats.overlapping_pairs, 0);
    assert_eq!(sim.finished_this_tick(), &[trackline::EntityId::new(1)]);

    let view = sim.view();
    assert!((view.positions[0].world_z - 4999.0).abs() < f32::EPSILON);
    assert!((view.positions[1].world_x - 1.25).abs() < f32::EPSILON);
    assert!(view.flags[0].is_primary());
    assert!(view.flags[1].is_finished());

    // No new snapshot: state holds.
    sim.tick(TickInput::new(1.0 / 60.0, 5000.0, 10.0)).unwrap();
    assert!((sim.view().positions[0].distance - 4999.0).abs() < f32::EPSILON);
    assert!(sim.finished_this_tick().is_empty());
}
