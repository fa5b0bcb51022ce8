//! # TRACKLINE Headless Race
//!
//! Runs one race start to finish without a renderer and prints the results
//! and tick timing.
//!
//! ```bash
//! # Defaults: 100 runners over 5 km
//! ./headless_race
//!
//! # Custom config, with tick logging
//! RUST_LOG=trackline=debug ./headless_race race.toml
//! ```

use std::process;
use std::time::Instant;

use trackline::{RaceEvent, RaceSession, SimConfig, StraightPath};
use trackline_shared::RaceStatus;

/// Simulated frame delta (one 60 Hz frame).
const FRAME_DELTA: f32 = 1.0 / 60.0;
/// Lateral meters per lane unit on the straight demo route.
const LANE_WIDTH: f32 = 1.2;
/// Gives up after this many frames (about 28 hours at 60 Hz).
const MAX_FRAMES: u64 = 6_000_000;
/// Results printed at the end.
const TOP_RESULTS: usize = 10;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("   ✗ FATAL: {e}");
                process::exit(1);
            }
        },
        None => SimConfig::default(),
    };

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    TRACKLINE HEADLESS RACE");
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Runners:    {}", config.race.runner_count);
    println!("  Distance:   {} m", config.race.distance);
    println!("  Time scale: {}x", config.race.time_scale);
    println!();

    let mut session = match RaceSession::new(&config, Box::new(StraightPath::new(LANE_WIDTH))) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("   ✗ FATAL: cannot set up the race: {e}");
            process::exit(1);
        }
    };
    let events = session.events();
    session.start();

    let wall_start = Instant::now();
    let mut frames = 0u64;
    while session.status() != RaceStatus::Finished && frames < MAX_FRAMES {
        if let Err(e) = session.update(FRAME_DELTA) {
            eprintln!("   ✗ FATAL: frame {frames}: {e}");
            process::exit(1);
        }
        frames += 1;

        for event in events.drain() {
            if let RaceEvent::RunnerFinished { place, runner, finish_time } = event {
                if place == 1 {
                    println!("🏁 Winner: {runner} in {finish_time:.1} s");
                }
            }
        }
    }

    if session.status() != RaceStatus::Finished {
        eprintln!("   ✗ Race did not finish within {MAX_FRAMES} frames");
    }

    println!();
    println!("┌─ RESULTS ──────────────────────────────────────────────────────┐");
    for result in session.results().iter().take(TOP_RESULTS) {
        println!(
            "│ {:>3}. {:<12} {:>8.1} s",
            result.place,
            result.runner.to_string(),
            result.finish_time
        );
    }
    println!(
        "│ Finished:           {} / {}",
        session.results().len(),
        config.race.runner_count
    );
    println!("│ Race Clock:         {:.1} s", session.elapsed());
    println!("│ Frames:             {frames}");
    println!("│ Wall Time:          {:.2?}", wall_start.elapsed());
    println!("└────────────────────────────────────────────────────────────────┘");
    session.orchestrator().accumulator().print_summary();
}
