//! # Field Generation
//!
//! A plausible mass-start field: a few elites, a handful of good club
//! runners, a big middle pack and a long tail.

use rand::Rng;
use trackline_core::{CoreResult, RaceProfile};
use trackline_shared::constants::REFERENCE_DISTANCE;

/// Runners per formation row.
pub const ROW_WIDTH: usize = 10;

/// Lane of the first formation column.
const FIRST_COLUMN_LANE: f32 = 0.8;
/// Lane spacing between formation columns.
const COLUMN_SPACING: f32 = 0.15;
/// Random lane offset added to each runner in the formation.
const LANE_JITTER: f32 = 0.05;
/// Intermediate splits deviate from even pacing by up to this fraction.
const SPLIT_JITTER: f32 = 0.02;

/// Finish time over [`REFERENCE_DISTANCE`] for the `i`-th generated runner.
///
/// | `i % 10` | tier    | seconds   |
/// |----------|---------|-----------|
/// | 0        | elite   | 780-840   |
/// | 1-2      | good    | 900-1080  |
/// | 3-6      | average | 1140-1500 |
/// | 7-9      | slow    | 1560-2100 |
pub fn reference_finish_time<R: Rng>(i: usize, rng: &mut R) -> f32 {
    let r: f32 = rng.gen();
    match i % 10 {
        0 => 780.0 + r * 60.0,
        1..=2 => 900.0 + r * 180.0,
        3..=6 => 1140.0 + r * 360.0,
        _ => 1560.0 + r * 540.0,
    }
}

/// Split table for a runner finishing in `finish_time`, evenly paced with
/// jitter on every intermediate split.
///
/// # Errors
///
/// Propagates [`RaceProfile::new`] validation; with the jitter used here that
/// only triggers for very long tables (over 20 segments) or a non-positive
/// finish time.
#[allow(clippy::cast_precision_loss)]
pub fn split_profile<R: Rng>(
    finish_time: f32,
    segments: usize,
    rng: &mut R,
) -> CoreResult<RaceProfile> {
    let per_segment = finish_time / segments as f32;
    let splits = (0..segments)
        .map(|k| {
            if k + 1 == segments {
                finish_time
            } else {
                let jitter = rng.gen_range(1.0 - SPLIT_JITTER..1.0 + SPLIT_JITTER);
                per_segment * (k + 1) as f32 * jitter
            }
        })
        .collect();
    RaceProfile::new(splits)
}

/// Generates `count` race profiles, fastest first.
///
/// Finish times are drawn per tier and scaled from the reference 5 km to
/// `race_distance`.
///
/// # Errors
///
/// Propagates [`split_profile`] errors.
pub fn generate_field<R: Rng>(
    count: usize,
    segments: usize,
    race_distance: f32,
    rng: &mut R,
) -> CoreResult<Vec<RaceProfile>> {
    let scale = race_distance / REFERENCE_DISTANCE;
    let mut times: Vec<f32> = (0..count)
        .map(|i| reference_finish_time(i, rng) * scale)
        .collect();
    times.sort_by(f32::total_cmp);

    times
        .into_iter()
        .map(|time| split_profile(time, segments, rng))
        .collect()
}

/// Start position `(distance, lane)` of the `i`-th runner.
///
/// Rows of [`ROW_WIDTH`], each row `spread` meters behind the previous one.
#[allow(clippy::cast_precision_loss)]
pub fn formation<R: Rng>(i: usize, spread: f32, rng: &mut R) -> (f32, f32) {
    let row = i / ROW_WIDTH;
    let col = i % ROW_WIDTH;
    let distance = -(row as f32) * spread;
    let lane = FIRST_COLUMN_LANE + col as f32 * COLUMN_SPACING + rng.gen::<f32>() * LANE_JITTER;
    (distance, lane)
}
