//! # Tick Statistics
//!
//! Per-tick counters and a rolling accumulator over the last second of ticks.

use std::time::Duration;

use trackline_shared::constants::{TICK_HISTORY, TICK_RATE};

/// Wall-clock budget of one tick at the nominal frame rate.
pub const TICK_BUDGET: Duration = Duration::from_micros(1_000_000 / TICK_RATE as u64);

/// What one tick did and how long it took.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Frame number after this tick (first tick is 1).
    pub frame: u64,
    /// Active runners ticked.
    pub runners: u32,
    /// Pairs that passed the collision gate.
    pub candidate_pairs: u32,
    /// Pairs closer than the minimum separation.
    pub overlapping_pairs: u32,
    /// Runners that finished during this tick.
    pub newly_finished: u32,
    /// Wall-clock duration of the tick in microseconds.
    pub tick_us: u64,
}

/// Accumulator for tick statistics.
///
/// Keeps lifetime totals plus a ring of the last [`TICK_HISTORY`] durations
/// for a rolling average.
#[derive(Clone, Debug)]
pub struct TickStatsAccumulator {
    /// Total ticks recorded.
    pub ticks_recorded: u64,
    /// Min tick time.
    pub min_tick_us: u64,
    /// Max tick time.
    pub max_tick_us: u64,
    /// Ticks that exceeded the budget.
    pub ticks_over_budget: u64,
    /// Sum of overlapping pairs over all ticks.
    pub overlapping_pairs_sum: u64,
    history: [u64; TICK_HISTORY],
    cursor: usize,
}

impl TickStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks_recorded: 0,
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            ticks_over_budget: 0,
            overlapping_pairs_sum: 0,
            history: [0; TICK_HISTORY],
            cursor: 0,
        }
    }

    /// Records a tick's statistics.
    pub fn record(&mut self, stats: TickStats) {
        self.ticks_recorded += 1;
        self.min_tick_us = self.min_tick_us.min(stats.tick_us);
        self.max_tick_us = self.max_tick_us.max(stats.tick_us);
        self.overlapping_pairs_sum += u64::from(stats.overlapping_pairs);
        if Duration::from_micros(stats.tick_us) > TICK_BUDGET {
            self.ticks_over_budget += 1;
        }

        self.history[self.cursor] = stats.tick_us;
        self.cursor = (self.cursor + 1) % TICK_HISTORY;
    }

    /// Number of samples in the rolling window.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn window_len(&self) -> usize {
        (self.ticks_recorded.min(TICK_HISTORY as u64)) as usize
    }

    /// Average tick time over the rolling window, in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_tick_ms(&self) -> f64 {
        let len = self.window_len();
        if len == 0 {
            return 0.0;
        }
        // Before the ring wraps, the filled part is the prefix.
        let sum: u64 = self.history[..len].iter().sum();
        (sum as f64 / len as f64) / 1000.0
    }

    /// Returns the fraction of ticks over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.ticks_recorded == 0 {
            return 0.0;
        }
        self.ticks_over_budget as f64 / self.ticks_recorded as f64
    }

    /// Prints a summary of the statistics.
    #[allow(clippy::cast_precision_loss)]
    pub fn print_summary(&self) {
        println!("┌─ TICK TIMING ──────────────────────────────────────────────────┐");
        println!("│ Ticks Recorded:     {}", self.ticks_recorded);
        println!("│ Rolling Average:    {:.3} ms", self.avg_tick_ms());
        if self.ticks_recorded > 0 {
            println!("│ Min Tick:           {:.3} ms", self.min_tick_us as f64 / 1000.0);
            println!("│ Max Tick:           {:.3} ms", self.max_tick_us as f64 / 1000.0);
        }
        println!(
            "│ Over Budget:        {} ticks ({:.1}%)",
            self.ticks_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("│ Overlapping Pairs:  {}", self.overlapping_pairs_sum);
        println!("└────────────────────────────────────────────────────────────────┘");
    }
}

impl Default for TickStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
