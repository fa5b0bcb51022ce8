//! # Fixed Timestep
//!
//! Turns variable frame deltas into a whole number of equal simulation steps.
//! Same seed + same step + same number of steps = same arrays on every
//! machine, which variable deltas cannot promise.
//!
//! ## Design
//!
//! - Leftover time carries over to the next frame
//! - At most `max_steps` per frame; anything beyond is dropped so a long
//!   stall does not trigger a burst of catch-up ticks (spiral of death)

/// Fixed-timestep accumulator.
#[derive(Clone, Debug)]
pub struct FixedStep {
    /// Seconds per step.
    step: f32,
    /// Steps allowed per frame.
    max_steps: u32,
    /// Unconsumed time, kept in f64 so long sessions do not drift.
    accumulator: f64,
    /// Total steps handed out.
    step_count: u64,
    /// Total seconds dropped by the per-frame cap.
    dropped: f64,
}

impl FixedStep {
    /// Default cap on steps per frame.
    pub const DEFAULT_MAX_STEPS: u32 = 8;

    /// Creates an accumulator for `step`-second steps.
    ///
    /// # Panics
    ///
    /// Panics if `step` is not finite and positive or `max_steps` is zero.
    #[must_use]
    pub fn new(step: f32, max_steps: u32) -> Self {
        assert!(step.is_finite() && step > 0.0, "Step must be finite and positive");
        assert!(max_steps > 0, "At least one step per frame");
        Self {
            step,
            max_steps,
            accumulator: 0.0,
            step_count: 0,
            dropped: 0.0,
        }
    }

    /// Creates an accumulator ticking at `rate` steps per second.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_rate(rate: u32) -> Self {
        Self::new(1.0 / rate.max(1) as f32, Self::DEFAULT_MAX_STEPS)
    }

    /// Adds a frame delta and returns how many steps to run now.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance(&mut self, frame_delta: f32) -> u32 {
        if frame_delta.is_finite() && frame_delta > 0.0 {
            self.accumulator += f64::from(frame_delta);
        }

        let step = f64::from(self.step);
        let due = (self.accumulator / step).floor();
        let steps = if due >= f64::from(self.max_steps) {
            self.max_steps
        } else {
            due as u32
        };

        self.accumulator -= f64::from(steps) * step;
        if steps == self.max_steps && self.accumulator >= step {
            // Keep the fractional remainder, drop whole steps over the cap.
            let excess = (self.accumulator / step).floor() * step;
            self.dropped += excess;
            self.accumulator -= excess;
        }

        self.step_count += u64::from(steps);
        steps
    }

    /// Seconds per step.
    #[inline]
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Steps handed out so far.
    #[inline]
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Seconds discarded by the per-frame cap.
    #[inline]
    #[must_use]
    pub const fn dropped_time(&self) -> f64 {
        self.dropped
    }

    /// Fraction of a step waiting in the accumulator, for render interpolation.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / f64::from(self.step)) as f32
    }

    /// Forgets pending time and counters.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.step_count = 0;
        self.dropped = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_steps_and_carry() {
        let mut fixed = FixedStep::new(0.01, 8);
        assert_eq!(fixed.advance(0.025), 2);
        assert!((fixed.alpha() - 0.5).abs() < 1e-4);
        assert_eq!(fixed.advance(0.005), 1);
        assert_eq!(fixed.step_count(), 3);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut fixed = FixedStep::new(0.1, 4);
        assert_eq!(fixed.advance(0.04), 0);
        assert_eq!(fixed.advance(0.04), 0);
        assert_eq!(fixed.advance(0.04), 1);
    }

    #[test]
    fn test_cap_drops_excess() {
        let mut fixed = FixedStep::new(0.01, 3);
        assert_eq!(fixed.advance(1.0), 3);
        assert!(fixed.alpha() < 1.0);
        assert!(fixed.dropped_time() > 0.9);
        // Nothing owed from the stall.
        assert_eq!(fixed.advance(0.0), 0);
    }

    #[test]
    fn test_invalid_delta_ignored() {
        let mut fixed = FixedStep::from_rate(60);
        assert_eq!(fixed.advance(f32::NAN), 0);
        assert_eq!(fixed.advance(-1.0), 0);
        assert_eq!(fixed.step_count(), 0);
    }

    #[test]
    fn test_reset() {
        let mut fixed = FixedStep::new(0.01, 8);
        fixed.advance(0.055);
        fixed.reset();
        assert_eq!(fixed.step_count(), 0);
        assert!(fixed.alpha().abs() < f32::EPSILON);
    }
}
