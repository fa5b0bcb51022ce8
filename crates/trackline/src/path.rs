//! # Path Provider
//!
//! Maps route coordinates `(distance, lane)` to world space. Route geometry
//! (GPS tracks, splines, track ovals) lives outside this crate; the
//! orchestrator only needs this seam.

use trackline_shared::Vec3;

/// One sample of the route.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathSample {
    /// World position.
    pub position: Vec3,
    /// Heading of the route at this point, if the provider knows it.
    pub rotation: Option<f32>,
}

impl PathSample {
    /// Sample with a position only.
    #[inline]
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: None,
        }
    }
}

/// Route coordinates to world coordinates.
///
/// Must be a pure function of its inputs: the orchestrator calls it twice per
/// runner per tick and relies on repeatable answers for deterministic replay.
pub trait PathProvider {
    /// World sample for a runner `distance` meters along the route at `lane`.
    fn position(&self, distance: f32, lane: f32) -> PathSample;
}

impl<F> PathProvider for F
where
    F: Fn(f32, f32) -> PathSample,
{
    #[inline]
    fn position(&self, distance: f32, lane: f32) -> PathSample {
        self(distance, lane)
    }
}

/// A straight route along +Z, lanes spread along +X.
///
/// `x = lane * lane_width`, `y = 0`, `z = distance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StraightPath {
    /// Meters per lane unit.
    pub lane_width: f32,
}

impl StraightPath {
    /// Creates a straight route.
    #[must_use]
    pub const fn new(lane_width: f32) -> Self {
        Self { lane_width }
    }
}

impl Default for StraightPath {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PathProvider for StraightPath {
    #[inline]
    fn position(&self, distance: f32, lane: f32) -> PathSample {
        PathSample {
            position: Vec3::new(lane * self.lane_width, 0.0, distance),
            rotation: Some(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_path_mapping() {
        let path = StraightPath::new(1.5);
        let sample = path.position(120.0, 2.0);
        assert_eq!(sample.position, Vec3::new(3.0, 0.0, 120.0));
        assert_eq!(sample.rotation, Some(0.0));
    }

    #[test]
    fn test_closure_provider() {
        let ring = |distance: f32, lane: f32| {
            let angle = distance / 100.0;
            let radius = 100.0 + lane;
            PathSample::at(Vec3::new(radius * angle.sin(), 0.0, radius * angle.cos()))
        };
        let provider: &dyn PathProvider = &ring;
        let start = provider.position(0.0, 0.0);
        assert!((start.position.z - 100.0).abs() < 1e-4);
        assert!(start.rotation.is_none());
    }
}
