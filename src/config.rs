use std::time::Duration;

/// Contour spacing.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ContourInterval {
    /// No contours are traced.
    None,
    /// Contours every `f64` units of elevation.
    Every(f64),
}

/// Settings for a TIN build.
///
/// Everything has a sensible [`Default`]; a `BuildConfig` can be (de)serialised to keep user
/// preferences between sessions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Two points closer than this in both x and y are duplicates.
    pub duplicate_tolerance: f64,
    /// Levels closer than this to a vertex elevation are nudged upward when tracing.
    pub level_epsilon: f64,
    /// Ceiling on edge flips before the build gives up with `TookTooLong`.
    pub max_flips: Option<usize>,
    /// Wall clock budget for edge flipping.
    pub flip_time_budget: Option<Duration>,
    pub contour_interval: ContourInterval,
    /// Extra levels traced on top of the interval levels.
    pub extra_levels: Vec<f64>,
    /// Produce smooth contours.
    pub smooth: bool,
    /// Douglas-Peucker tolerance applied before smoothing, `0` to keep every rough point.
    pub smooth_tolerance: f64,
    /// Fail the build on an invalid breakline. Otherwise the breakline is dropped and
    /// reported.
    pub strict_breaklines: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            duplicate_tolerance: 1e-6,
            level_epsilon: 1e-6,
            max_flips: None,
            flip_time_budget: Some(Duration::from_secs(60)),
            contour_interval: ContourInterval::Every(1.0),
            extra_levels: Vec::new(),
            smooth: true,
            smooth_tolerance: 0.0,
            strict_breaklines: true,
        }
    }
}

impl BuildConfig {
    /// Computes the flip ceiling, scaling with the number of points when unset.
    ///
    /// A sweep triangulation of `n` points legalises in far fewer than `n²` flips.
    pub fn flip_ceiling(&self, points: usize) -> usize {
        self.max_flips
            .unwrap_or_else(|| points.saturating_mul(points).max(1024))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = BuildConfig::default();
        assert_eq!(c.contour_interval, ContourInterval::Every(1.0));
        assert!(c.strict_breaklines);
        assert_eq!(c.flip_ceiling(10), 1024);
        assert_eq!(c.flip_ceiling(100), 10_000);

        let c = BuildConfig {
            max_flips: Some(5),
            ..c
        };
        assert_eq!(c.flip_ceiling(100), 5);
    }
}
