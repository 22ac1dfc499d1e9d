//! Per-generation statistics and the search observer trait.

use crate::fitness::Fitness;

/// avg / min / max of one objective over a population.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectiveStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl ObjectiveStats {
    /// Statistics of `values`; all zeros when empty.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut n = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            n += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        if n == 0 {
            return Self::default();
        }
        Self { avg: sum / n as f64, min, max }
    }
}

/// One logbook row.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// 0 is the initial population.
    pub generation:  usize,
    /// Fitness evaluations performed in this generation.
    pub evaluations: usize,
    pub distance:    ObjectiveStats,
    pub uncovered:   ObjectiveStats,
}

impl GenerationStats {
    pub fn collect(generation: usize, evaluations: usize, fits: &[Fitness]) -> Self {
        Self {
            generation,
            evaluations,
            distance:  ObjectiveStats::from_values(fits.iter().map(|f| f.distance)),
            uncovered: ObjectiveStats::from_values(fits.iter().map(|f| f.uncovered)),
        }
    }
}

/// Callbacks invoked by
/// [`RouteSetOptimizer::run`](crate::RouteSetOptimizer::run).
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: stop-aware progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SearchObserver for Progress {
///     fn on_generation(&mut self, stats: &GenerationStats) {
///         println!("gen {}: best distance {:.0}", stats.generation, stats.distance.min);
///     }
/// }
/// ```
pub trait SearchObserver {
    /// Called after each generation's survivors are selected (and once for
    /// the initial population).
    fn on_generation(&mut self, _stats: &GenerationStats) {}

    /// Called once when the loop ends.  `completed` is the number of
    /// generations run after the initial population; it is below the
    /// configured count when the time budget ran out.
    fn on_finish(&mut self, _completed: usize) {}
}

/// A [`SearchObserver`] that does nothing.
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}
