//! Search parameters and the Pareto-front selection policy.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tp_core::{CoreError, CoreResult};

// ── PortfolioBounds ───────────────────────────────────────────────────────────

/// Inclusive length bounds for a portfolio.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioBounds {
    pub min: usize,
    pub max: usize,
}

impl PortfolioBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

impl Default for PortfolioBounds {
    fn default() -> Self {
        Self::new(20, 40)
    }
}

// ── SearchConfig ──────────────────────────────────────────────────────────────

/// Configuration of one route-set search.
///
/// Typically loaded from the `[search]` table of the planner's TOML file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Portfolio length bounds, enforced by initialisation and mutation.
    pub bounds: PortfolioBounds,

    /// μ: individuals kept between generations.  λ (offspring per
    /// generation) is the same number.
    pub population: usize,

    /// Generations to run after the initial population.
    pub generations: usize,

    /// Probability that an offspring is produced by crossover.
    pub crossover_prob: f64,

    /// Probability that an offspring is produced by mutation.  The
    /// remainder `1 − cx − mut` clones a parent unchanged.
    pub mutation_prob: f64,

    /// Distance charged for a pair with no feasible route.
    pub infeasible_penalty: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Wall-clock budget.  Checked between generations; `None` runs every
    /// generation.
    pub time_budget: Option<Duration>,

    /// Worker thread count for parallel fitness evaluation.  `None` uses
    /// Rayon's global pool.  Ignored without the `parallel` feature.
    pub num_threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            bounds:             PortfolioBounds::default(),
            population:         100,
            generations:        50,
            crossover_prob:     0.4,
            mutation_prob:      0.5,
            infeasible_penalty: 100_000.0,
            seed:               42,
            time_budget:        None,
            num_threads:        None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> CoreResult<()> {
        let b = self.bounds;
        if b.min == 0 {
            return Err(CoreError::Config("portfolio min length must be at least 1".into()));
        }
        if b.min > b.max {
            return Err(CoreError::Config(format!(
                "portfolio bounds inverted: min {} > max {}",
                b.min, b.max
            )));
        }
        if self.population == 0 {
            return Err(CoreError::Config("population must be at least 1".into()));
        }
        for (name, p) in [("crossover_prob", self.crossover_prob), ("mutation_prob", self.mutation_prob)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CoreError::Config(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        if self.crossover_prob + self.mutation_prob > 1.0 {
            return Err(CoreError::Config(
                "crossover_prob + mutation_prob must not exceed 1".into(),
            ));
        }
        if !(self.infeasible_penalty.is_finite() && self.infeasible_penalty >= 0.0) {
            return Err(CoreError::Config("infeasible_penalty must be a non-negative number".into()));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}

// ── FrontPolicy ───────────────────────────────────────────────────────────────

/// How one portfolio is picked from the final Pareto front.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FrontPolicy {
    /// Lowest total distance.
    MinCost,
    /// Lowest uncovered fraction.
    MaxCoverage,
    /// Middle member of the front ordered by distance.
    #[default]
    Median,
}

impl FromStr for FrontPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min-cost"     => Ok(FrontPolicy::MinCost),
            "max-coverage" => Ok(FrontPolicy::MaxCoverage),
            "median"       => Ok(FrontPolicy::Median),
            other => Err(CoreError::Parse(format!(
                "unknown front policy {other:?} (expected min-cost, max-coverage or median)"
            ))),
        }
    }
}

impl fmt::Display for FrontPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrontPolicy::MinCost     => "min-cost",
            FrontPolicy::MaxCoverage => "max-coverage",
            FrontPolicy::Median      => "median",
        })
    }
}
