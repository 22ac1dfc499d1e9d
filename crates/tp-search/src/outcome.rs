//! Search results and Pareto-front selection.

use crate::cache::CacheStats;
use crate::config::FrontPolicy;
use crate::fitness::Fitness;
use crate::observer::GenerationStats;
use crate::portfolio::Portfolio;
use crate::{SearchError, SearchResult};

/// A portfolio together with its objectives.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    pub portfolio: Portfolio,
    pub fitness:   Fitness,
}

/// Everything a finished search produced.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Final μ survivors, in selection order.
    pub population: Vec<Individual>,
    /// Positions in `population` forming the first non-dominated front,
    /// ascending.
    pub front: Vec<usize>,
    /// One logbook row per generation, starting with the initial population.
    pub history: Vec<GenerationStats>,
    /// Generations run after the initial population.
    pub completed_generations: usize,
    pub cache: CacheStats,
}

impl SearchOutcome {
    /// Members of the Pareto front.
    pub fn front(&self) -> impl Iterator<Item = &Individual> + '_ {
        self.front.iter().map(|&i| &self.population[i])
    }

    /// Front members ordered by distance, then uncovered fraction.
    pub fn front_by_distance(&self) -> Vec<&Individual> {
        let mut members: Vec<&Individual> = self.front().collect();
        members.sort_by(|a, b| {
            a.fitness
                .distance
                .total_cmp(&b.fitness.distance)
                .then(a.fitness.uncovered.total_cmp(&b.fitness.uncovered))
        });
        members
    }

    /// Pick one front member.
    ///
    /// - `MinCost`: lowest distance, ties by coverage.
    /// - `MaxCoverage`: lowest uncovered fraction, ties by distance.
    /// - `Median`: element `len / 2` of [`front_by_distance`](Self::front_by_distance).
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyFront`] if the front is empty.
    pub fn select(&self, policy: FrontPolicy) -> SearchResult<&Individual> {
        let ordered = self.front_by_distance();
        let chosen = match policy {
            FrontPolicy::MinCost => ordered.first().copied(),
            FrontPolicy::MaxCoverage => ordered.iter().copied().min_by(|a, b| {
                a.fitness
                    .uncovered
                    .total_cmp(&b.fitness.uncovered)
                    .then(a.fitness.distance.total_cmp(&b.fitness.distance))
            }),
            FrontPolicy::Median => ordered.get(ordered.len() / 2).copied(),
        };
        chosen.ok_or(SearchError::EmptyFront)
    }
}
