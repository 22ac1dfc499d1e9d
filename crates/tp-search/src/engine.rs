//! The `RouteSetOptimizer` and its μ+λ generational loop.

use std::time::Instant;

use tracing::{debug, info};

use tp_core::SearchRng;
use tp_network::{DijkstraRouter, Neighborhood, RoadNetwork, Route, Router};

use crate::config::SearchConfig;
use crate::fitness::{Fitness, FitnessEvaluator};
use crate::nsga2;
use crate::observer::{GenerationStats, SearchObserver};
use crate::outcome::{Individual, SearchOutcome};
use crate::portfolio::{mutate, two_point_crossover, GeneSampler, Portfolio};
use crate::{SearchError, SearchResult};

/// An offspring produced by variation; `fitness` is `None` until evaluated.
struct Offspring {
    portfolio: Portfolio,
    fitness:   Option<Fitness>,
}

/// Multi-objective genetic search for a route portfolio.
///
/// # Generation loop
///
/// ```text
/// P ← μ random portfolios, evaluated                      (generation 0)
/// repeat `generations` times (or until the time budget is spent):
///   Q ← λ offspring, each by exactly one of
///         crossover of two distinct parents   (p = crossover_prob)
///         mutation of one parent              (p = mutation_prob)
///         unchanged copy of one parent        (otherwise)
///   evaluate the changed members of Q
///   P ← NSGA-II selection of μ from P ∪ Q
/// ```
///
/// All random draws happen on the calling thread; only fitness evaluation
/// fans out (with the `parallel` feature), so a seed fully determines the run.
pub struct RouteSetOptimizer<'a, R: Router = DijkstraRouter> {
    config:    SearchConfig,
    evaluator: FitnessEvaluator<'a, R>,
    sampler:   GeneSampler,
    #[cfg(feature = "parallel")]
    pool:      Option<rayon::ThreadPool>,
}

impl<'a> RouteSetOptimizer<'a, DijkstraRouter> {
    /// Optimizer using [`DijkstraRouter`].
    pub fn new(
        network:       &'a RoadNetwork,
        neighborhoods: &'a [Neighborhood],
        config:        SearchConfig,
    ) -> SearchResult<Self> {
        Self::with_router(network, neighborhoods, config, DijkstraRouter)
    }
}

impl<'a, R: Router> RouteSetOptimizer<'a, R> {
    /// # Errors
    ///
    /// - [`SearchError::EmptyGraph`] if `network` has no nodes.
    /// - [`SearchError::Core`] for an invalid configuration.
    /// - [`SearchError::TooFewNeighborhoods`] with fewer than two
    ///   neighborhoods.
    pub fn with_router(
        network:       &'a RoadNetwork,
        neighborhoods: &'a [Neighborhood],
        config:        SearchConfig,
        router:        R,
    ) -> SearchResult<Self> {
        if network.is_empty() {
            return Err(SearchError::EmptyGraph);
        }
        config.validate()?;
        let sampler = GeneSampler::new(neighborhoods.len())
            .ok_or(SearchError::TooFewNeighborhoods { found: neighborhoods.len() })?;
        let evaluator = FitnessEvaluator::new(network, router, neighborhoods, config.infeasible_penalty)?;

        #[cfg(feature = "parallel")]
        let pool = match config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| tp_core::CoreError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            config,
            evaluator,
            sampler,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &FitnessEvaluator<'a, R> {
        &self.evaluator
    }

    /// Run the search to completion.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyFront`] if no individual survives, which valid
    /// configurations never produce.
    pub fn run<O: SearchObserver>(&self, observer: &mut O) -> SearchResult<SearchOutcome> {
        let cfg = &self.config;
        let started = Instant::now();
        let mut rng = SearchRng::new(cfg.seed);

        // ── Generation 0 ──────────────────────────────────────────────────
        let initial: Vec<Portfolio> = (0..cfg.population)
            .map(|_| self.sampler.portfolio(cfg.bounds, &mut rng))
            .collect();
        let fits = self.evaluate_batch(&initial.iter().collect::<Vec<_>>());
        let mut population: Vec<Individual> = initial
            .into_iter()
            .zip(fits)
            .map(|(portfolio, fitness)| Individual { portfolio, fitness })
            .collect();

        let mut history = Vec::with_capacity(cfg.generations + 1);
        self.record(0, population.len(), &population, &mut history, observer);

        // ── μ+λ loop ──────────────────────────────────────────────────────
        let mut completed = 0;
        for generation in 1..=cfg.generations {
            if cfg.time_budget.is_some_and(|budget| started.elapsed() >= budget) {
                info!(completed, elapsed = ?started.elapsed(), "time budget exhausted");
                break;
            }

            let mut offspring = self.vary(&population, &mut rng);

            let pending: Vec<usize> = (0..offspring.len())
                .filter(|&i| offspring[i].fitness.is_none())
                .collect();
            let fits = self.evaluate_batch(
                &pending.iter().map(|&i| &offspring[i].portfolio).collect::<Vec<_>>(),
            );
            for (&i, fit) in pending.iter().zip(fits) {
                offspring[i].fitness = Some(fit);
            }

            let mut candidates: Vec<Individual> = population;
            candidates.extend(offspring.into_iter().filter_map(|o| {
                o.fitness.map(|fitness| Individual { portfolio: o.portfolio, fitness })
            }));
            let candidate_fits: Vec<Fitness> = candidates.iter().map(|ind| ind.fitness).collect();
            let survivors = nsga2::select(&candidate_fits, cfg.population);

            let mut slots: Vec<Option<Individual>> = candidates.into_iter().map(Some).collect();
            population = survivors.into_iter().filter_map(|i| slots[i].take()).collect();

            self.record(generation, pending.len(), &population, &mut history, observer);
            completed = generation;
        }
        observer.on_finish(completed);

        let fits: Vec<Fitness> = population.iter().map(|ind| ind.fitness).collect();
        let front = nsga2::non_dominated_sort(&fits)
            .into_iter()
            .next()
            .ok_or(SearchError::EmptyFront)?;

        let cache = self.evaluator.cache().stats();
        info!(
            completed,
            front = front.len(),
            cached_pairs = cache.entries,
            cache_hits = cache.hits,
            "route-set search finished"
        );
        Ok(SearchOutcome { population, front, history, completed_generations: completed, cache })
    }

    /// Routes of `individual`, named by gene position, skipping infeasible
    /// pairs.
    pub fn materialize(&self, individual: &Individual) -> Vec<Route> {
        individual
            .portfolio
            .genes
            .iter()
            .enumerate()
            .filter_map(|(i, &gene)| {
                let rec = self.evaluator.record(gene);
                let mut route = rec.route.clone()?;
                route.id = i.to_string();
                Some(route)
            })
            .collect()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Produce λ = μ offspring.
    fn vary(&self, population: &[Individual], rng: &mut SearchRng) -> Vec<Offspring> {
        let cfg = &self.config;
        let n = population.len();
        let mut out = Vec::with_capacity(cfg.population);

        for _ in 0..cfg.population {
            let r: f64 = rng.random();
            let offspring = if r < cfg.crossover_prob {
                match rng.distinct_pair(n) {
                    Some((i, j)) => {
                        let mut a = population[i].portfolio.clone();
                        let mut b = population[j].portfolio.clone();
                        two_point_crossover(&mut a, &mut b, rng);
                        Offspring { portfolio: a, fitness: None }
                    }
                    // A single parent cannot mate; reproduce it instead.
                    None => self.copy_of(population, rng),
                }
            } else if r < cfg.crossover_prob + cfg.mutation_prob {
                let mut p = population[rng.gen_range(0..n)].portfolio.clone();
                let action = mutate(&mut p, &self.sampler, cfg.bounds, rng);
                debug!(?action, len = p.len(), "mutated");
                Offspring { portfolio: p, fitness: None }
            } else {
                self.copy_of(population, rng)
            };
            out.push(offspring);
        }
        out
    }

    fn copy_of(&self, population: &[Individual], rng: &mut SearchRng) -> Offspring {
        let parent = &population[rng.gen_range(0..population.len())];
        Offspring {
            portfolio: parent.portfolio.clone(),
            fitness:   Some(parent.fitness),
        }
    }

    fn evaluate_batch(&self, portfolios: &[&Portfolio]) -> Vec<Fitness> {
        #[cfg(not(feature = "parallel"))]
        {
            portfolios.iter().map(|p| self.evaluator.evaluate(p)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let run = || {
                portfolios
                    .par_iter()
                    .map(|p| self.evaluator.evaluate(p))
                    .collect::<Vec<Fitness>>()
            };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        }
    }

    fn record<O: SearchObserver>(
        &self,
        generation:  usize,
        evaluations: usize,
        population:  &[Individual],
        history:     &mut Vec<GenerationStats>,
        observer:    &mut O,
    ) {
        let fits: Vec<Fitness> = population.iter().map(|ind| ind.fitness).collect();
        let stats = GenerationStats::collect(generation, evaluations, &fits);
        info!(
            generation,
            evaluations,
            avg_distance = stats.distance.avg,
            min_distance = stats.distance.min,
            max_distance = stats.distance.max,
            avg_uncovered = stats.uncovered.avg,
            min_uncovered = stats.uncovered.min,
            max_uncovered = stats.uncovered.max,
            "generation"
        );
        observer.on_generation(&stats);
        history.push(stats);
    }
}
