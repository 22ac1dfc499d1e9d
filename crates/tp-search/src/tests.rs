//! Unit and integration tests for tp-search.

use geo::{Coord, Rect};

use tp_core::{NeighborhoodId, SegmentId};
use tp_network::{Neighborhood, RoadNetwork, RoadNetworkBuilder};

use crate::{Fitness, Gene, Portfolio, SearchConfig};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn square(name: &str, x: f64, y: f64, size: f64) -> Neighborhood {
    let rect = Rect::new(Coord { x, y }, Coord { x: x + size, y: y + size });
    Neighborhood::new(name, rect.to_polygon(), None)
}

/// Two nodes, one bidirectional 100 m road: (0,0) ↔ (100,0).
fn two_node_network() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let a = b.node_at(Coord { x: 0.0, y: 0.0 });
    let c = b.node_at(Coord { x: 100.0, y: 0.0 });
    b.add_road(a, c, 100.0, 100.0, SegmentId(1));
    b.build()
}

/// A around node 0, B around node 1, C far away (snaps to node 1).
fn three_neighborhoods() -> Vec<Neighborhood> {
    vec![
        square("A", -10.0, -10.0, 20.0),
        square("B", 90.0, -10.0, 20.0),
        square("C", 500.0, 500.0, 20.0),
    ]
}

fn gene(a: u32, b: u32) -> Gene {
    Gene::new(NeighborhoodId(a), NeighborhoodId(b))
}

fn fit(distance: f64, uncovered: f64) -> Fitness {
    Fitness { distance, uncovered }
}

fn small_config() -> SearchConfig {
    SearchConfig {
        population:  10,
        generations: 3,
        ..SearchConfig::default()
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;
    use crate::{FrontPolicy, PortfolioBounds};

    #[test]
    fn defaults_are_valid() {
        let c = SearchConfig::default();
        assert_eq!(c.bounds, PortfolioBounds::new(20, 40));
        assert_eq!(c.population, 100);
        assert_eq!(c.generations, 50);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let c = SearchConfig { bounds: PortfolioBounds::new(5, 4), ..SearchConfig::default() };
        assert!(c.validate().is_err());
        let c = SearchConfig { bounds: PortfolioBounds::new(0, 4), ..SearchConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_probabilities_over_one() {
        let c = SearchConfig { crossover_prob: 0.6, mutation_prob: 0.5, ..SearchConfig::default() };
        assert!(c.validate().is_err());
        let c = SearchConfig { mutation_prob: -0.1, ..SearchConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_empty_population() {
        let c = SearchConfig { population: 0, ..SearchConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn front_policy_parses() {
        assert_eq!("min-cost".parse::<FrontPolicy>().unwrap(), FrontPolicy::MinCost);
        assert_eq!("MAX-COVERAGE".parse::<FrontPolicy>().unwrap(), FrontPolicy::MaxCoverage);
        assert_eq!(" median ".parse::<FrontPolicy>().unwrap(), FrontPolicy::Median);
        assert!("best".parse::<FrontPolicy>().is_err());
        assert_eq!(FrontPolicy::MaxCoverage.to_string(), "max-coverage");
    }
}

// ── Genetic operators ─────────────────────────────────────────────────────────

#[cfg(test)]
mod operators {
    use super::*;
    use crate::portfolio::{mutate, two_point_crossover};
    use crate::{GeneSampler, Mutation, PortfolioBounds};
    use tp_core::SearchRng;

    #[test]
    fn sampler_needs_two_neighborhoods() {
        assert!(GeneSampler::new(0).is_none());
        assert!(GeneSampler::new(1).is_none());
        assert!(GeneSampler::new(2).is_some());
    }

    #[test]
    fn genes_pair_distinct_neighborhoods() {
        let sampler = GeneSampler::new(3).unwrap();
        let mut rng = SearchRng::new(1);
        for _ in 0..500 {
            let g = sampler.gene(&mut rng);
            assert_ne!(g.origin, g.destination);
            assert!(g.origin.index() < 3 && g.destination.index() < 3);
        }
    }

    #[test]
    fn random_portfolios_respect_bounds() {
        let sampler = GeneSampler::new(10).unwrap();
        let bounds = PortfolioBounds::default();
        let mut rng = SearchRng::new(7);
        for _ in 0..200 {
            assert!(bounds.contains(sampler.portfolio(bounds, &mut rng).len()));
        }
    }

    #[test]
    fn mutation_chain_stays_in_bounds() {
        let sampler = GeneSampler::new(8).unwrap();
        let bounds = PortfolioBounds::new(20, 40);
        let mut rng = SearchRng::new(42);
        let mut p = sampler.portfolio(bounds, &mut rng);
        let mut seen = [false; 3];
        for _ in 0..5_000 {
            let action = mutate(&mut p, &sampler, bounds, &mut rng);
            seen[action as usize] = true;
            assert!(bounds.contains(p.len()), "length {} escaped bounds", p.len());
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn mutation_at_bounds_only_picks_allowed_actions() {
        let sampler = GeneSampler::new(5).unwrap();
        let mut rng = SearchRng::new(3);

        let bounds = PortfolioBounds::new(2, 4);
        for _ in 0..200 {
            let mut at_min = Portfolio::new(vec![gene(0, 1), gene(1, 2)]);
            assert_ne!(mutate(&mut at_min, &sampler, bounds, &mut rng), Mutation::Delete);
            assert!(at_min.len() >= 2);

            let mut at_max = Portfolio::new(vec![gene(0, 1); 4]);
            assert_ne!(mutate(&mut at_max, &sampler, bounds, &mut rng), Mutation::Append);
            assert!(at_max.len() <= 4);
        }

        let fixed = PortfolioBounds::new(3, 3);
        let mut p = Portfolio::new(vec![gene(0, 1); 3]);
        for _ in 0..50 {
            assert_eq!(mutate(&mut p, &sampler, fixed, &mut rng), Mutation::Replace);
            assert_eq!(p.len(), 3);
        }
    }

    #[test]
    fn crossover_swaps_a_middle_slice_and_keeps_lengths() {
        let mut rng = SearchRng::new(11);
        for _ in 0..200 {
            let mut a = Portfolio::new((0..6).map(|i| gene(0, i + 1)).collect());
            let mut b = Portfolio::new((0..9).map(|i| gene(1, i + 10)).collect());
            assert!(two_point_crossover(&mut a, &mut b, &mut rng));
            assert_eq!(a.len(), 6);
            assert_eq!(b.len(), 9);

            // Every gene position holds either its own or the partner's gene.
            for i in 0..6 {
                let own = gene(0, i as u32 + 1);
                let other = gene(1, i as u32 + 10);
                assert!(a.genes[i] == own || a.genes[i] == other);
                assert_eq!(a.genes[i] == other, b.genes[i] == own);
            }
            // The tail of the longer parent is untouched.
            for i in 6..9 {
                assert_eq!(b.genes[i], gene(1, i as u32 + 10));
            }
        }
    }

    #[test]
    fn crossover_needs_two_genes() {
        let mut rng = SearchRng::new(0);
        let mut a = Portfolio::new(vec![gene(0, 1)]);
        let mut b = Portfolio::new(vec![gene(1, 2), gene(2, 0)]);
        assert!(!two_point_crossover(&mut a, &mut b, &mut rng));
        assert_eq!(a.genes, [gene(0, 1)]);
    }

    #[test]
    fn portfolio_display_lists_genes() {
        let p = Portfolio::new(vec![gene(0, 3), gene(2, 5)]);
        assert_eq!(p.to_string(), "0-3 2-5");
    }
}

// ── Route cache and fitness ───────────────────────────────────────────────────

#[cfg(test)]
mod fitness {
    use super::*;
    use std::cell::Cell;

    use tp_network::DijkstraRouter;

    use crate::{FitnessEvaluator, RouteCache, RouteRecord};

    #[test]
    fn cache_is_keyed_by_unordered_pair() {
        let cache = RouteCache::new();
        let calls = Cell::new(0);
        let compute = |lo: NeighborhoodId, hi: NeighborhoodId| {
            calls.set(calls.get() + 1);
            assert!(lo < hi);
            RouteRecord::infeasible()
        };
        cache.get_or_compute(gene(2, 1), compute);
        cache.get_or_compute(gene(1, 2), compute);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(gene(2, 1)).is_some());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn feasible_pair_contributes_length_and_coverage() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let eval = FitnessEvaluator::new(&net, DijkstraRouter, &hoods, 100_000.0).unwrap();

        let f = eval.evaluate(&Portfolio::new(vec![gene(1, 0)]));
        assert!((f.distance - 100.0).abs() < 1e-9);
        assert!((f.uncovered - (1.0 - 2.0 / 3.0)).abs() < 1e-12);

        // Stored from the lower index.
        let rec = eval.record(gene(0, 1));
        let route = rec.route.as_ref().unwrap();
        assert_eq!(route.origin, Some(NeighborhoodId(0)));
        assert_eq!(rec.served, [NeighborhoodId(0), NeighborhoodId(1)]);
    }

    #[test]
    fn infeasible_pair_costs_penalty_and_covers_nothing() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let eval = FitnessEvaluator::new(&net, DijkstraRouter, &hoods, 100_000.0).unwrap();

        // B and C snap to the same node: trivial path, no route.
        let f = eval.evaluate(&Portfolio::new(vec![gene(1, 2)]));
        assert_eq!(f.distance, 100_000.0);
        assert_eq!(f.uncovered, 1.0);

        let f = eval.evaluate(&Portfolio::new(vec![gene(1, 2), gene(0, 1), gene(0, 1)]));
        assert!((f.distance - 100_200.0).abs() < 1e-9);
        assert!((f.uncovered - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn non_polygonal_neighborhood_is_infeasible() {
        let net = two_node_network();
        let mut hoods = three_neighborhoods();
        hoods.push(Neighborhood::new("P", geo::Point::new(0.0, 0.0), None));
        let eval = FitnessEvaluator::new(&net, DijkstraRouter, &hoods, 5.0).unwrap();
        let f = eval.evaluate(&Portfolio::new(vec![gene(3, 1)]));
        assert_eq!(f.distance, 5.0);
        assert_eq!(f.uncovered, 1.0);
    }
}

// ── NSGA-II ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod nsga2 {
    use super::*;
    use crate::nsga2::{crowding_distance, dominates, non_dominated_sort, select};

    #[test]
    fn dominance_is_strict() {
        assert!(dominates(&fit(1.0, 0.5), &fit(2.0, 0.5)));
        assert!(dominates(&fit(1.0, 0.4), &fit(2.0, 0.5)));
        assert!(!dominates(&fit(1.0, 0.5), &fit(1.0, 0.5)));
        assert!(!dominates(&fit(1.0, 0.6), &fit(2.0, 0.5)));
    }

    #[test]
    fn sorts_into_fronts() {
        let fits = [
            fit(1.0, 0.9), // 0: front 0
            fit(2.0, 0.5), // 1: front 0
            fit(3.0, 0.6), // 2: dominated by 1
            fit(4.0, 0.1), // 3: front 0
            fit(5.0, 0.7), // 4: dominated by 1 and 2
        ];
        let fronts = non_dominated_sort(&fits);
        assert_eq!(fronts, vec![vec![0, 1, 3], vec![2], vec![4]]);
    }

    #[test]
    fn crowding_marks_boundaries_infinite() {
        let fits = [fit(1.0, 0.9), fit(2.0, 0.5), fit(4.0, 0.1)];
        let d = crowding_distance(&fits, &[0, 1, 2]);
        assert!(d[0].is_infinite() && d[2].is_infinite());
        // (4 − 1)/3 + (0.9 − 0.1)/0.8 = 2
        assert!((d[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn select_fills_by_rank_then_crowding() {
        let fits = [
            fit(1.0, 0.9),
            fit(2.0, 0.5),
            fit(2.1, 0.49),
            fit(4.0, 0.1),
            fit(9.0, 0.95),
        ];
        // Front 0 = {0, 1, 2, 3}; one must go.  Boundaries 0 and 3 are
        // infinite, point 1 (≈0.88) is more crowded than point 2 (≈1.17).
        let mut chosen = select(&fits, 3);
        chosen.sort_unstable();
        assert_eq!(chosen, [0, 2, 3]);

        let all = select(&fits, 5);
        assert_eq!(all.len(), 5);
    }
}

// ── Optimizer ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod optimizer {
    use std::time::Duration;

    use super::*;
    use crate::nsga2::dominates;
    use crate::{
        FrontPolicy, GenerationStats, NoopObserver, PortfolioBounds, RouteSetOptimizer,
        SearchError, SearchObserver,
    };

    #[test]
    fn small_run_returns_front() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let opt = RouteSetOptimizer::new(&net, &hoods, small_config()).unwrap();
        let outcome = opt.run(&mut NoopObserver).unwrap();

        assert!(!outcome.front.is_empty());
        assert_eq!(outcome.population.len(), 10);
        assert_eq!(outcome.completed_generations, 3);
        assert_eq!(outcome.history.len(), 4);
        assert_eq!(outcome.history[0].evaluations, 10);
        let bounds = PortfolioBounds::default();
        assert!(outcome.population.iter().all(|ind| bounds.contains(ind.portfolio.len())));
    }

    #[test]
    fn front_is_mutually_non_dominated() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let config = SearchConfig {
            bounds: PortfolioBounds::new(1, 3),
            population: 20,
            generations: 10,
            ..SearchConfig::default()
        };
        let outcome = RouteSetOptimizer::new(&net, &hoods, config).unwrap().run(&mut NoopObserver).unwrap();
        let front: Vec<_> = outcome.front().collect();
        for a in &front {
            for b in &front {
                assert!(!dominates(&a.fitness, &b.fitness));
            }
        }
        // Nothing outside the front dominates a front member.
        for ind in &outcome.population {
            for f in &front {
                assert!(!dominates(&ind.fitness, &f.fitness));
            }
        }
    }

    #[test]
    fn same_seed_same_result() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let run = || {
            RouteSetOptimizer::new(&net, &hoods, small_config())
                .unwrap()
                .run(&mut NoopObserver)
                .unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.population, b.population);
        assert_eq!(a.front, b.front);
    }

    #[test]
    fn materialize_names_routes_by_position_and_skips_infeasible() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let opt = RouteSetOptimizer::new(&net, &hoods, small_config()).unwrap();
        let ind = crate::Individual {
            portfolio: Portfolio::new(vec![gene(1, 2), gene(0, 1), gene(2, 0)]),
            fitness:   fit(0.0, 0.0),
        };
        let routes = opt.materialize(&ind);
        let ids: Vec<_> = routes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(routes[0].served, [NeighborhoodId(0), NeighborhoodId(1)]);
    }

    #[test]
    fn empty_graph_fails_fast() {
        let net = RoadNetwork::empty();
        let hoods = three_neighborhoods();
        let result = RouteSetOptimizer::new(&net, &hoods, small_config());
        assert!(matches!(result, Err(SearchError::EmptyGraph)));
    }

    #[test]
    fn too_few_neighborhoods() {
        let net = two_node_network();
        let hoods = vec![square("A", 0.0, 0.0, 10.0)];
        let result = RouteSetOptimizer::new(&net, &hoods, small_config());
        assert!(matches!(result, Err(SearchError::TooFewNeighborhoods { found: 1 })));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let config = SearchConfig { population: 0, ..SearchConfig::default() };
        assert!(matches!(
            RouteSetOptimizer::new(&net, &hoods, config),
            Err(SearchError::Core(_))
        ));
    }

    #[test]
    fn zero_time_budget_stops_after_initial_population() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let config = SearchConfig { time_budget: Some(Duration::ZERO), ..small_config() };
        let outcome = RouteSetOptimizer::new(&net, &hoods, config).unwrap().run(&mut NoopObserver).unwrap();
        assert_eq!(outcome.completed_generations, 0);
        assert_eq!(outcome.history.len(), 1);
        assert!(!outcome.front.is_empty());
    }

    #[derive(Default)]
    struct Recorder {
        generations: Vec<usize>,
        finished:    Option<usize>,
    }

    impl SearchObserver for Recorder {
        fn on_generation(&mut self, stats: &GenerationStats) {
            assert!(stats.distance.min <= stats.distance.avg);
            assert!(stats.distance.avg <= stats.distance.max);
            self.generations.push(stats.generation);
        }
        fn on_finish(&mut self, completed: usize) {
            self.finished = Some(completed);
        }
    }

    #[test]
    fn observer_sees_every_generation() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let mut rec = Recorder::default();
        RouteSetOptimizer::new(&net, &hoods, small_config()).unwrap().run(&mut rec).unwrap();
        assert_eq!(rec.generations, [0, 1, 2, 3]);
        assert_eq!(rec.finished, Some(3));
    }

    #[test]
    fn front_policies_pick_expected_members() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let outcome = RouteSetOptimizer::new(&net, &hoods, small_config())
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap();

        let ordered = outcome.front_by_distance();
        let min_cost = outcome.select(FrontPolicy::MinCost).unwrap();
        let max_cov = outcome.select(FrontPolicy::MaxCoverage).unwrap();
        let median = outcome.select(FrontPolicy::Median).unwrap();

        assert!(outcome.front().all(|i| min_cost.fitness.distance <= i.fitness.distance));
        assert!(outcome.front().all(|i| max_cov.fitness.uncovered <= i.fitness.uncovered));
        assert_eq!(median, ordered[ordered.len() / 2]);
    }

    #[test]
    fn empty_front_is_an_error() {
        let outcome = crate::SearchOutcome {
            population: Vec::new(),
            front: Vec::new(),
            history: Vec::new(),
            completed_generations: 0,
            cache: crate::CacheStats::default(),
        };
        assert!(matches!(outcome.select(FrontPolicy::Median), Err(SearchError::EmptyFront)));
    }
}

// ── Parallel evaluation ───────────────────────────────────────────────────────

#[cfg(all(test, feature = "parallel"))]
mod parallel {
    use rayon::prelude::*;

    use super::*;
    use crate::{NoopObserver, PortfolioBounds, RouteCache, RouteRecord, RouteSetOptimizer};

    fn config(num_threads: Option<usize>) -> SearchConfig {
        SearchConfig {
            bounds: PortfolioBounds::new(1, 3),
            population: 20,
            generations: 6,
            seed: 11,
            num_threads,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn thread_count_does_not_change_seeded_run() {
        let net = two_node_network();
        let hoods = three_neighborhoods();
        let run = |threads| {
            RouteSetOptimizer::new(&net, &hoods, config(threads))
                .unwrap()
                .run(&mut NoopObserver)
                .unwrap()
        };
        let single = run(Some(1));
        for threads in [None, Some(4)] {
            let other = run(threads);
            assert_eq!(other.population, single.population, "{threads:?}");
            assert_eq!(other.front, single.front, "{threads:?}");
            assert_eq!(other.history, single.history, "{threads:?}");
            assert_eq!(other.cache.entries, single.cache.entries, "{threads:?}");
        }
    }

    #[test]
    fn concurrent_lookups_store_each_pair_once() {
        let cache = RouteCache::new();
        let genes: Vec<Gene> = (0..200u32).map(|i| gene(i % 5, (i + 1) % 5)).collect();
        genes.par_iter().for_each(|&g| {
            cache.get_or_compute(g, |_, _| RouteRecord::infeasible());
        });
        // Five distinct pairs, each computed at least once.
        assert_eq!(cache.len(), 5);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 200);
    }
}
