//! Portfolio objectives and their evaluation over a cached router.
//!
//! ```text
//! f1 = Σ distance(gene)             (infeasible gene → penalty)
//! f2 = 1 − |∪ served(gene)| / N     (N = all neighborhoods)
//! ```
//!
//! Both objectives are minimised.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;

use tp_core::{NeighborhoodId, NodeId};
use tp_network::{
    served_neighborhoods, Neighborhood, NetworkResult, RoadNetwork, RoutePlanner, Router,
    TravelDirection,
};

use crate::cache::{RouteCache, RouteRecord};
use crate::portfolio::{Gene, Portfolio};

/// Objective vector of one portfolio.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fitness {
    /// Total routed distance plus penalties (f1).
    pub distance: f64,
    /// Fraction of neighborhoods not touched by any route (f2).
    pub uncovered: f64,
}

impl Fitness {
    #[inline]
    pub fn objectives(&self) -> [f64; 2] {
        [self.distance, self.uncovered]
    }
}

/// Evaluates portfolios against one network and neighborhood layer.
///
/// Each neighborhood centroid is snapped to the network once up front; pair
/// routes are computed on demand and kept in a [`RouteCache`].
pub struct FitnessEvaluator<'a, R: Router> {
    planner:       RoutePlanner<'a, R>,
    neighborhoods: &'a [Neighborhood],
    /// Snapped centroid per neighborhood, `None` for non-polygonal rows.
    nodes:         Vec<Option<NodeId>>,
    cache:         RouteCache,
    penalty:       f64,
}

impl<'a, R: Router> FitnessEvaluator<'a, R> {
    /// # Errors
    ///
    /// [`NetworkError::EmptyGraph`](tp_network::NetworkError::EmptyGraph) for
    /// an empty network.
    pub fn new(
        network:       &'a RoadNetwork,
        router:        R,
        neighborhoods: &'a [Neighborhood],
        penalty:       f64,
    ) -> NetworkResult<Self> {
        let planner = RoutePlanner::new(network, router)?;
        let nodes = neighborhoods
            .iter()
            .map(|n| n.centroid().map(|c| planner.nearest_node(c)).transpose())
            .collect::<NetworkResult<Vec<_>>>()?;
        Ok(Self {
            planner,
            neighborhoods,
            nodes,
            cache: RouteCache::new(),
            penalty,
        })
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    pub fn neighborhoods(&self) -> &'a [Neighborhood] {
        self.neighborhoods
    }

    /// Cached routing result for `gene`.
    pub fn record(&self, gene: Gene) -> Arc<RouteRecord> {
        self.cache.get_or_compute(gene, |lo, hi| self.route_pair(lo, hi))
    }

    /// Objectives of `portfolio`.
    pub fn evaluate(&self, portfolio: &Portfolio) -> Fitness {
        let mut distance = 0.0;
        let mut served: FxHashSet<NeighborhoodId> = FxHashSet::default();
        for &gene in &portfolio.genes {
            let rec = self.record(gene);
            match rec.distance {
                Some(d) => {
                    distance += d;
                    served.extend(rec.served.iter().copied());
                }
                None => distance += self.penalty,
            }
        }
        let total = self.neighborhoods.len();
        let uncovered = if total == 0 { 1.0 } else { 1.0 - served.len() as f64 / total as f64 };
        Fitness { distance, uncovered }
    }

    fn route_pair(&self, lo: NeighborhoodId, hi: NeighborhoodId) -> RouteRecord {
        let (Some(Some(from)), Some(Some(to))) = (self.nodes.get(lo.index()), self.nodes.get(hi.index()))
        else {
            debug!(%lo, %hi, "pair has a non-polygonal neighborhood");
            return RouteRecord::infeasible();
        };
        match self.planner.route_nodes(*from, *to, TravelDirection::Outbound) {
            Some(mut route) => {
                route.origin = Some(lo);
                route.served = served_neighborhoods(&route.geometry, self.neighborhoods);
                RouteRecord::from_route(route)
            }
            None => RouteRecord::infeasible(),
        }
    }
}
