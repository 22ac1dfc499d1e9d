//! Plain data row types written by output backends.

use geo::LineString;

use tp_network::{Neighborhood, Route, TravelDirection};
use tp_search::{GenerationStats, SearchOutcome};

/// One route of a route layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub id:                   String,
    /// Name of the neighborhood the route was computed for; empty if none.
    pub origin_neighborhood:  String,
    pub direction:            &'static str,
    /// Served neighborhood names, sorted, deduplicated and joined by `", "`.
    pub neighborhoods_served: String,
    pub served_count:         usize,
    /// Physical length in metres.
    pub distance:             f64,
    pub geometry:             LineString<f64>,
}

impl RouteRow {
    /// Annotate `route` with the names of `neighborhoods`.
    ///
    /// Ids that do not index into `neighborhoods` are ignored.
    pub fn from_route(route: &Route, neighborhoods: &[Neighborhood]) -> Self {
        let name_of = |i: usize| neighborhoods.get(i).map(|n| n.name.as_str());

        let mut served: Vec<&str> = route.served.iter().filter_map(|id| name_of(id.index())).collect();
        served.sort_unstable();
        served.dedup();

        Self {
            id:                   route.id.clone(),
            origin_neighborhood:  route
                .origin
                .and_then(|id| name_of(id.index()))
                .unwrap_or_default()
                .to_owned(),
            direction:            direction_label(route.direction),
            neighborhoods_served: served.join(", "),
            served_count:         served.len(),
            distance:             route.length_m,
            geometry:             route.geometry.clone(),
        }
    }
}

fn direction_label(direction: TravelDirection) -> &'static str {
    match direction {
        TravelDirection::Outbound => "outbound",
        TravelDirection::Inbound  => "inbound",
    }
}

/// Objective statistics for one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryRow {
    pub generation:    usize,
    pub evaluations:   usize,
    pub avg_distance:  f64,
    pub min_distance:  f64,
    pub max_distance:  f64,
    pub avg_uncovered: f64,
    pub min_uncovered: f64,
    pub max_uncovered: f64,
}

impl From<&GenerationStats> for HistoryRow {
    fn from(s: &GenerationStats) -> Self {
        Self {
            generation:    s.generation,
            evaluations:   s.evaluations,
            avg_distance:  s.distance.avg,
            min_distance:  s.distance.min,
            max_distance:  s.distance.max,
            avg_uncovered: s.uncovered.avg,
            min_uncovered: s.uncovered.min,
            max_uncovered: s.uncovered.max,
        }
    }
}

/// One member of the final Pareto front.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontRow {
    /// Position in the front after ordering by distance.
    pub rank_index: usize,
    pub distance:   f64,
    pub uncovered:  f64,
    /// Portfolio genes, e.g. `0-3 2-5`.
    pub genes:      String,
}

impl FrontRow {
    /// Rows for the whole front of `outcome`, cheapest first.
    pub fn from_outcome(outcome: &SearchOutcome) -> Vec<Self> {
        outcome
            .front_by_distance()
            .into_iter()
            .enumerate()
            .map(|(rank_index, ind)| Self {
                rank_index,
                distance:  ind.fitness.distance,
                uncovered: ind.fitness.uncovered,
                genes:     ind.portfolio.to_string(),
            })
            .collect()
    }
}
