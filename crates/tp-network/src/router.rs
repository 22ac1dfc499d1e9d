//! Routing trait, default Dijkstra implementation, and point-to-point /
//! batch route planning.
//!
//! # Pluggability
//!
//! [`RoutePlanner`] calls path search through the [`Router`] trait, so a
//! contraction hierarchy or A* can be swapped in without touching callers.
//! The default [`DijkstraRouter`] minimises the discounted edge weight.
//!
//! # Missing paths
//!
//! Disconnected endpoints are routine in real road layers.  They come back as
//! `None`, are logged at `debug`, and never abort a batch.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo::{BooleanOps, BoundingRect, Centroid, Coord, Intersects, LineString, MultiPolygon};
use tracing::{debug, info, warn};

use tp_core::{EdgeId, NeighborhoodId, NodeId};

use crate::layers::Neighborhood;
use crate::network::RoadNetwork;
use crate::{NetworkError, NetworkResult};

// ── Path ──────────────────────────────────────────────────────────────────────

/// A node/edge sequence found by a [`Router`].
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Visited nodes, source first.  `nodes.len() == edges.len() + 1`.
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
    /// Sum of discounted edge weights.
    pub cost: f64,
}

impl Path {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Implementations must be `Send + Sync` so one router can serve parallel
/// fitness evaluations.
pub trait Router: Send + Sync {
    /// Least-cost path from `from` to `to`, or `None` if unreachable.
    fn path(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Option<Path>;
}

/// Standard Dijkstra over the CSR graph, cost = `edge_weight`.
///
/// Among equal-cost paths the one settled first by the heap wins; the heap
/// orders equal costs by `NodeId` so results are deterministic.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn path(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Option<Path> {
        dijkstra(network, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost, then by node (reversed for std's max-heap).
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(network: &RoadNetwork, from: NodeId, to: NodeId) -> Option<Path> {
    let n = network.node_count();
    if from.index() >= n || to.index() >= n {
        return None;
    }
    if from == to {
        return Some(Path { nodes: vec![from], edges: vec![], cost: 0.0 });
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    dist[from.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: from });

    while let Some(State { cost, node }) = heap.pop() {
        if node == to {
            return Some(reconstruct(network, &prev_edge, from, to, cost));
        }
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }
        for edge in network.out_edges(node) {
            let next = network.edge_to[edge.index()];
            let next_cost = cost + network.edge_weight[edge.index()];
            if next_cost < dist[next.index()] {
                dist[next.index()] = next_cost;
                prev_edge[next.index()] = edge;
                heap.push(State { cost: next_cost, node: next });
            }
        }
    }
    None
}

fn reconstruct(
    network:   &RoadNetwork,
    prev_edge: &[EdgeId],
    from:      NodeId,
    to:        NodeId,
    cost:      f64,
) -> Path {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| network.edge_to[e.index()]));
    Path { nodes, edges, cost }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// Travel sense relative to the hub.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TravelDirection {
    /// Origin → destination (neighborhood → hub in batch routing).
    Outbound,
    /// Destination → origin (hub → neighborhood in batch routing).
    Inbound,
}

impl TravelDirection {
    /// One-letter tag used in route ids.
    pub fn tag(self) -> char {
        match self {
            TravelDirection::Outbound => 'O',
            TravelDirection::Inbound  => 'I',
        }
    }
}

/// A materialised route: a path of ≥ 2 nodes with its geometry.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    /// Neighborhood the route was computed for, if any.
    pub origin: Option<NeighborhoodId>,
    pub direction: TravelDirection,
    pub nodes: Vec<NodeId>,
    pub geometry: LineString<f64>,
    /// Physical length in metres.
    pub length_m: f64,
    /// Discounted routing cost.
    pub cost: f64,
    /// Neighborhoods whose polygons the geometry intersects, ascending.
    pub served: Vec<NeighborhoodId>,
}

/// Anything that exposes a polyline, so geometric post-processing can work on
/// routes and bare lines alike.
pub trait RouteGeometry {
    fn geometry(&self) -> &LineString<f64>;
}

impl RouteGeometry for Route {
    fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }
}

impl RouteGeometry for LineString<f64> {
    fn geometry(&self) -> &LineString<f64> {
        self
    }
}

/// Neighborhoods whose polygon `line` intersects.
pub fn served_neighborhoods(line: &LineString<f64>, neighborhoods: &[Neighborhood]) -> Vec<NeighborhoodId> {
    let Some(bbox) = line.bounding_rect() else {
        return Vec::new();
    };
    neighborhoods
        .iter()
        .enumerate()
        .filter_map(|(i, n)| {
            let poly = n.polygons()?;
            let hit = poly.bounding_rect().is_some_and(|r| r.intersects(&bbox)) && poly.intersects(line);
            hit.then_some(NeighborhoodId(i as u32))
        })
        .collect()
}

// ── Hub ───────────────────────────────────────────────────────────────────────

/// Where batch routes converge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Hub {
    /// Centroid of the union of all neighborhood polygons.
    #[default]
    StudyArea,
    /// Centroid of the neighborhood with this name (whitespace-trimmed).
    Named(String),
}

impl Hub {
    /// Resolve the hub to a point.
    ///
    /// # Errors
    ///
    /// [`NetworkError::UnknownNeighborhood`] for an unmatched name,
    /// [`NetworkError::InvalidHub`] when no centroid can be computed.
    pub fn point(&self, neighborhoods: &[Neighborhood]) -> NetworkResult<Coord<f64>> {
        match self {
            Hub::Named(name) => {
                let wanted = name.trim();
                let n = neighborhoods
                    .iter()
                    .find(|n| n.name.trim() == wanted)
                    .ok_or_else(|| NetworkError::UnknownNeighborhood(wanted.to_string()))?;
                n.centroid().ok_or(NetworkError::InvalidHub)
            }
            Hub::StudyArea => {
                // Overlapping polygons count once.
                let area = neighborhoods
                    .iter()
                    .filter_map(Neighborhood::polygons)
                    .fold(MultiPolygon::new(Vec::new()), |acc, mp| acc.union(mp));
                area.centroid().map(|p| p.0).ok_or(NetworkError::InvalidHub)
            }
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            Hub::Named(name) => Some(name.trim()),
            Hub::StudyArea => None,
        }
    }
}

// ── RoutePlanner ──────────────────────────────────────────────────────────────

/// Point-to-point and batch route planning over one immutable network.
pub struct RoutePlanner<'n, R: Router = DijkstraRouter> {
    network: &'n RoadNetwork,
    router:  R,
}

impl<'n, R: Router> RoutePlanner<'n, R> {
    /// # Errors
    ///
    /// [`NetworkError::EmptyGraph`] if `network` has no nodes.
    pub fn new(network: &'n RoadNetwork, router: R) -> NetworkResult<Self> {
        if network.is_empty() {
            return Err(NetworkError::EmptyGraph);
        }
        Ok(Self { network, router })
    }

    pub fn network(&self) -> &'n RoadNetwork {
        self.network
    }

    /// Snap `point` to the nearest graph node.
    pub fn nearest_node(&self, point: Coord<f64>) -> NetworkResult<NodeId> {
        self.network.nearest_node(point)
    }

    /// Least-cost route between two nodes.
    ///
    /// `Inbound` swaps source and target.  A trivial result (both ends on the
    /// same node) is `None`, as is an unreachable target.
    pub fn route_nodes(&self, origin: NodeId, destination: NodeId, direction: TravelDirection) -> Option<Route> {
        let (source, target) = match direction {
            TravelDirection::Outbound => (origin, destination),
            TravelDirection::Inbound  => (destination, origin),
        };
        if source == target {
            return None;
        }
        let Some(path) = self.router.path(self.network, source, target) else {
            debug!(%source, %target, "no path");
            return None;
        };
        if path.nodes.len() < 2 {
            return None;
        }

        let geometry: LineString<f64> = path.nodes.iter().map(|&n| self.network.position(n)).collect();
        let length_m = path.edges.iter().map(|e| self.network.edge_raw_m[e.index()]).sum();
        Some(Route {
            id: String::new(),
            origin: None,
            direction,
            nodes: path.nodes,
            geometry,
            length_m,
            cost: path.cost,
            served: Vec::new(),
        })
    }

    /// Snap both points and route between them.
    ///
    /// # Errors
    ///
    /// Only index failures; a missing path is `Ok(None)`.
    pub fn shortest_path(
        &self,
        origin:      Coord<f64>,
        destination: Coord<f64>,
        direction:   TravelDirection,
    ) -> NetworkResult<Option<Route>> {
        let o = self.nearest_node(origin)?;
        let d = self.nearest_node(destination)?;
        Ok(self.route_nodes(o, d, direction))
    }

    /// Route every neighborhood (except the hub itself) to/from the hub.
    ///
    /// Non-polygonal rows and unroutable neighborhoods are skipped.  Each
    /// route is named `"{index}{O|I}"` and annotated with the neighborhoods
    /// it crosses.
    pub fn batch_routes(
        &self,
        neighborhoods: &[Neighborhood],
        hub:           &Hub,
        direction:     TravelDirection,
    ) -> NetworkResult<Vec<Route>> {
        let hub_node = self.nearest_node(hub.point(neighborhoods)?)?;
        let hub_name = hub.name();

        let mut routes = Vec::new();
        for (i, n) in neighborhoods.iter().enumerate() {
            if hub_name.is_some_and(|h| n.name.trim() == h) {
                continue;
            }
            let Some(centroid) = n.centroid() else {
                continue;
            };
            let origin = self.nearest_node(centroid)?;
            let Some(mut route) = self.route_nodes(origin, hub_node, direction) else {
                continue;
            };
            route.id = format!("{i}{}", direction.tag());
            route.origin = Some(NeighborhoodId(i as u32));
            route.served = served_neighborhoods(&route.geometry, neighborhoods);
            routes.push(route);
        }

        if routes.is_empty() {
            warn!(?direction, "no routes generated");
        } else {
            info!(?direction, routes = routes.len(), "batch routes computed");
        }
        Ok(routes)
    }
}
