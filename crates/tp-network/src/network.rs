//! Road network representation and low-level builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_raw_m`, `edge_weight`,
//! `edge_segment`) are sorted by source node and indexed by `EdgeId`.
//! Parallel edges between the same node pair are kept (multigraph).
//!
//! # Node identity
//!
//! Nodes are coordinates.  [`RoadNetworkBuilder::node_at`] returns the
//! existing `NodeId` when the exact coordinate was seen before, so two road
//! features that share an endpoint share a node.
//!
//! # Spatial index
//!
//! An [`RTreeIndex`] over node positions answers nearest-node queries.

use geo::Coord;
use rustc_hash::FxHashMap;

use tp_core::{EdgeId, NodeId, SegmentId};

use crate::index::{GeometryIndex, RTreeIndex};
use crate::NetworkResult;

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Immutable directed road multigraph in CSR format plus a node index.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`] or
/// [`NetworkBuilder`](crate::NetworkBuilder).
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Planar position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Coord<f64>>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,

    /// Physical segment length in metres.
    pub edge_raw_m: Vec<f64>,

    /// Attractiveness-discounted cost.  Dijkstra edge weight.
    pub edge_weight: Vec<f64>,

    /// Road feature each edge was cut from.
    pub edge_segment: Vec<SegmentId>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTreeIndex,
}

impl RoadNetwork {
    /// A network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// All edges from `from` to `to` (several when parallel edges exist).
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges(from)
            .filter(move |e| self.edge_to[e.index()] == to)
    }

    #[inline]
    pub fn position(&self, node: NodeId) -> Coord<f64> {
        self.node_pos[node.index()]
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node nearest to `pos`; ties go to the lowest `NodeId`.
    ///
    /// # Errors
    ///
    /// [`NetworkError::EmptyIndex`](crate::NetworkError::EmptyIndex) when the
    /// network has no nodes.
    pub fn nearest_node(&self, pos: Coord<f64>) -> NetworkResult<NodeId> {
        self.spatial_idx.nearest(pos).map(|i| NodeId(i as u32))
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// `build()` stable-sorts edges by source node (parallel edges keep their
/// insertion order), constructs the CSR arrays, and bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use tp_core::SegmentId;
/// use tp_network::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.node_at(Coord { x: 0.0, y: 0.0 });
/// let c = b.node_at(Coord { x: 100.0, y: 0.0 });
/// b.add_road(a, c, 100.0, 60.0, SegmentId(1));
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<Coord<f64>>,
    lookup:    FxHashMap<(u64, u64), NodeId>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:    NodeId,
    to:      NodeId,
    raw_m:   f64,
    weight:  f64,
    segment: SegmentId,
}

/// Bit pattern key for exact coordinate identity (`-0.0` folded into `0.0`).
#[inline]
fn coord_key(c: Coord<f64>) -> (u64, u64) {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:     Vec::new(),
            lookup:    FxHashMap::default(),
            raw_edges: Vec::new(),
        }
    }

    /// The `NodeId` for coordinate `pos`, creating the node on first sight.
    pub fn node_at(&mut self, pos: Coord<f64>) -> NodeId {
        if let Some(&id) = self.lookup.get(&coord_key(pos)) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.lookup.insert(coord_key(pos), id);
        id
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(
        &mut self,
        from:    NodeId,
        to:      NodeId,
        raw_m:   f64,
        weight:  f64,
        segment: SegmentId,
    ) {
        self.raw_edges.push(RawEdge { from, to, raw_m, weight, segment });
    }

    /// Add edges in **both directions** with identical attributes.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, raw_m: f64, weight: f64, segment: SegmentId) {
        self.add_directed_edge(a, b, raw_m, weight, segment);
        self.add_directed_edge(b, a, raw_m, weight, segment);
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load, where N = nodes, E = edges.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:    Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:      Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_raw_m:   Vec<f64>       = raw.iter().map(|e| e.raw_m).collect();
        let edge_weight:  Vec<f64>       = raw.iter().map(|e| e.weight).collect();
        let edge_segment: Vec<SegmentId> = raw.iter().map(|e| e.segment).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let spatial_idx = RTreeIndex::new(self.nodes.iter().copied());

        RoadNetwork {
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_raw_m,
            edge_weight,
            edge_segment,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
