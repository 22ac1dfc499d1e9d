//! Nearest-point lookup over a fixed set of planar points.
//!
//! Two implementations sit behind [`GeometryIndex`]:
//!
//! - [`RTreeIndex`]: `rstar` R-tree, bulk-loaded; the default everywhere.
//! - [`LinearIndex`]: brute-force scan, kept as the reference behaviour.
//!
//! Both answer with the *insertion position* of the winning point and break
//! exact distance ties towards the earliest inserted point, so swapping one
//! for the other never changes results.

use geo::Coord;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use tp_core::planar;

use crate::{NetworkError, NetworkResult};

/// A set of points answering "which one is nearest to `query`?".
pub trait GeometryIndex {
    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insertion position of the point nearest to `query`.
    ///
    /// # Errors
    ///
    /// [`NetworkError::EmptyIndex`] when the index holds no points.
    fn nearest(&self, query: Coord<f64>) -> NetworkResult<usize>;
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct IndexedPoint {
    point: [f64; 2],
    pos:   usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── RTreeIndex ────────────────────────────────────────────────────────────────

/// R-tree backed index.  Construction is O(N log N) via bulk load.
pub struct RTreeIndex {
    tree: RTree<IndexedPoint>,
}

impl RTreeIndex {
    pub fn new(points: impl IntoIterator<Item = Coord<f64>>) -> Self {
        let entries: Vec<IndexedPoint> = points
            .into_iter()
            .enumerate()
            .map(|(pos, c)| IndexedPoint { point: [c.x, c.y], pos })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }
}

impl GeometryIndex for RTreeIndex {
    fn len(&self) -> usize {
        self.tree.size()
    }

    fn nearest(&self, query: Coord<f64>) -> NetworkResult<usize> {
        let q = [query.x, query.y];
        let mut iter = self.tree.nearest_neighbor_iter_with_distance_2(&q);
        let (first, best_d2) = iter.next().ok_or(NetworkError::EmptyIndex)?;

        // The iterator yields in ascending distance; collect the exact ties.
        let mut winner = first.pos;
        for (entry, d2) in iter {
            if d2 > best_d2 {
                break;
            }
            winner = winner.min(entry.pos);
        }
        Ok(winner)
    }
}

// ── LinearIndex ───────────────────────────────────────────────────────────────

/// Brute-force index: O(N) per query, no build cost.
pub struct LinearIndex {
    points: Vec<Coord<f64>>,
}

impl LinearIndex {
    pub fn new(points: impl IntoIterator<Item = Coord<f64>>) -> Self {
        Self { points: points.into_iter().collect() }
    }
}

impl GeometryIndex for LinearIndex {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn nearest(&self, query: Coord<f64>) -> NetworkResult<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (pos, &p) in self.points.iter().enumerate() {
            let d = planar::distance(p, query);
            // Strict `<` keeps the earliest point on ties.
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((pos, d));
            }
        }
        best.map(|(pos, _)| pos).ok_or(NetworkError::EmptyIndex)
    }
}
