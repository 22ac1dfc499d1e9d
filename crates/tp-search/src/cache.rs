//! Process-lifetime route cache shared by all fitness evaluations.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use tp_core::NeighborhoodId;
use tp_network::Route;

use crate::portfolio::Gene;

/// Routing result for one unordered neighborhood pair.
#[derive(Clone, Debug)]
pub struct RouteRecord {
    /// Physical route length, `None` when the pair is infeasible.
    pub distance: Option<f64>,
    /// Neighborhoods the route touches, ascending.  Empty when infeasible.
    pub served: Vec<NeighborhoodId>,
    pub route: Option<Route>,
}

impl RouteRecord {
    pub fn infeasible() -> Self {
        Self { distance: None, served: Vec::new(), route: None }
    }

    pub fn from_route(route: Route) -> Self {
        Self {
            distance: Some(route.length_m),
            served:   route.served.clone(),
            route:    Some(route),
        }
    }
}

/// Hit/miss counters of a [`RouteCache`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits:    usize,
    pub misses:  usize,
}

/// `(lo, hi) → RouteRecord` map keyed by [`Gene::key`].
///
/// The network is immutable for the lifetime of a search, so entries are
/// never invalidated.  Concurrent misses on the same key may both compute;
/// the last insert wins and both values are identical.
#[derive(Default)]
pub struct RouteCache {
    map:    RwLock<FxHashMap<(u32, u32), Arc<RouteRecord>>>,
    hits:   AtomicUsize,
    misses: AtomicUsize,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached record for `gene`, computing it with `compute(lo, hi)` on a miss.
    ///
    /// The lock is not held while `compute` runs.
    pub fn get_or_compute<F>(&self, gene: Gene, compute: F) -> Arc<RouteRecord>
    where
        F: FnOnce(NeighborhoodId, NeighborhoodId) -> RouteRecord,
    {
        let key = gene.key();
        if let Some(rec) = self.map.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(rec);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let rec = Arc::new(compute(NeighborhoodId(key.0), NeighborhoodId(key.1)));
        self.map.write().insert(key, Arc::clone(&rec));
        rec
    }

    pub fn get(&self, gene: Gene) -> Option<Arc<RouteRecord>> {
        self.map.read().get(&gene.key()).cloned()
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits:    self.hits.load(Ordering::Relaxed),
            misses:  self.misses.load(Ordering::Relaxed),
        }
    }
}
