//! Removal of routes that are geometrically covered by another route.
//!
//! Route `b` is *contained* in route `a` when every point of `b` lies within
//! `tolerance` of `a`, i.e. `b` lies inside a `tolerance` buffer around `a`.
//!
//! The test is exact.  The buffer around one segment of `a` is a capsule,
//! a convex shape, so it meets a segment of `b` in a single parameter
//! interval.  `b`'s segment is covered when the union of these intervals
//! over all segments of `a` spans `[0, 1]`.
//!
//! A route is removed when it is contained in another route that is not
//! contained back in it (a strict subline), or when it duplicates an
//! earlier route (mutual containment keeps the first).  Removal is therefore
//! idempotent: a second pass over the survivors removes nothing.

use geo::{BoundingRect, Coord, LineString, Rect};
use tracing::info;

use tp_core::planar;

use crate::router::RouteGeometry;

/// Slack on interval ends, absorbing rounding in the quadratic solve.
const COVER_EPS: f64 = 1e-9;

/// Outcome of [`SublineFilter::filter`].
#[derive(Debug)]
pub struct FilterOutcome<T> {
    pub kept:    Vec<T>,
    pub removed: usize,
}

/// Pairwise containment filter.  O(n²) containment tests, pruned by
/// bounding-box overlap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SublineFilter {
    pub tolerance: f64,
}

impl Default for SublineFilter {
    fn default() -> Self {
        Self { tolerance: 0.01 }
    }
}

impl SublineFilter {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// `true` if `inner` lies within `tolerance` of `outer`.
    pub fn is_contained(&self, inner: &LineString<f64>, outer: &LineString<f64>) -> bool {
        if inner.0.is_empty() || outer.0.is_empty() {
            return false;
        }
        if inner.0.len() == 1 {
            return planar::line_distance(inner.0[0], outer) <= self.tolerance;
        }
        let outer_segments: Vec<(Coord<f64>, Coord<f64>)> = if outer.0.len() == 1 {
            vec![(outer.0[0], outer.0[0])]
        } else {
            outer.lines().map(|l| (l.start, l.end)).collect()
        };
        inner.lines().all(|seg| self.segment_covered(seg.start, seg.end, &outer_segments))
    }

    /// Whether segment `a`–`b` lies inside the union of the capsules around
    /// `outer`.
    fn segment_covered(&self, a: Coord<f64>, b: Coord<f64>, outer: &[(Coord<f64>, Coord<f64>)]) -> bool {
        if a == b {
            return outer
                .iter()
                .any(|&(c, d)| planar::segment_distance(a, c, d) <= self.tolerance);
        }
        let mut spans: Vec<(f64, f64)> = outer
            .iter()
            .filter_map(|&(c, d)| capsule_span(a, b, c, d, self.tolerance))
            .filter_map(|(lo, hi)| {
                let (lo, hi) = (lo.max(0.0), hi.min(1.0));
                (lo <= hi).then_some((lo, hi))
            })
            .collect();
        spans.sort_by(|x, y| x.0.total_cmp(&y.0));

        let mut reached = 0.0;
        for (lo, hi) in spans {
            if lo > reached + COVER_EPS {
                return false;
            }
            reached = f64::max(reached, hi);
        }
        reached >= 1.0 - COVER_EPS
    }

    /// Positions in `items` that would be removed.
    pub fn redundant<T: RouteGeometry>(&self, items: &[T]) -> Vec<usize> {
        let boxes: Vec<Option<Rect<f64>>> = items
            .iter()
            .map(|it| it.geometry().bounding_rect().map(|r| self.grow(r)))
            .collect();

        let mut out = Vec::new();
        for (i, inner) in items.iter().enumerate() {
            let Some(inner_box) = inner.geometry().bounding_rect() else {
                continue;
            };
            let covered = items.iter().enumerate().any(|(j, outer)| {
                if i == j {
                    return false;
                }
                let fits = boxes[j].is_some_and(|b| rect_within(inner_box, b));
                if !fits || !self.is_contained(inner.geometry(), outer.geometry()) {
                    return false;
                }
                // Equal geometries: only the later copy goes.
                j < i || !self.is_contained(outer.geometry(), inner.geometry())
            });
            if covered {
                out.push(i);
            }
        }
        out
    }

    /// Drop every redundant item, preserving the order of the rest.
    pub fn filter<T: RouteGeometry>(&self, items: Vec<T>) -> FilterOutcome<T> {
        let redundant = self.redundant(&items);
        let original = items.len();
        let kept: Vec<T> = items
            .into_iter()
            .enumerate()
            .filter(|(i, _)| redundant.binary_search(i).is_err())
            .map(|(_, it)| it)
            .collect();
        info!(original, removed = redundant.len(), kept = kept.len(), "sublines filtered");
        FilterOutcome { kept, removed: redundant.len() }
    }

    fn grow(&self, r: Rect<f64>) -> Rect<f64> {
        let t = self.tolerance;
        Rect::new(
            Coord { x: r.min().x - t, y: r.min().y - t },
            Coord { x: r.max().x + t, y: r.max().y + t },
        )
    }
}

fn rect_within(inner: Rect<f64>, outer: Rect<f64>) -> bool {
    inner.min().x >= outer.min().x
        && inner.min().y >= outer.min().y
        && inner.max().x <= outer.max().x
        && inner.max().y <= outer.max().y
}

// ── Capsule geometry ──────────────────────────────────────────────────────────

/// Parameters `t` for which `a + t·(b − a)` lies within `r` of segment
/// `c`–`d`, as one closed interval (unbounded in `t`; callers clip).
fn capsule_span(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>, d: Coord<f64>, r: f64) -> Option<(f64, f64)> {
    let pieces = [disc_span(a, b, c, r), disc_span(a, b, d, r), slab_span(a, b, c, d, r)];
    // The capsule is convex, so the union of its pieces along the line is
    // one interval.
    pieces.into_iter().flatten().reduce(|x, y| (x.0.min(y.0), x.1.max(y.1)))
}

/// Points of line `a`–`b` within `r` of `centre`.
fn disc_span(a: Coord<f64>, b: Coord<f64>, centre: Coord<f64>, r: f64) -> Option<(f64, f64)> {
    let v = b - a;
    let w = a - centre;
    let qa = v.x * v.x + v.y * v.y;
    let qb = v.x * w.x + v.y * w.y;
    let qc = w.x * w.x + w.y * w.y - r * r;
    let disc = qb * qb - qa * qc;
    if qa == 0.0 || disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    Some(((-qb - root) / qa, (-qb + root) / qa))
}

/// Points of line `a`–`b` that project inside segment `c`–`d` and lie within
/// `r` of its supporting line.
fn slab_span(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>, d: Coord<f64>, r: f64) -> Option<(f64, f64)> {
    let len = planar::distance(c, d);
    if len == 0.0 {
        return None;
    }
    let u = Coord { x: (d.x - c.x) / len, y: (d.y - c.y) / len };
    let n = Coord { x: -u.y, y: u.x };
    let v = b - a;
    let w = a - c;
    let dot = |p: Coord<f64>, q: Coord<f64>| p.x * q.x + p.y * q.y;

    let along = linear_span(dot(w, u), dot(v, u), 0.0, len)?;
    let across = linear_span(dot(w, n), dot(v, n), -r, r)?;
    let (lo, hi) = (along.0.max(across.0), along.1.min(across.1));
    (lo <= hi).then_some((lo, hi))
}

/// Solve `lo ≤ p + q·t ≤ hi` for `t`.
fn linear_span(p: f64, q: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    if q == 0.0 {
        return (lo..=hi).contains(&p).then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let (t0, t1) = ((lo - p) / q, (hi - p) / q);
    Some((t0.min(t1), t0.max(t1)))
}
