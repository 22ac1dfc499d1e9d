//! Euclidean geometry helpers for projected (metric) coordinates.
//!
//! All inputs are expected to share one planar CRS with metre units; nothing
//! here reprojects.  Functions take `geo::Coord<f64>` by value because the
//! type is `Copy` and 16 bytes.

use geo::{Coord, LineString};

/// Straight-line distance between two coordinates.
#[inline]
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Midpoint of the segment `a`–`b`.
#[inline]
pub fn midpoint(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    Coord { x: (a.x + b.x) * 0.5, y: (a.y + b.y) * 0.5 }
}

/// Distance from `p` to the closed segment `a`–`b`.
pub fn segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    distance(p, Coord { x: a.x + t * dx, y: a.y + t * dy })
}

/// Distance from `p` to the nearest point of `line`.
///
/// Returns `f64::INFINITY` for an empty line.
pub fn line_distance(p: Coord<f64>, line: &LineString<f64>) -> f64 {
    match line.0.len() {
        0 => f64::INFINITY,
        1 => distance(p, line.0[0]),
        _ => line
            .lines()
            .map(|l| segment_distance(p, l.start, l.end))
            .fold(f64::INFINITY, f64::min),
    }
}
