//! Input layers handed over by the loader.
//!
//! All three layers must already share one planar, metric CRS.  Road
//! attributes arrive as raw text so that validation happens in exactly one
//! place ([`NetworkBuilder`](crate::NetworkBuilder)) under an explicit policy.

use std::fmt;
use std::str::FromStr;

use geo::{Centroid, Coord, Geometry, LineString, MultiLineString, MultiPolygon, Point};

use tp_core::{CoreError, SegmentId};

// ── Direction ─────────────────────────────────────────────────────────────────

/// Permitted travel direction along a road's digitized order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Against digitized order only (`-1`).
    Reverse,
    /// Both ways (`0`).
    Bidirectional,
    /// Digitized order only (`1`).
    Forward,
}

impl Direction {
    /// Numeric code used by the source layers.
    pub fn code(self) -> i8 {
        match self {
            Direction::Reverse       => -1,
            Direction::Bidirectional => 0,
            Direction::Forward       => 1,
        }
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    /// Accepts `-1 | 0 | 1` or `reverse | bidirectional | forward`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "-1" | "reverse"                => Ok(Direction::Reverse),
            "0" | "bidirectional" | "both"  => Ok(Direction::Bidirectional),
            "1" | "forward"                 => Ok(Direction::Forward),
            other => Err(CoreError::Parse(format!("unknown direction code {other:?}"))),
        }
    }
}

// ── DevelopmentClass ──────────────────────────────────────────────────────────

/// Development-pole classification of a neighborhood.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DevelopmentClass {
    None,
    Emerging,
    Consolidated,
    Planned,
}

impl FromStr for DevelopmentClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "nenhum"              => Ok(DevelopmentClass::None),
            "emerging" | "emergente"       => Ok(DevelopmentClass::Emerging),
            "consolidated" | "consolidado" => Ok(DevelopmentClass::Consolidated),
            "planned" | "planejado"        => Ok(DevelopmentClass::Planned),
            other => Err(CoreError::Parse(format!("unknown development class {other:?}"))),
        }
    }
}

impl fmt::Display for DevelopmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DevelopmentClass::None         => "none",
            DevelopmentClass::Emerging     => "emerging",
            DevelopmentClass::Consolidated => "consolidated",
            DevelopmentClass::Planned      => "planned",
        };
        f.write_str(s)
    }
}

// ── RoadFeature ───────────────────────────────────────────────────────────────

/// One road feature from the line layer.
#[derive(Clone, Debug)]
pub struct RoadFeature {
    pub id: SegmentId,
    /// One or more polylines; a plain `LineString` becomes a single part.
    pub geometry: MultiLineString<f64>,
    /// Raw direction code as read (`None` when the column was empty).
    pub direction: Option<String>,
    /// Raw declared length as read.  Optional: edge lengths are always
    /// derived from geometry, but a present value must be numeric.
    pub length: Option<String>,
}

impl RoadFeature {
    /// Build a feature from already-typed values.
    pub fn new(id: i64, line: LineString<f64>, direction: Direction) -> Self {
        Self {
            id:        SegmentId(id),
            geometry:  MultiLineString::new(vec![line]),
            direction: Some(direction.code().to_string()),
            length:    None,
        }
    }
}

// ── Neighborhood ──────────────────────────────────────────────────────────────

/// A neighborhood polygon: routing endpoint and coverage unit.
#[derive(Clone, Debug)]
pub struct Neighborhood {
    pub name: String,
    pub geometry: Geometry<f64>,
    pub class: Option<DevelopmentClass>,
    /// Polygonal view of `geometry`, `None` for points/lines.
    polygons: Option<MultiPolygon<f64>>,
}

impl Neighborhood {
    pub fn new(
        name: impl Into<String>,
        geometry: impl Into<Geometry<f64>>,
        class: Option<DevelopmentClass>,
    ) -> Self {
        let geometry = geometry.into();
        let polygons = match &geometry {
            Geometry::Polygon(p)       => Some(MultiPolygon::new(vec![p.clone()])),
            Geometry::MultiPolygon(mp) => Some(mp.clone()),
            _                          => None,
        };
        Self { name: name.into(), geometry, class, polygons }
    }

    /// The polygon(s), or `None` for a non-polygonal row.
    #[inline]
    pub fn polygons(&self) -> Option<&MultiPolygon<f64>> {
        self.polygons.as_ref()
    }

    /// Area-weighted centroid of the polygon(s).
    pub fn centroid(&self) -> Option<Coord<f64>> {
        self.polygons.as_ref()?.centroid().map(|p| p.0)
    }

    /// Effective class (`None` when unclassified).
    #[inline]
    pub fn class(&self) -> DevelopmentClass {
        self.class.unwrap_or(DevelopmentClass::None)
    }
}

// ── ArticulationPoint ─────────────────────────────────────────────────────────

/// A fixed transit anchor that pulls nearby road costs down.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ArticulationPoint {
    pub position: Coord<f64>,
}

impl From<Point<f64>> for ArticulationPoint {
    fn from(p: Point<f64>) -> Self {
        Self { position: p.0 }
    }
}
