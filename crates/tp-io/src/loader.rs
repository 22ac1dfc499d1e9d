//! CSV layer loader.
//!
//! Each layer is a CSV file with a header row and a `wkt` geometry column.
//! Coordinates are taken as-is: every layer must already be in the same
//! planar, metric CRS.
//!
//! # Roads
//!
//! ```csv
//! id,direction,length,wkt
//! 1,0,120.5,"LINESTRING (0 0, 120.5 0)"
//! 2,1,,"MULTILINESTRING ((0 0, 0 80), (0 80, 10 90))"
//! ```
//!
//! `direction` and `length` are kept as raw text; the network builder
//! validates them under its attribute policy.
//!
//! # Neighborhoods
//!
//! ```csv
//! name,class,wkt
//! Centro,consolidated,"POLYGON ((0 0, 100 0, 100 100, 0 100, 0 0))"
//! Vila Nova,Emergente,"POLYGON (...)"
//! Praça,,"POINT (10 10)"
//! ```
//!
//! `class` is optional and case-insensitive (English or Portuguese labels).
//! Any geometry type is accepted; non-polygonal rows are skipped downstream.
//!
//! # Articulation points
//!
//! ```csv
//! wkt
//! "POINT (50 0)"
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use geo::{BoundingRect, Geometry, Intersects, MultiLineString};
use serde::Deserialize;
use tracing::info;
use wkt::TryFromWkt;

use tp_core::SegmentId;
use tp_network::{ArticulationPoint, DevelopmentClass, Neighborhood, RoadFeature};

use crate::{IoError, IoResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RoadRecord {
    id:        i64,
    direction: Option<String>,
    length:    Option<String>,
    wkt:       String,
}

#[derive(Deserialize)]
struct NeighborhoodRecord {
    name:  String,
    class: Option<String>,
    wkt:   String,
}

#[derive(Deserialize)]
struct PointRecord {
    wkt: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the road layer from a CSV file.
pub fn load_roads(path: &Path) -> IoResult<Vec<RoadFeature>> {
    let roads = load_roads_reader(File::open(path)?)?;
    info!(path = %path.display(), features = roads.len(), "roads loaded");
    Ok(roads)
}

/// Like [`load_roads`] but accepts any `Read` source.
pub fn load_roads_reader<R: Read>(reader: R) -> IoResult<Vec<RoadFeature>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for (i, result) in rdr.deserialize::<RoadRecord>().enumerate() {
        let rec = result?;
        let row = i + 1;
        let geometry = match parse_wkt(&rec.wkt, row)? {
            Geometry::LineString(l) => MultiLineString::new(vec![l]),
            Geometry::MultiLineString(ml) => ml,
            other => return Err(unexpected(row, "LINESTRING or MULTILINESTRING", &other)),
        };
        out.push(RoadFeature {
            id:        SegmentId(rec.id),
            geometry,
            direction: non_empty(rec.direction),
            length:    non_empty(rec.length),
        });
    }
    Ok(out)
}

/// Load the neighborhood layer from a CSV file.
pub fn load_neighborhoods(path: &Path) -> IoResult<Vec<Neighborhood>> {
    let hoods = load_neighborhoods_reader(File::open(path)?)?;
    info!(path = %path.display(), features = hoods.len(), "neighborhoods loaded");
    Ok(hoods)
}

/// Like [`load_neighborhoods`] but accepts any `Read` source.
pub fn load_neighborhoods_reader<R: Read>(reader: R) -> IoResult<Vec<Neighborhood>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for (i, result) in rdr.deserialize::<NeighborhoodRecord>().enumerate() {
        let rec = result?;
        let row = i + 1;
        let class = non_empty(rec.class)
            .map(|c| c.parse::<DevelopmentClass>())
            .transpose()
            .map_err(|e| IoError::Parse(format!("row {row}: {e}")))?;
        let geometry = parse_wkt(&rec.wkt, row)?;
        out.push(Neighborhood::new(rec.name.trim(), geometry, class));
    }
    Ok(out)
}

/// Load the articulation-point layer from a CSV file.
pub fn load_articulation_points(path: &Path) -> IoResult<Vec<ArticulationPoint>> {
    let points = load_articulation_points_reader(File::open(path)?)?;
    info!(path = %path.display(), points = points.len(), "articulation points loaded");
    Ok(points)
}

/// Like [`load_articulation_points`] but accepts any `Read` source.
pub fn load_articulation_points_reader<R: Read>(reader: R) -> IoResult<Vec<ArticulationPoint>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for (i, result) in rdr.deserialize::<PointRecord>().enumerate() {
        let rec = result?;
        let row = i + 1;
        match parse_wkt(&rec.wkt, row)? {
            Geometry::Point(p) => out.push(ArticulationPoint::from(p)),
            Geometry::MultiPoint(mp) => out.extend(mp.0.into_iter().map(ArticulationPoint::from)),
            other => return Err(unexpected(row, "POINT", &other)),
        }
    }
    Ok(out)
}

/// Keep only roads that intersect at least one neighborhood polygon.
///
/// Each road id is kept at most once (first occurrence wins).
pub fn filter_roads_by_area(roads: Vec<RoadFeature>, neighborhoods: &[Neighborhood]) -> Vec<RoadFeature> {
    let areas: Vec<_> = neighborhoods
        .iter()
        .filter_map(|n| {
            let poly = n.polygons()?;
            Some((poly.bounding_rect()?, poly))
        })
        .collect();

    let original = roads.len();
    let mut seen = HashSet::new();
    let kept: Vec<RoadFeature> = roads
        .into_iter()
        .filter(|road| {
            let Some(bbox) = road.geometry.bounding_rect() else {
                return false;
            };
            areas
                .iter()
                .any(|(rect, poly)| rect.intersects(&bbox) && poly.intersects(&road.geometry))
        })
        .filter(|road| seen.insert(road.id))
        .collect();

    info!(original, kept = kept.len(), "roads clipped to study area");
    kept
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_wkt(text: &str, row: usize) -> IoResult<Geometry<f64>> {
    Geometry::<f64>::try_from_wkt_str(text.trim())
        .map_err(|e| IoError::Wkt { row, message: e.to_string() })
}

fn unexpected(row: usize, expected: &str, got: &Geometry<f64>) -> IoError {
    let kind = match got {
        Geometry::Point(_)              => "POINT",
        Geometry::Line(_)               => "LINE",
        Geometry::LineString(_)         => "LINESTRING",
        Geometry::Polygon(_)            => "POLYGON",
        Geometry::MultiPoint(_)         => "MULTIPOINT",
        Geometry::MultiLineString(_)    => "MULTILINESTRING",
        Geometry::MultiPolygon(_)       => "MULTIPOLYGON",
        Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
        Geometry::Rect(_)               => "RECT",
        Geometry::Triangle(_)           => "TRIANGLE",
    };
    IoError::Wkt { row, message: format!("expected {expected}, found {kind}") }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}
