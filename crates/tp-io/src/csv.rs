//! CSV output backend.
//!
//! One file per table:
//!
//! | Writer             | Columns                                                                     |
//! |--------------------|-----------------------------------------------------------------------------|
//! | `RouteLayerWriter` | `id,origin_neighborhood,direction,neighborhoods_served,served_count,distance,wkt` |
//! | `HistoryWriter`    | `gen,evaluations,avg_distance,min_distance,max_distance,avg_uncovered,min_uncovered,max_uncovered` |
//! | `FrontWriter`      | `rank_index,distance,uncovered,genes`                                       |

use std::fs::File;
use std::path::Path;

use csv::Writer;
use tracing::debug;
use wkt::ToWkt;

use tp_network::{Neighborhood, Route};

use crate::row::{FrontRow, HistoryRow, RouteRow};
use crate::writer::OutputWriter;
use crate::IoResult;

const ROUTE_HEADER: [&str; 7] = [
    "id",
    "origin_neighborhood",
    "direction",
    "neighborhoods_served",
    "served_count",
    "distance",
    "wkt",
];

const HISTORY_HEADER: [&str; 8] = [
    "gen",
    "evaluations",
    "avg_distance",
    "min_distance",
    "max_distance",
    "avg_uncovered",
    "min_uncovered",
    "max_uncovered",
];

const FRONT_HEADER: [&str; 4] = ["rank_index", "distance", "uncovered", "genes"];

// ── Shared sink ───────────────────────────────────────────────────────────────

/// A CSV file with its header already written.
struct Table {
    inner:    Writer<File>,
    finished: bool,
    rows:     usize,
}

impl Table {
    fn create(path: &Path, header: &[&str]) -> IoResult<Self> {
        let mut inner = Writer::from_path(path)?;
        inner.write_record(header)?;
        Ok(Self { inner, finished: false, rows: 0 })
    }

    fn write(&mut self, record: &[String]) -> IoResult<()> {
        self.inner.write_record(record)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> IoResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.inner.flush()?;
        debug!(rows = self.rows, "csv table flushed");
        Ok(())
    }
}

// ── Route layer ───────────────────────────────────────────────────────────────

/// Writes a route collection, one row per route, geometry as WKT.
pub struct RouteLayerWriter {
    table: Table,
}

impl RouteLayerWriter {
    /// Create (or truncate) `path` and write the header row.
    pub fn new(path: &Path) -> IoResult<Self> {
        Ok(Self { table: Table::create(path, &ROUTE_HEADER)? })
    }
}

impl OutputWriter for RouteLayerWriter {
    type Row = RouteRow;

    fn write_row(&mut self, row: &RouteRow) -> IoResult<()> {
        self.table.write(&[
            row.id.clone(),
            row.origin_neighborhood.clone(),
            row.direction.to_owned(),
            row.neighborhoods_served.clone(),
            row.served_count.to_string(),
            row.distance.to_string(),
            row.geometry.to_wkt().to_string(),
        ])
    }

    fn finish(&mut self) -> IoResult<()> {
        self.table.finish()
    }
}

/// Annotate `routes` against `neighborhoods` and write them to `path`.
pub fn write_route_layer(path: &Path, routes: &[Route], neighborhoods: &[Neighborhood]) -> IoResult<()> {
    let mut writer = RouteLayerWriter::new(path)?;
    for route in routes {
        writer.write_row(&RouteRow::from_route(route, neighborhoods))?;
    }
    writer.finish()
}

// ── Search history ────────────────────────────────────────────────────────────

/// Writes the per-generation logbook.
pub struct HistoryWriter {
    table: Table,
}

impl HistoryWriter {
    pub fn new(path: &Path) -> IoResult<Self> {
        Ok(Self { table: Table::create(path, &HISTORY_HEADER)? })
    }
}

impl OutputWriter for HistoryWriter {
    type Row = HistoryRow;

    fn write_row(&mut self, row: &HistoryRow) -> IoResult<()> {
        self.table.write(&[
            row.generation.to_string(),
            row.evaluations.to_string(),
            row.avg_distance.to_string(),
            row.min_distance.to_string(),
            row.max_distance.to_string(),
            row.avg_uncovered.to_string(),
            row.min_uncovered.to_string(),
            row.max_uncovered.to_string(),
        ])
    }

    fn finish(&mut self) -> IoResult<()> {
        self.table.finish()
    }
}

// ── Pareto front ──────────────────────────────────────────────────────────────

/// Writes the final non-dominated front.
pub struct FrontWriter {
    table: Table,
}

impl FrontWriter {
    pub fn new(path: &Path) -> IoResult<Self> {
        Ok(Self { table: Table::create(path, &FRONT_HEADER)? })
    }
}

impl OutputWriter for FrontWriter {
    type Row = FrontRow;

    fn write_row(&mut self, row: &FrontRow) -> IoResult<()> {
        self.table.write(&[
            row.rank_index.to_string(),
            row.distance.to_string(),
            row.uncovered.to_string(),
            row.genes.clone(),
        ])
    }

    fn finish(&mut self) -> IoResult<()> {
        self.table.finish()
    }
}
