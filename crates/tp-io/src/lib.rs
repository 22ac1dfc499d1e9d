//! `tp-io` — input layers and result tables for the transit route planner.
//!
//! | Direction | Module     | Content                                              |
//! |-----------|------------|------------------------------------------------------|
//! | in        | [`loader`] | roads, neighborhoods, articulation points (CSV + WKT) |
//! | out       | [`csv`]    | route layers, search history, Pareto front (CSV)     |
//!
//! All writers implement [`OutputWriter`]; [`HistoryObserver`] plugs a
//! history writer into the optimizer as a `tp_search::SearchObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tp_io::{HistoryObserver, HistoryWriter};
//!
//! let mut obs = HistoryObserver::new(HistoryWriter::new(Path::new("history.csv"))?);
//! let outcome = optimizer.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("history not written: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod loader;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::{write_route_layer, FrontWriter, HistoryWriter, RouteLayerWriter};
pub use error::{IoError, IoResult};
pub use loader::{
    filter_roads_by_area, load_articulation_points, load_articulation_points_reader,
    load_neighborhoods, load_neighborhoods_reader, load_roads, load_roads_reader,
};
pub use observer::HistoryObserver;
pub use row::{FrontRow, HistoryRow, RouteRow};
pub use writer::OutputWriter;
