//! `tp-core` — foundational types for the transit route planner.
//!
//! This crate is a dependency of every other `tp-*` crate.  It has no `tp-*`
//! dependencies and few external ones (`geo` for coordinate types, `rand`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`ids`]      | `NodeId`, `EdgeId`, `SegmentId`, `NeighborhoodId`          |
//! | [`planar`]   | Euclidean helpers over `geo::Coord<f64>` in metric CRS     |
//! | [`rng`]      | `SearchRng` (seeded, reproducible)                         |
//! | [`error`]    | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod planar;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{EdgeId, NeighborhoodId, NodeId, SegmentId};
pub use rng::SearchRng;
