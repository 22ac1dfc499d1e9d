//! `tp-network` — weighted road network, spatial indexing, and routing.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                   |
//! |--------------------|------------------------------------------------------------|
//! | [`layers`]         | `RoadFeature`, `Neighborhood`, `ArticulationPoint`, enums  |
//! | [`index`]          | `GeometryIndex` trait, `RTreeIndex`, `LinearIndex`         |
//! | [`attractiveness`] | `AttractivenessModel`, `AttractivenessConfig`              |
//! | [`network`]        | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`         |
//! | [`builder`]        | `NetworkBuilder`, `BuildConfig`, `RoadAttributePolicy`     |
//! | [`router`]         | `Router` trait, `DijkstraRouter`, `RoutePlanner`, `Route`  |
//! | [`subline`]        | `SublineFilter`                                            |
//! | [`error`]          | `NetworkError`, `NetworkResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on configuration types.    |

pub mod attractiveness;
pub mod builder;
pub mod error;
pub mod index;
pub mod layers;
pub mod network;
pub mod router;
pub mod subline;


pub use attractiveness::{AttractivenessConfig, AttractivenessModel, DiscountRule};
pub use builder::{BuildConfig, BuildReport, NetworkBuilder, RoadAttributePolicy};
pub use error::{NetworkError, NetworkResult};
pub use index::{GeometryIndex, LinearIndex, RTreeIndex};
pub use layers::{ArticulationPoint, DevelopmentClass, Direction, Neighborhood, RoadFeature};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use router::{
    served_neighborhoods, DijkstraRouter, Hub, Path, Route, RouteGeometry, RoutePlanner, Router,
    TravelDirection,
};
pub use subline::{FilterOutcome, SublineFilter};
