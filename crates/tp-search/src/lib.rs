//! `tp-search` — multi-objective route-set optimizer.
//!
//! Searches over *portfolios* (lists of neighborhood pairs) for route sets
//! that trade total distance against neighborhood coverage.
//!
//! # Objectives
//!
//! ```text
//! f1 = Σ route length            (infeasible pair → fixed penalty)
//! f2 = 1 − covered / total       (fraction of neighborhoods not touched)
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Evaluates fitness on Rayon's thread pool.              |
//! | `serde`    | Derives `Serialize`/`Deserialize` on config and results.|
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tp_search::{FrontPolicy, NoopObserver, RouteSetOptimizer, SearchConfig};
//!
//! let optimizer = RouteSetOptimizer::new(&network, &neighborhoods, SearchConfig::default())?;
//! let outcome = optimizer.run(&mut NoopObserver)?;
//! let best = outcome.select(FrontPolicy::Median)?;
//! let routes = optimizer.materialize(best);
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod fitness;
pub mod nsga2;
pub mod observer;
pub mod outcome;
pub mod portfolio;

#[cfg(test)]
mod tests;

pub use cache::{CacheStats, RouteCache, RouteRecord};
pub use config::{FrontPolicy, PortfolioBounds, SearchConfig};
pub use engine::RouteSetOptimizer;
pub use error::{SearchError, SearchResult};
pub use fitness::{Fitness, FitnessEvaluator};
pub use observer::{GenerationStats, NoopObserver, ObjectiveStats, SearchObserver};
pub use outcome::{Individual, SearchOutcome};
pub use portfolio::{Gene, GeneSampler, Mutation, Portfolio};
