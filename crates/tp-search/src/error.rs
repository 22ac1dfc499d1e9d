use thiserror::Error;

use tp_core::CoreError;
use tp_network::NetworkError;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("road network has no nodes; nothing to optimise over")]
    EmptyGraph,

    #[error("route-set search needs at least 2 neighborhoods, found {found}")]
    TooFewNeighborhoods { found: usize },

    #[error("search produced an empty Pareto front")]
    EmptyFront,

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SearchResult<T> = Result<T, SearchError>;
