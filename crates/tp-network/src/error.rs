//! Network-subsystem error type.

use thiserror::Error;

use tp_core::{CoreError, SegmentId};

/// Errors produced by `tp-network`.
///
/// A missing path between two nodes is deliberately absent: routing returns
/// `Option` and the caller decides what a miss means.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("nearest-point query against an empty index")]
    EmptyIndex,

    #[error("input layer {0:?} is empty")]
    EmptyLayer(&'static str),

    #[error("road {segment}: invalid {attribute} {value:?}")]
    InvalidRoadAttribute {
        segment:   SegmentId,
        attribute: &'static str,
        value:     Option<String>,
    },

    #[error("neighborhood {0:?} not found")]
    UnknownNeighborhood(String),

    #[error("could not determine a hub point")]
    InvalidHub,

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
