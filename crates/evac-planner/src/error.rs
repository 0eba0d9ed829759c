use thiserror::Error;

use evac_regions::{MatchResult, RegionError};
use evac_spatial::SpatialError;

/// Errors produced by `evac-planner`.
///
/// `Data`, `Graph` and `EmptyNetwork` come from snapshot construction and
/// mean the snapshot must not be served.  `UnmatchedLocation` and
/// `InvalidOptions` are per-request failures.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("region data error: {0}")]
    Data(#[from] RegionError),

    #[error("road network error: {0}")]
    Graph(#[from] SpatialError),

    #[error("road network has no nodes")]
    EmptyNetwork,

    #[error("no region matches {query:?}{}", closest(.best))]
    UnmatchedLocation {
        query: String,
        /// Closest candidate below the threshold, if there was any candidate.
        best:  Option<MatchResult>,
    },

    #[error("planner configuration error: {0}")]
    Config(String),

    #[error("invalid route options: {0}")]
    InvalidOptions(String),
}

fn closest(best: &Option<MatchResult>) -> String {
    match best {
        Some(m) => format!(" (closest: {:?}, score {})", m.matched_name, m.score),
        None    => String::new(),
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
