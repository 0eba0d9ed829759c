use thiserror::Error;

use evac_core::{CoreError, RegionId};

/// Region dataset errors.  All of them are load-time and fatal.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("region record {row}: missing {field}")]
    MissingField { row: usize, field: &'static str },

    #[error("region record {row} ({name:?}): coordinates out of range")]
    InvalidCoordinate { row: usize, name: String },

    #[error("region record {row}: {source}")]
    InvalidRisk {
        row:    usize,
        #[source]
        source: CoreError,
    },

    #[error("region record {row}: name {name:?} duplicates {first}")]
    DuplicateName { row: usize, name: String, first: RegionId },

    #[error("region CSV is missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("region parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RegionResult<T> = Result<T, RegionError>;
