//! `evac-regions`: flood-risk labeled regions and place-name resolution.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`region`]   | `RegionRecord`, `Region`, `RegionIndex`, `normalize_name`     |
//! | [`loader`]   | `load_regions_csv`, `load_regions_reader`, `read_records`     |
//! | [`resolver`] | `Similarity` trait, `IndelRatio`, `FuzzyResolver`, `MatchResult`, `NoMatch` |
//! | [`error`]    | `RegionError`, `RegionResult<T>`                              |
//!
//! Risk labels are produced by an external model and consumed here as data;
//! nothing in this crate derives or adjusts them.

pub mod error;
pub mod loader;
pub mod region;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use error::{RegionError, RegionResult};
pub use loader::{load_regions_csv, load_regions_reader, read_records};
pub use region::{normalize_name, Region, RegionIndex, RegionRecord};
pub use resolver::{
    FuzzyResolver, IndelRatio, MatchResult, NoMatch, Similarity, DEFAULT_MATCH_THRESHOLD,
    MAX_QUERY_CHARS, STRICT_MATCH_THRESHOLD,
};
