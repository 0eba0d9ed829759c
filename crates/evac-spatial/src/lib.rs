//! `evac-spatial`: road network, spatial indexing, and shortest paths.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                       |
//! |-------------|----------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`             |
//! | [`router`]  | `Router` trait, `ShortestPathTree`, `DijkstraRouter`           |
//! | [`loader`]  | `load_network_csv`, `load_network_reader`                      |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `evac-core` types.      |

pub mod error;
pub mod loader;
pub mod network;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use loader::{load_network_csv, load_network_reader};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use router::{DijkstraRouter, Router, ShortestPathTree};
