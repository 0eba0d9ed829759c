//! `evac-core`: foundational types for the evacuation route engine.
//!
//! This crate is a dependency of every other `evac-*` crate.  It has no
//! `evac-*` dependencies and only `thiserror` (plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                    |
//! |-----------|---------------------------------------------|
//! | [`ids`]   | `NodeId`, `EdgeId`, `RegionId`              |
//! | [`geo`]   | `GeoPoint`, haversine distance              |
//! | [`risk`]  | `RiskLevel`                                 |
//! | [`error`] | `CoreError`, `CoreResult`                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod geo;
pub mod ids;
pub mod risk;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{EARTH_RADIUS_M, GeoPoint};
pub use ids::{EdgeId, NodeId, RegionId};
pub use risk::RiskLevel;
