//! `evac-planner`: risk-aware evacuation route planning.
//!
//! # Request pipeline
//!
//! ```text
//! compute_routes(snapshot, query, options):
//!   ① Received
//!   ② ResolvingOrigin      : fuzzy-match query against region names;
//!                             below threshold → UnmatchedLocation.
//!                             Matched region → its nearest road node.
//!   ③ ComputingDistances   : one single-source shortest-path tree.
//!   ④ SelectingDestinations: low-risk regions, reachable, sorted by
//!                             (distance, name), first k (cap 10).
//!   ⑤ BuildingRoutes       : rebuild each path; ETA from SpeedModel.
//!                             A failed rebuild skips that destination.
//!   ⑥ Done | Failed
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`assign`]   | `NodeRegionMap`: nearest region per road node             |
//! | [`annotate`] | `EdgeRiskAnnotator`, `EdgeRiskMap`                         |
//! | [`speed`]    | `WeatherCondition`, `SpeedModel`, congestion bands         |
//! | [`config`]   | `PlannerConfig`, `RouteOptions`                            |
//! | [`snapshot`] | `Snapshot`, `SnapshotStats`, `SnapshotStore`               |
//! | [`planner`]  | `RoutePlanner`, `RoutePlan`, `Route`, `PlanStage`          |
//! | [`builder`]  | `RoutePlannerBuilder`                                      |
//! | [`observer`] | `PlanObserver`, `NoopObserver`                             |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs node→region assignment on Rayon's thread pool.    |
//! | `serde`    | Derives `Serialize`/`Deserialize` on config and output.|
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use evac_planner::{RouteOptions, RoutePlanner, Snapshot, WeatherCondition};
//!
//! let snapshot = Snapshot::build(regions, network)?;
//! let plan = RoutePlanner::new().compute_routes(
//!     &snapshot,
//!     "andheri east",
//!     &RouteOptions::default().k(3).weather(WeatherCondition::HeavyRain),
//! )?;
//! ```

pub mod annotate;
pub mod assign;
pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod planner;
pub mod snapshot;
pub mod speed;


pub use annotate::{EdgeRiskAnnotator, EdgeRiskMap};
pub use assign::NodeRegionMap;
pub use builder::RoutePlannerBuilder;
pub use config::{PlannerConfig, RouteOptions, MAX_ROUTES};
pub use error::{PlanError, PlanResult};
pub use observer::{NoopObserver, PlanObserver};
pub use planner::{PlanStage, Route, RoutePlan, RoutePlanner};
pub use snapshot::{Snapshot, SnapshotStats, SnapshotStore};
pub use speed::{CongestionBand, SpeedModel, WeatherCondition, WeatherMultipliers};
