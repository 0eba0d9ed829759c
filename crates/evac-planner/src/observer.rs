//! Request observer trait for tracing and instrumentation.

use evac_spatial::SpatialError;

use crate::planner::{PlanStage, RoutePlan};

/// Callbacks invoked by [`RoutePlanner::compute_routes_observed`] as a
/// request moves through its stages.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// [`RoutePlanner::compute_routes_observed`]: crate::RoutePlanner::compute_routes_observed
///
/// # Example: stage timer
///
/// ```rust,ignore
/// struct StageTimer { started: Instant }
///
/// impl PlanObserver for StageTimer {
///     fn on_stage(&mut self, stage: PlanStage) {
///         println!("{stage:?} at {:?}", self.started.elapsed());
///     }
/// }
/// ```
pub trait PlanObserver {
    /// Called on entry to every stage, including the terminal `Done` or
    /// `Failed`.
    fn on_stage(&mut self, _stage: PlanStage) {}

    /// Called when a selected destination is dropped because its path could
    /// not be rebuilt.
    fn on_destination_skipped(&mut self, _region: &str, _error: &SpatialError) {}

    /// Called once with the finished plan.
    fn on_plan_complete(&mut self, _plan: &RoutePlan) {}
}

/// A [`PlanObserver`] that does nothing.
pub struct NoopObserver;

impl PlanObserver for NoopObserver {}
