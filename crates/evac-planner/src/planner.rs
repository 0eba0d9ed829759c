//! The request pipeline: free-text origin → ranked safe destinations.

use std::collections::HashSet;

use evac_core::{NodeId, RegionId, RiskLevel};
use evac_regions::{FuzzyResolver, IndelRatio, Similarity};
use evac_spatial::{DijkstraRouter, Router, SpatialError};

use crate::config::{PlannerConfig, RouteOptions};
use crate::observer::{NoopObserver, PlanObserver};
use crate::speed::{SpeedModel, WeatherCondition};
use crate::{PlanError, PlanResult, Snapshot};

// ── Request state ─────────────────────────────────────────────────────────────

/// Stages of one request, in order.  A request ends in exactly one of
/// `Done` or `Failed`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlanStage {
    Received,
    ResolvingOrigin,
    ComputingDistances,
    SelectingDestinations,
    BuildingRoutes,
    Done,
    Failed,
}

// ── Output ────────────────────────────────────────────────────────────────────

/// One evacuation route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub destination_region:   String,
    pub destination_id:       RegionId,
    pub destination_node:     NodeId,
    /// Origin node first, destination node last.
    pub path:                 Vec<NodeId>,
    pub distance_km:          f64,
    pub eta_min:              f64,
    pub effective_speed_kmph: f64,
}

/// Answer to one request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePlan {
    pub matched_region: String,
    pub match_score:    u8,
    pub origin_region:  RegionId,
    pub origin_node:    NodeId,
    pub weather:        WeatherCondition,
    pub hour_of_day:    u8,
    /// Ascending by `distance_km`, then destination name.  Empty when no
    /// low-risk region is reachable.
    pub routes:         Vec<Route>,
}

// ── RoutePlanner ──────────────────────────────────────────────────────────────

/// Answers "k nearest safe destinations from here" against a [`Snapshot`].
///
/// Holds no per-request state; one planner can serve concurrent requests.
/// Create with [`RoutePlanner::new`] or
/// [`RoutePlannerBuilder`][crate::RoutePlannerBuilder].
pub struct RoutePlanner<R: Router = DijkstraRouter, S: Similarity = IndelRatio> {
    pub(crate) config:   PlannerConfig,
    pub(crate) router:   R,
    pub(crate) resolver: FuzzyResolver<S>,
}

impl RoutePlanner {
    /// Default configuration, Dijkstra routing and indel similarity.
    pub fn new() -> Self {
        Self {
            config:   PlannerConfig::default(),
            router:   DijkstraRouter,
            resolver: FuzzyResolver::new(),
        }
    }
}

impl Default for RoutePlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Router, S: Similarity> RoutePlanner<R, S> {
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Compute up to `k` routes from the region best matching `query` to the
    /// nearest low-risk regions.
    ///
    /// # Errors
    ///
    /// - [`PlanError::InvalidOptions`] for an out-of-range hour, speed or
    ///   threshold.
    /// - [`PlanError::UnmatchedLocation`] if no region name scores at least
    ///   the match threshold.
    ///
    /// Destinations whose path cannot be rebuilt are skipped, not reported
    /// as errors.
    pub fn compute_routes(
        &self,
        snapshot: &Snapshot,
        query:    &str,
        options:  &RouteOptions,
    ) -> PlanResult<RoutePlan> {
        self.compute_routes_observed(snapshot, query, options, &mut NoopObserver)
    }

    /// [`compute_routes`](Self::compute_routes) with stage callbacks.
    pub fn compute_routes_observed<O: PlanObserver>(
        &self,
        snapshot: &Snapshot,
        query:    &str,
        options:  &RouteOptions,
        observer: &mut O,
    ) -> PlanResult<RoutePlan> {
        enter(observer, PlanStage::Received);
        match self.plan(snapshot, query, options, observer) {
            Ok(plan) => {
                enter(observer, PlanStage::Done);
                tracing::debug!(
                    origin = %plan.matched_region,
                    routes = plan.routes.len(),
                    "route request done"
                );
                observer.on_plan_complete(&plan);
                Ok(plan)
            }
            Err(e) => {
                enter(observer, PlanStage::Failed);
                tracing::debug!(error = %e, "route request failed");
                Err(e)
            }
        }
    }

    fn plan<O: PlanObserver>(
        &self,
        snapshot: &Snapshot,
        query:    &str,
        options:  &RouteOptions,
        observer: &mut O,
    ) -> PlanResult<RoutePlan> {
        let resolved = options.resolve(&self.config)?;
        let network = snapshot.network();

        // ── Resolve origin ────────────────────────────────────────────────
        enter(observer, PlanStage::ResolvingOrigin);
        let matched = self
            .resolver
            .resolve(query, snapshot.regions().names(), resolved.threshold)
            .map_err(|no| PlanError::UnmatchedLocation {
                query: query.to_string(),
                best:  no.best,
            })?;
        let origin_region = matched.region_id();
        let origin_node = snapshot
            .region_node(origin_region)
            .ok_or(PlanError::EmptyNetwork)?;
        tracing::debug!(
            query,
            matched = %matched.matched_name,
            score = matched.score,
            node = %origin_node,
            "origin resolved"
        );

        // ── One distance tree serves every candidate ──────────────────────
        enter(observer, PlanStage::ComputingDistances);
        let tree = self.router.shortest_path_tree(network, origin_node)?;

        // ── Rank reachable low-risk regions ───────────────────────────────
        enter(observer, PlanStage::SelectingDestinations);
        let mut candidates: Vec<(f64, &str, RegionId, NodeId)> = snapshot
            .regions()
            .regions_by_risk(RiskLevel::Low)
            .filter_map(|(id, region)| {
                let node = snapshot.region_node(id)?;
                let d = tree.distance_m(node)?;
                Some((d, region.name.as_str(), id, node))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        let mut seen = HashSet::new();
        candidates.retain(|c| seen.insert(c.1));
        candidates.truncate(resolved.k);
        tracing::debug!(
            safe_zones = snapshot.regions().count_by_risk(RiskLevel::Low),
            selected = candidates.len(),
            "destinations selected"
        );

        // ── Rebuild paths ─────────────────────────────────────────────────
        enter(observer, PlanStage::BuildingRoutes);
        let speed = resolved.effective_speed_kmph;
        let mut routes = Vec::with_capacity(candidates.len());
        for (_, name, id, node) in candidates {
            let built = tree.path_to(network, node).and_then(|path| {
                network
                    .path_length_m(&path)
                    .map(|m| (path, m))
                    .ok_or(SpatialError::NoPath { from: origin_node, to: node })
            });
            let (path, length_m) = match built {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(destination = name, error = %e, "skipping destination");
                    observer.on_destination_skipped(name, &e);
                    continue;
                }
            };

            let distance_km = length_m / 1000.0;
            routes.push(Route {
                destination_region:   name.to_string(),
                destination_id:       id,
                destination_node:     node,
                path,
                distance_km,
                eta_min:              SpeedModel::eta_min(distance_km, speed),
                effective_speed_kmph: speed,
            });
        }

        Ok(RoutePlan {
            matched_region: matched.matched_name,
            match_score:    matched.score,
            origin_region,
            origin_node,
            weather:        options.weather,
            hour_of_day:    options.hour_of_day,
            routes,
        })
    }
}

fn enter<O: PlanObserver>(observer: &mut O, stage: PlanStage) {
    tracing::debug!(?stage, "route request stage");
    observer.on_stage(stage);
}
