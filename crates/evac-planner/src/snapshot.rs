//! Immutable dataset snapshot and the store that publishes it.
//!
//! A [`Snapshot`] bundles everything a request reads: regions, the road
//! network, node→region assignments and each region's nearest road node.
//! It is built once and never mutated; requests borrow it without locking.
//!
//! [`SnapshotStore`] holds the active snapshot behind an `Arc`.  Replacing
//! it is a pointer swap, so requests already holding the old `Arc` finish on
//! the data they started with.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use evac_core::{NodeId, RegionId, RiskLevel};
use evac_regions::RegionIndex;
use evac_spatial::RoadNetwork;

use crate::annotate::{EdgeRiskAnnotator, EdgeRiskMap};
use crate::{NodeRegionMap, PlanError, PlanResult};

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Read-only view of one loaded dataset.
pub struct Snapshot {
    regions:      RegionIndex,
    network:      RoadNetwork,
    node_regions: NodeRegionMap,
    /// Nearest road node for each region, indexed by `RegionId`.
    region_nodes: Vec<NodeId>,
}

/// Dataset counts for status displays.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapshotStats {
    pub regions:    usize,
    /// Regions labeled `low`.
    pub safe_zones: usize,
    pub nodes:      usize,
    pub edges:      usize,
}

impl Snapshot {
    /// Precompute node→region and region→node lookups.
    ///
    /// # Errors
    ///
    /// [`PlanError::EmptyNetwork`] if `network` has no nodes.
    pub fn build(regions: RegionIndex, network: RoadNetwork) -> PlanResult<Self> {
        if network.is_empty() {
            return Err(PlanError::EmptyNetwork);
        }

        let node_regions = NodeRegionMap::assign(&network, &regions);
        let region_nodes = regions
            .iter()
            .map(|(_, r)| network.nearest_node(r.pos).ok_or(PlanError::EmptyNetwork))
            .collect::<PlanResult<Vec<_>>>()?;

        let snapshot = Snapshot { regions, network, node_regions, region_nodes };
        let stats = snapshot.stats();
        tracing::info!(
            regions = stats.regions,
            safe_zones = stats.safe_zones,
            nodes = stats.nodes,
            edges = stats.edges,
            "snapshot built"
        );
        Ok(snapshot)
    }

    pub fn regions(&self) -> &RegionIndex {
        &self.regions
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn node_regions(&self) -> &NodeRegionMap {
        &self.node_regions
    }

    /// Nearest road node to `region`'s coordinates.
    pub fn region_node(&self, region: RegionId) -> Option<NodeId> {
        self.region_nodes.get(region.index()).copied()
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            regions:    self.regions.len(),
            safe_zones: self.regions.count_by_risk(RiskLevel::Low),
            nodes:      self.network.node_count(),
            edges:      self.network.edge_count(),
        }
    }

    /// Risk label for every edge.
    pub fn edge_risks(&self) -> EdgeRiskMap {
        EdgeRiskAnnotator.annotate(&self.network, &self.node_regions, &self.regions)
    }
}

// ── SnapshotStore ─────────────────────────────────────────────────────────────

/// Holder of the active [`Snapshot`].
///
/// The first [`get_or_try_init`](Self::get_or_try_init) builds the snapshot
/// while concurrent callers wait; later calls only clone the `Arc`.
#[derive(Default)]
pub struct SnapshotStore {
    active: RwLock<Option<Arc<Snapshot>>>,
    init:   Mutex<()>,
}

impl SnapshotStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            active: RwLock::new(Some(Arc::new(snapshot))),
            init:   Mutex::new(()),
        }
    }

    /// The active snapshot, if one has been published.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return the active snapshot, building it with `init` if there is none.
    ///
    /// `init` runs at most once across concurrent callers.  If it fails the
    /// store stays empty and the error is returned; a later call retries.
    pub fn get_or_try_init<F>(&self, init: F) -> PlanResult<Arc<Snapshot>>
    where
        F: FnOnce() -> PlanResult<Snapshot>,
    {
        if let Some(s) = self.current() {
            return Ok(s);
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished while we waited.
        if let Some(s) = self.current() {
            return Ok(s);
        }

        let snapshot = Arc::new(init()?);
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Publish `snapshot` and return the one it replaced.
    pub fn swap(&self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        let next = Some(Arc::new(snapshot));
        let prev = std::mem::replace(
            &mut *self.active.write().unwrap_or_else(PoisonError::into_inner),
            next,
        );
        tracing::info!(replaced = prev.is_some(), "snapshot swapped");
        prev
    }
}
