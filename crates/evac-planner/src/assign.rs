//! Nearest-region assignment for every road node.
//!
//! Computed once per snapshot.  O(V × R) haversine evaluations; each node's
//! result depends only on its own position, so the `parallel` feature splits
//! the node range across Rayon's pool with no synchronization.

use evac_core::{GeoPoint, NodeId, RegionId};
use evac_regions::RegionIndex;
use evac_spatial::RoadNetwork;

/// `NodeId → RegionId` lookup, nearest region by great-circle distance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeRegionMap {
    /// Indexed by `NodeId`.  `RegionId::INVALID` everywhere when the region
    /// index is empty.
    regions: Vec<RegionId>,
}

impl NodeRegionMap {
    /// Assign each node of `network` to its nearest region in `regions`.
    /// Ties go to the lowest `RegionId`.
    pub fn assign(network: &RoadNetwork, regions: &RegionIndex) -> Self {
        let nearest = |pos: &GeoPoint| regions.nearest_region(*pos).unwrap_or(RegionId::INVALID);

        #[cfg(not(feature = "parallel"))]
        let assigned: Vec<RegionId> = network.node_pos.iter().map(nearest).collect();

        #[cfg(feature = "parallel")]
        let assigned: Vec<RegionId> = {
            use rayon::prelude::*;
            network.node_pos.par_iter().map(nearest).collect()
        };

        tracing::info!(
            nodes = assigned.len(),
            regions = regions.len(),
            "assigned road nodes to regions"
        );
        Self { regions: assigned }
    }

    /// Region assigned to `node`, or `None` if the node is outside the
    /// network or there are no regions.
    pub fn region_of(&self, node: NodeId) -> Option<RegionId> {
        self.regions
            .get(node.index())
            .copied()
            .filter(|&r| r != RegionId::INVALID)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Nodes assigned to `region`, in `NodeId` order.
    pub fn nodes_in(&self, region: RegionId) -> impl Iterator<Item = NodeId> + '_ {
        self.regions
            .iter()
            .enumerate()
            .filter(move |(_, r)| **r == region)
            .map(|(i, _)| NodeId(i as u32))
    }
}
