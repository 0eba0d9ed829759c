//! Per-edge risk labels for map presentation.
//!
//! An edge carries the risk of the region assigned to its source node.
//! Routing never reads these labels.

use evac_core::{EdgeId, NodeId, RiskLevel};
use evac_regions::RegionIndex;
use evac_spatial::RoadNetwork;

use crate::NodeRegionMap;

/// Derives an [`EdgeRiskMap`] from node→region assignments.
#[derive(Copy, Clone, Debug, Default)]
pub struct EdgeRiskAnnotator;

impl EdgeRiskAnnotator {
    /// Risk label of a single edge.  `Unknown` if the source node has no
    /// assigned region.
    pub fn edge_risk(
        &self,
        network:      &RoadNetwork,
        node_regions: &NodeRegionMap,
        regions:      &RegionIndex,
        edge:         EdgeId,
    ) -> RiskLevel {
        network
            .edge_from
            .get(edge.index())
            .and_then(|&from| node_regions.region_of(from))
            .and_then(|r| regions.get(r))
            .map_or(RiskLevel::Unknown, |r| r.risk)
    }

    /// Labels for every edge of `network`.
    pub fn annotate(
        &self,
        network:      &RoadNetwork,
        node_regions: &NodeRegionMap,
        regions:      &RegionIndex,
    ) -> EdgeRiskMap {
        let risks = (0..network.edge_count())
            .map(|e| self.edge_risk(network, node_regions, regions, EdgeId(e as u32)))
            .collect();
        EdgeRiskMap { risks }
    }
}

/// Risk label per `EdgeId`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeRiskMap {
    risks: Vec<RiskLevel>,
}

impl EdgeRiskMap {
    pub fn get(&self, edge: EdgeId) -> Option<RiskLevel> {
        self.risks.get(edge.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.risks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.risks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, RiskLevel)> + '_ {
        self.risks
            .iter()
            .enumerate()
            .map(|(i, &r)| (EdgeId(i as u32), r))
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        self.risks.iter().filter(|&&r| r == level).count()
    }

    /// One label per consecutive node pair of `path`.  Among parallel edges
    /// the shortest one is reported, matching how distances are counted.
    /// Pairs with no connecting edge are `Unknown`.
    pub fn path_risks(&self, network: &RoadNetwork, path: &[NodeId]) -> Vec<RiskLevel> {
        path.windows(2)
            .map(|w| {
                if !network.contains(w[0]) {
                    return RiskLevel::Unknown;
                }
                network
                    .out_edges(w[0])
                    .filter(|e| network.edge_to[e.index()] == w[1])
                    .min_by(|a, b| {
                        network.edge_length_m[a.index()]
                            .total_cmp(&network.edge_length_m[b.index()])
                            .then(a.cmp(b))
                    })
                    .and_then(|e| self.get(e))
                    .unwrap_or(RiskLevel::Unknown)
            })
            .collect()
    }
}
