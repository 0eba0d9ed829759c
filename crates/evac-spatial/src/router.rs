//! Routing trait, shortest-path trees, and the default Dijkstra implementation.
//!
//! # One search per request
//!
//! Evacuation planning needs distances from one origin to many candidate
//! destinations.  [`Router::shortest_path_tree`] runs a single full
//! single-source search and returns a [`ShortestPathTree`] holding both the
//! distance to every reachable node and the predecessor edge needed to
//! rebuild any individual path, so k destinations cost one search instead
//! of k.
//!
//! # Cost units
//!
//! Costs are physical edge lengths in **metres** (`f64`).  Travel time is a
//! presentation concern derived later from a scalar speed.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use evac_core::{EdgeId, NodeId};

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

// ── ShortestPathTree ──────────────────────────────────────────────────────────

/// Result of a single-source search: distance and predecessor edge for every
/// node reachable from `origin`.
///
/// Owned by the request that computed it; the network is never mutated.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    origin:    NodeId,
    /// `dist[v]` in metres; `f64::INFINITY` for unreachable nodes.
    dist:      Vec<f64>,
    /// `prev_edge[v]` = edge that reached v; `EdgeId::INVALID` for the origin
    /// and for unreachable nodes.
    prev_edge: Vec<EdgeId>,
}

impl ShortestPathTree {
    pub fn origin(&self) -> NodeId {
        self.origin
    }

    /// Shortest distance in metres from the origin, or `None` if `node` is
    /// unreachable or outside the network.
    pub fn distance_m(&self, node: NodeId) -> Option<f64> {
        self.dist
            .get(node.index())
            .copied()
            .filter(|d| d.is_finite())
    }

    #[inline]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.distance_m(node).is_some()
    }

    /// Iterator over `(node, distance_m)` for every reachable node, in
    /// `NodeId` order.
    pub fn reachable(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.dist
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_finite())
            .map(|(i, &d)| (NodeId(i as u32), d))
    }

    pub fn reachable_count(&self) -> usize {
        self.dist.iter().filter(|d| d.is_finite()).count()
    }

    /// Ordered node path from the origin to `destination`, both inclusive.
    ///
    /// # Errors
    ///
    /// [`SpatialError::NoPath`] if `destination` is not in the reachable set
    /// or its predecessor chain does not lead back to the origin within
    /// `node_count` hops.  [`SpatialError::NodeNotFound`] if it is outside
    /// the network.
    pub fn path_to(&self, network: &RoadNetwork, destination: NodeId) -> SpatialResult<Vec<NodeId>> {
        if !network.contains(destination) || destination.index() >= self.dist.len() {
            return Err(SpatialError::NodeNotFound(destination));
        }
        if !self.is_reachable(destination) {
            return Err(SpatialError::NoPath { from: self.origin, to: destination });
        }

        let no_path = || SpatialError::NoPath { from: self.origin, to: destination };
        let mut path = vec![destination];
        let mut cur = destination;
        while let Some(&e) = self.prev_edge.get(cur.index()).filter(|e| **e != EdgeId::INVALID) {
            // A simple path visits each node at most once.
            if path.len() >= network.node_count() {
                return Err(no_path());
            }
            cur = *network.edge_from.get(e.index()).ok_or_else(no_path)?;
            path.push(cur);
        }
        if cur != self.origin {
            return Err(no_path());
        }
        path.reverse();
        Ok(path)
    }

    /// Assemble a tree from raw search output, for [`Router`]s implemented
    /// outside this crate.
    ///
    /// `dist[v]` is in metres (`f64::INFINITY` when unreachable) and
    /// `prev_edge[v]` is the edge that reached v (`EdgeId::INVALID` at the
    /// origin).  Parts that do not describe a tree over the network passed
    /// to [`path_to`](Self::path_to) make it fail with
    /// [`SpatialError::NoPath`].
    pub fn from_parts(origin: NodeId, dist: Vec<f64>, prev_edge: Vec<EdgeId>) -> Self {
        Self { origin, dist, prev_edge }
    }

    /// Inverse of [`from_parts`](Self::from_parts).
    pub fn into_parts(self) -> (NodeId, Vec<f64>, Vec<EdgeId>) {
        (self.origin, self.dist, self.prev_edge)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one router can serve concurrent
/// requests against a shared, immutable network.
pub trait Router: Send + Sync {
    /// Distances and predecessors from `origin` to every reachable node.
    fn shortest_path_tree(&self, network: &RoadNetwork, origin: NodeId) -> SpatialResult<ShortestPathTree>;

    /// Ordered node path from `origin` to `destination`.
    ///
    /// Runs a full search; callers that already hold a tree for `origin`
    /// should use [`ShortestPathTree::path_to`] instead.
    fn shortest_path(
        &self,
        network: &RoadNetwork,
        origin: NodeId,
        destination: NodeId,
    ) -> SpatialResult<Vec<NodeId>> {
        self.shortest_path_tree(network, origin)?
            .path_to(network, destination)
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR road graph, using
/// `edge_length_m` as cost.  O((V + E) log V).
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn shortest_path_tree(&self, network: &RoadNetwork, origin: NodeId) -> SpatialResult<ShortestPathTree> {
        dijkstra(network, origin)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap key with a total order over non-negative metre costs.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(network: &RoadNetwork, origin: NodeId) -> SpatialResult<ShortestPathTree> {
    if !network.contains(origin) {
        return Err(SpatialError::NodeNotFound(origin));
    }

    let n = network.node_count();
    let mut dist      = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[origin.index()] = 0.0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), origin)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost + network.edge_length_m[edge.index()];

            // Strict `<`: among parallel edges the first shortest one wins.
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Ok(ShortestPathTree { origin, dist, prev_edge })
}
