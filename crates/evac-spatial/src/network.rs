//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length_m`) are sorted by
//! source node and indexed by `EdgeId`.  Parallel edges between the same pair
//! are kept; every distance computation uses the shortest of them.
//!
//! # Connectivity
//!
//! [`RoadNetworkBuilder::build`] keeps only the largest weakly-connected
//! component and renumbers the surviving nodes in insertion order.
//! Dropped fragments are logged, never fatal.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over unit-sphere positions answers nearest-node
//! queries.  Chord length on the unit sphere is monotonic in great-circle
//! distance, so the index ranks candidates exactly as a haversine linear scan
//! would; the final pick among near-equal candidates is made on haversine
//! distance with the lowest `NodeId` winning ties.  A network built
//! [`without_spatial_index`](RoadNetworkBuilder::without_spatial_index) falls
//! back to the linear scan.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use evac_core::{EdgeId, GeoPoint, NodeId};

use crate::{SpatialError, SpatialResult};

/// Relative slack on squared chord distance when gathering tie candidates.
const CHORD_REL_TOLERANCE: f64 = 1e-9;
/// Absolute slack on squared chord distance (≈ 6 mm on the Earth's surface).
const CHORD_ABS_TOLERANCE: f64 = 1e-18;

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a unit-sphere `[x, y, z]` point
/// with the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 3],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared chord length between two unit-sphere points.
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a spatial index for node snapping.
///
/// Immutable once built.  Do not construct directly; use
/// [`RoadNetworkBuilder`] or [`crate::loader`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Identifier of each node in the source dataset (e.g. an OSM node id).
    pub node_source_id: Vec<i64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Redundant with CSR but required for
    /// path reconstruction (trace `prev_edge` back to source).
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in metres.  Used as the Dijkstra edge cost.
    pub edge_length_m: Vec<f64>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: Option<RTree<NodeEntry>>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetwork {
            node_pos:       Vec::new(),
            node_source_id: Vec::new(),
            node_out_start: vec![0],
            edge_from:      Vec::new(),
            edge_to:        Vec::new(),
            edge_length_m:  Vec::new(),
            spatial_idx:    None,
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// Source-dataset id of `node`.
    #[inline]
    pub fn source_id(&self, node: NodeId) -> i64 {
        self.node_source_id[node.index()]
    }

    pub fn has_spatial_index(&self) -> bool {
        self.spatial_idx.is_some()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// Contiguous index range, no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Shortest length among the parallel edges `from → to`, or `None` if the
    /// two nodes are not adjacent in that direction.
    pub fn edge_length(&self, from: NodeId, to: NodeId) -> Option<f64> {
        if !self.contains(from) {
            return None;
        }
        self.out_edges(from)
            .filter(|e| self.edge_to[e.index()] == to)
            .map(|e| self.edge_length_m[e.index()])
            .min_by(f64::total_cmp)
    }

    /// Total length in metres of a node path, summing the shortest parallel
    /// edge for each hop.  `None` if any consecutive pair is not adjacent.
    ///
    /// A single-node path has length zero.
    pub fn path_length_m(&self, path: &[NodeId]) -> Option<f64> {
        path.windows(2)
            .try_fold(0.0, |acc, hop| Some(acc + self.edge_length(hop[0], hop[1])?))
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the node nearest to `pos` by haversine distance, breaking ties
    /// on the lowest `NodeId`.
    ///
    /// Uses the R-tree when one was built, else a linear scan; both return
    /// the same node.  Returns `None` only if the network has no nodes.
    pub fn nearest_node(&self, pos: GeoPoint) -> Option<NodeId> {
        match &self.spatial_idx {
            Some(idx) => self.nearest_node_indexed(idx, pos),
            None => self.nearest_node_linear(pos),
        }
    }

    /// Brute-force nearest node: O(V) haversine scan.
    pub fn nearest_node_linear(&self, pos: GeoPoint) -> Option<NodeId> {
        self.node_pos
            .iter()
            .enumerate()
            .map(|(i, &p)| (pos.distance_m(p), NodeId(i as u32)))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }

    fn nearest_node_indexed(&self, idx: &RTree<NodeEntry>, pos: GeoPoint) -> Option<NodeId> {
        let query = pos.unit_vector();
        let mut candidates = idx.nearest_neighbor_iter_with_distance_2(&query);

        let (first, best_d2) = candidates.next()?;
        let limit = best_d2 * (1.0 + CHORD_REL_TOLERANCE) + CHORD_ABS_TOLERANCE;

        // Re-rank everything within float noise of the best chord on exact
        // haversine distance, so the index and the linear scan agree.
        let mut best = (pos.distance_m(self.node_pos[first.id.index()]), first.id);
        for (entry, d2) in candidates {
            if d2 > limit {
                break;
            }
            let cand = (pos.distance_m(self.node_pos[entry.id.index()]), entry.id);
            if cand.0.total_cmp(&best.0).then(cand.1.cmp(&best.1)).is_lt() {
                best = cand;
            }
        }
        Some(best.1)
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// validates coordinates and lengths, prunes the graph to its largest
/// weakly-connected component, sorts edges by source node, constructs the CSR
/// arrays, and bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use evac_core::GeoPoint;
/// use evac_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(19.054, 72.840));
/// let c = b.add_node(GeoPoint::new(19.060, 72.836));
/// b.add_road(a, c, 750.0);
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:         Vec<GeoPoint>,
    source_ids:    Vec<i64>,
    raw_edges:     Vec<RawEdge>,
    spatial_index: bool,
}

#[derive(Clone, Copy)]
struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:         Vec::new(),
            source_ids:    Vec::new(),
            raw_edges:     Vec::new(),
            spatial_index: true,
        }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading from CSV.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:         Vec::with_capacity(nodes),
            source_ids:    Vec::with_capacity(nodes),
            raw_edges:     Vec::with_capacity(edges),
            spatial_index: true,
        }
    }

    /// Skip the R-tree; nearest-node queries will use the linear scan.
    pub fn without_spatial_index(mut self) -> Self {
        self.spatial_index = false;
        self
    }

    /// Add a road node and return its `NodeId` (sequential from 0).  The
    /// source id defaults to the same number.
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let source_id = self.nodes.len() as i64;
        self.add_source_node(source_id, pos)
    }

    /// Add a road node that carries an identifier from the source dataset.
    pub fn add_source_node(&mut self, source_id: i64, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.source_ids.push(source_id);
        id
    }

    /// Add a **directed** edge from `from` to `to` with physical length
    /// `length_m` in metres.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64) {
        self.raw_edges.push(RawEdge { from, to, length_m });
    }

    /// Convenience: add edges in **both directions** for an undirected road
    /// segment.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.add_directed_edge(a, b, length_m);
        self.add_directed_edge(b, a, length_m);
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// # Errors
    ///
    /// - [`SpatialError::InvalidCoordinate`] for a node outside WGS-84 range.
    /// - [`SpatialError::NodeNotFound`] for an edge endpoint never added.
    /// - [`SpatialError::InvalidLength`] for a negative or non-finite length.
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load, where N = nodes, E = edges.
    pub fn build(self) -> SpatialResult<RoadNetwork> {
        for (i, &pos) in self.nodes.iter().enumerate() {
            if !pos.is_valid() {
                return Err(SpatialError::InvalidCoordinate { node: NodeId(i as u32), pos });
            }
        }
        for e in &self.raw_edges {
            for end in [e.from, e.to] {
                if end.index() >= self.nodes.len() {
                    return Err(SpatialError::NodeNotFound(end));
                }
            }
            if !e.length_m.is_finite() || e.length_m < 0.0 {
                return Err(SpatialError::InvalidLength {
                    from:     e.from,
                    to:       e.to,
                    length_m: e.length_m,
                });
            }
        }

        // ── Keep the largest weakly-connected component ───────────────────
        let keep = largest_component(self.nodes.len(), &self.raw_edges);
        let mut remap = vec![NodeId::INVALID; self.nodes.len()];
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut source_ids = Vec::with_capacity(self.nodes.len());
        for (i, &kept) in keep.iter().enumerate() {
            if kept {
                remap[i] = NodeId(nodes.len() as u32);
                nodes.push(self.nodes[i]);
                source_ids.push(self.source_ids[i]);
            }
        }

        let dropped_nodes = self.nodes.len() - nodes.len();
        if dropped_nodes > 0 {
            tracing::warn!(
                dropped_nodes,
                kept_nodes = nodes.len(),
                "pruned road network to its largest weakly-connected component"
            );
        }

        // Every edge lies inside one component, so checking `from` suffices.
        let mut raw: Vec<RawEdge> = self
            .raw_edges
            .into_iter()
            .filter(|e| keep[e.from.index()])
            .map(|e| RawEdge {
                from:     remap[e.from.index()],
                to:       remap[e.to.index()],
                length_m: e.length_m,
            })
            .collect();

        // Stable sort keeps parallel edges in insertion order.
        raw.sort_by_key(|e| e.from.0);

        let node_count = nodes.len();
        let edge_count = raw.len();

        let edge_from:     Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>    = raw.iter().map(|e| e.length_m).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let spatial_idx = self.spatial_index.then(|| {
            let entries: Vec<NodeEntry> = nodes
                .iter()
                .enumerate()
                .map(|(i, &pos)| NodeEntry {
                    point: pos.unit_vector(),
                    id:    NodeId(i as u32),
                })
                .collect();
            RTree::bulk_load(entries)
        });

        tracing::info!(nodes = node_count, edges = edge_count, "road network built");

        Ok(RoadNetwork {
            node_pos: nodes,
            node_source_id: source_ids,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            spatial_idx,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Connectivity ──────────────────────────────────────────────────────────────

/// Mark the nodes of the largest weakly-connected component.  On equal sizes
/// the component containing the lowest node index wins.
fn largest_component(node_count: usize, edges: &[RawEdge]) -> Vec<bool> {
    let mut parent: Vec<u32> = (0..node_count as u32).collect();

    fn find(parent: &mut [u32], mut x: u32) -> u32 {
        while parent[x as usize] != x {
            let grand = parent[parent[x as usize] as usize];
            parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    for e in edges {
        let a = find(&mut parent, e.from.0);
        let b = find(&mut parent, e.to.0);
        if a != b {
            // Lower index becomes the root so roots stay deterministic.
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            parent[hi as usize] = lo;
        }
    }

    let mut size = vec![0u32; node_count];
    let roots: Vec<u32> = (0..node_count as u32).map(|n| find(&mut parent, n)).collect();
    for &r in &roots {
        size[r as usize] += 1;
    }

    // Roots are visited in index order; strict `>` keeps the earliest on ties.
    let mut best_root = None;
    let mut best_size = 0;
    for (n, &r) in roots.iter().enumerate() {
        if r as usize == n && size[n] > best_size {
            best_size = size[n];
            best_root = Some(r);
        }
    }

    roots.iter().map(|&r| Some(r) == best_root).collect()
}
