//! Unit tests for evac-spatial.
//!
//! All tests use hand-crafted networks so they run without any data files.

#[cfg(test)]
mod helpers {
    use evac_core::{GeoPoint, NodeId};
    use crate::{RoadNetwork, RoadNetworkBuilder};

    /// Build a small grid network for testing.
    ///
    /// Nodes (lat, lon):
    ///   0:(0,0)  1:(0,1)  2:(0,2)
    ///   3:(1,0)           4:(1,2)
    ///
    /// Undirected edges: 0-1, 1-2, 0-3, 2-4, 3-4
    ///
    /// Shortest path 0→4 by length:
    ///   0→1→2→4 = 300 m  vs  0→3→4 = 600 m
    pub fn grid_network() -> (RoadNetwork, [NodeId; 5]) {
        let mut b = RoadNetworkBuilder::new();

        let n0 = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.0, 1.0));
        let n2 = b.add_node(GeoPoint::new(0.0, 2.0));
        let n3 = b.add_node(GeoPoint::new(1.0, 0.0));
        let n4 = b.add_node(GeoPoint::new(1.0, 2.0));

        b.add_road(n0, n1, 100.0);
        b.add_road(n1, n2, 100.0);
        b.add_road(n2, n4, 100.0);
        b.add_road(n0, n3, 500.0); // long detour
        b.add_road(n3, n4, 100.0);

        (b.build().unwrap(), [n0, n1, n2, n3, n4])
    }

    /// `n` nodes in a line along the equator, 1 km apart by edge length.
    pub fn line_network(n: usize) -> (RoadNetwork, Vec<NodeId>) {
        let mut b = RoadNetworkBuilder::new();
        let nodes: Vec<NodeId> = (0..n)
            .map(|i| b.add_node(GeoPoint::new(0.0, i as f64 * 0.009)))
            .collect();
        for w in nodes.windows(2) {
            b.add_road(w[0], w[1], 1_000.0);
        }
        (b.build().unwrap(), nodes)
    }
}

// ── Builder & network structure ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use evac_core::{GeoPoint, NodeId};
    use crate::{RoadNetworkBuilder, SpatialError};

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build().unwrap();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
        assert!(net.nearest_node(GeoPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn single_road() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(19.0, 72.8));
        let c = b.add_node(GeoPoint::new(19.1, 72.8));
        b.add_road(a, c, 1_000.0);
        let net = b.build().unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 2); // bidirectional
    }

    #[test]
    fn csr_out_edges() {
        let (net, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();
        assert_eq!(net.out_edges(n1).count(), 2);
        assert_eq!(net.out_degree(n0), 2); // n0→n1, n0→n3
        assert_eq!(net.out_degree(n2), 2); // n2→n1, n2→n4
        assert_eq!(net.out_degree(n3), 2); // n3→n0, n3→n4
        assert_eq!(net.out_degree(n4), 2); // n4→n2, n4→n3
    }

    #[test]
    fn out_edges_source_correctness() {
        let (net, [n0, n1, ..]) = super::helpers::grid_network();
        for e in net.out_edges(n0) {
            assert_eq!(net.edge_from[e.index()], n0);
        }
        assert!(net.out_edges(n0).any(|e| net.edge_to[e.index()] == n1));
    }

    #[test]
    fn directed_only_edge() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 100.0);
        let net = b.build().unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.out_degree(a), 1);
        assert_eq!(net.out_degree(c), 0); // no return edge
        // One-way edges still count towards weak connectivity.
        assert_eq!(net.node_count(), 2);
    }

    #[test]
    fn negative_length_rejected() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_road(a, c, -5.0);
        let err = b.build().err().unwrap();
        assert!(matches!(err, SpatialError::InvalidLength { length_m, .. } if length_m == -5.0));
        assert!(err.is_graph_error());
    }

    #[test]
    fn nan_length_rejected() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, f64::NAN);
        assert!(matches!(b.build(), Err(SpatialError::InvalidLength { .. })));
    }

    #[test]
    fn zero_length_accepted() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 0.0));
        b.add_road(a, c, 0.0);
        assert!(b.build().is_ok());
    }

    #[test]
    fn dangling_edge_rejected() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        b.add_road(a, NodeId(9), 10.0);
        assert!(matches!(b.build(), Err(SpatialError::NodeNotFound(NodeId(9)))));
    }

    #[test]
    fn invalid_coordinate_rejected() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(GeoPoint::new(120.0, 0.0));
        assert!(matches!(b.build(), Err(SpatialError::InvalidCoordinate { .. })));
    }

    #[test]
    fn keeps_largest_component_and_renumbers() {
        let mut b = RoadNetworkBuilder::new();
        // Fragment {0, 1}, main component {2, 3, 4}, isolated {5}.
        let p = |i: usize| GeoPoint::new(0.0, i as f64 * 0.01);
        let n: Vec<NodeId> = (0..6).map(|i| b.add_source_node(100 + i as i64, p(i))).collect();
        b.add_road(n[0], n[1], 10.0);
        b.add_road(n[2], n[3], 10.0);
        b.add_road(n[3], n[4], 10.0);
        let net = b.build().unwrap();

        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 4);
        // Survivors keep their relative order and source ids.
        assert_eq!(net.source_id(NodeId(0)), 102);
        assert_eq!(net.source_id(NodeId(1)), 103);
        assert_eq!(net.source_id(NodeId(2)), 104);
        assert_eq!(net.edge_length(NodeId(0), NodeId(1)), Some(10.0));
    }

    #[test]
    fn equal_components_keep_the_earliest() {
        let mut b = RoadNetworkBuilder::new();
        let n: Vec<NodeId> = (0..4).map(|i| b.add_node(GeoPoint::new(0.0, i as f64))).collect();
        b.add_road(n[2], n[3], 10.0);
        b.add_road(n[0], n[1], 10.0);
        let net = b.build().unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.source_id(NodeId(0)), 0);
        assert_eq!(net.source_id(NodeId(1)), 1);
    }
}

// ── Edge lengths ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod lengths {
    use evac_core::{GeoPoint, NodeId};
    use crate::RoadNetworkBuilder;

    #[test]
    fn parallel_edges_use_shortest() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 0.01));
        b.add_road(a, c, 1_200.0);
        b.add_road(a, c, 800.0);
        let net = b.build().unwrap();
        assert_eq!(net.edge_length(a, c), Some(800.0));
        assert_eq!(net.edge_length(c, a), Some(800.0));
        assert_eq!(net.path_length_m(&[a, c, a]), Some(1_600.0));
    }

    #[test]
    fn non_adjacent_pair_has_no_length() {
        let (net, [n0, _, _, _, n4]) = super::helpers::grid_network();
        assert_eq!(net.edge_length(n0, n4), None);
        assert_eq!(net.path_length_m(&[n0, n4]), None);
        assert_eq!(net.edge_length(NodeId(99), n0), None);
    }

    #[test]
    fn single_node_path_is_zero() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        assert_eq!(net.path_length_m(&[n0]), Some(0.0));
    }
}

// ── Spatial snap ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use evac_core::{GeoPoint, NodeId};
    use crate::RoadNetworkBuilder;

    #[test]
    fn snap_exact_position() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        assert_eq!(net.nearest_node(GeoPoint::new(0.0, 0.0)), Some(n0));
    }

    #[test]
    fn snap_nearest() {
        let (net, [n0, n1, ..]) = super::helpers::grid_network();
        assert_eq!(net.nearest_node(GeoPoint::new(0.0, 0.4)), Some(n0));
        assert_eq!(net.nearest_node(GeoPoint::new(0.0, 0.6)), Some(n1));
    }

    #[test]
    fn equidistant_nodes_pick_lowest_id() {
        let mut b = RoadNetworkBuilder::new();
        let east = b.add_node(GeoPoint::new(0.0, 1.0));
        let west = b.add_node(GeoPoint::new(0.0, -1.0));
        b.add_road(east, west, 10.0);
        let net = b.build().unwrap();
        assert_eq!(net.nearest_node(GeoPoint::new(0.0, 0.0)), Some(east));
        assert_eq!(net.nearest_node_linear(GeoPoint::new(0.0, 0.0)), Some(east));
    }

    #[test]
    fn coincident_nodes_pick_lowest_id() {
        let mut b = RoadNetworkBuilder::new();
        let hub = GeoPoint::new(19.07, 72.87);
        let first = b.add_node(hub);
        let second = b.add_node(hub);
        let third = b.add_node(hub);
        b.add_road(third, second, 0.0);
        b.add_road(second, first, 0.0);
        let net = b.build().unwrap();
        assert_eq!(net.nearest_node(hub), Some(NodeId(0)));
    }

    #[test]
    fn linear_fallback_without_index() {
        let mut b = RoadNetworkBuilder::new().without_spatial_index();
        let a = b.add_node(GeoPoint::new(19.0, 72.8));
        let c = b.add_node(GeoPoint::new(19.1, 72.9));
        b.add_road(a, c, 100.0);
        let net = b.build().unwrap();
        assert!(!net.has_spatial_index());
        assert_eq!(net.nearest_node(GeoPoint::new(19.09, 72.89)), Some(c));
    }

    #[test]
    fn indexed_lookup_agrees_with_linear_scan() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut b = RoadNetworkBuilder::new();
        let nodes: Vec<NodeId> = (0..500)
            .map(|_| {
                b.add_node(GeoPoint::new(
                    rng.gen_range(18.9..19.3),
                    rng.gen_range(72.7..73.0),
                ))
            })
            .collect();
        for w in nodes.windows(2) {
            b.add_road(w[0], w[1], 50.0);
        }
        let net = b.build().unwrap();
        assert!(net.has_spatial_index());

        for _ in 0..1_000 {
            let q = GeoPoint::new(rng.gen_range(18.8..19.4), rng.gen_range(72.6..73.1));
            assert_eq!(net.nearest_node(q), net.nearest_node_linear(q), "query {q}");
        }
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use evac_core::{EdgeId, GeoPoint, NodeId};
    use crate::{DijkstraRouter, RoadNetworkBuilder, Router, ShortestPathTree, SpatialError};

    #[test]
    fn trivial_same_node() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        let path = DijkstraRouter.shortest_path(&net, n0, n0).unwrap();
        assert_eq!(path, vec![n0]);
    }

    #[test]
    fn shortest_path_correct() {
        let (net, [n0, n1, n2, _, n4]) = super::helpers::grid_network();
        let path = DijkstraRouter.shortest_path(&net, n0, n4).unwrap();
        assert_eq!(path, vec![n0, n1, n2, n4]);
        assert_eq!(net.path_length_m(&path), Some(300.0));
    }

    #[test]
    fn tree_covers_all_reachable_nodes() {
        let (net, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();
        let tree = DijkstraRouter.shortest_path_tree(&net, n0).unwrap();
        assert_eq!(tree.origin(), n0);
        assert_eq!(tree.reachable_count(), 5);
        assert_eq!(tree.distance_m(n0), Some(0.0));
        assert_eq!(tree.distance_m(n1), Some(100.0));
        assert_eq!(tree.distance_m(n2), Some(200.0));
        assert_eq!(tree.distance_m(n4), Some(300.0));
        // n3 is cheaper via n4 (400) than directly (500).
        assert_eq!(tree.distance_m(n3), Some(400.0));
        assert_eq!(tree.path_to(&net, n3).unwrap(), vec![n0, n1, n2, n4, n3]);
    }

    #[test]
    fn tree_distance_matches_path_length() {
        let (net, nodes) = super::helpers::line_network(6);
        let tree = DijkstraRouter.shortest_path_tree(&net, nodes[0]).unwrap();
        for &n in &nodes {
            let path = tree.path_to(&net, n).unwrap();
            assert_eq!(path.first(), Some(&nodes[0]));
            assert_eq!(path.last(), Some(&n));
            assert_eq!(net.path_length_m(&path), tree.distance_m(n));
        }
        assert_eq!(tree.distance_m(nodes[5]), Some(5_000.0));
    }

    #[test]
    fn parallel_edges_route_over_shortest() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 0.01));
        b.add_directed_edge(a, c, 1_200.0);
        b.add_directed_edge(a, c, 800.0);
        let net = b.build().unwrap();
        let tree = DijkstraRouter.shortest_path_tree(&net, a).unwrap();
        assert_eq!(tree.distance_m(c), Some(800.0));
    }

    #[test]
    fn directed_one_way_blocks_return() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 100.0);
        let net = b.build().unwrap();

        assert!(DijkstraRouter.shortest_path(&net, a, c).is_ok());
        let back = DijkstraRouter.shortest_path(&net, c, a);
        assert!(matches!(back, Err(SpatialError::NoPath { from, to }) if from == c && to == a));

        let tree = DijkstraRouter.shortest_path_tree(&net, c).unwrap();
        assert!(!tree.is_reachable(a));
        assert_eq!(tree.reachable().collect::<Vec<_>>(), vec![(c, 0.0)]);
    }

    #[test]
    fn unknown_origin_is_an_error() {
        let (net, _) = super::helpers::grid_network();
        let result = DijkstraRouter.shortest_path_tree(&net, NodeId(42));
        assert!(matches!(result, Err(SpatialError::NodeNotFound(NodeId(42)))));
    }

    #[test]
    fn unknown_destination_is_an_error() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        let tree = DijkstraRouter.shortest_path_tree(&net, n0).unwrap();
        assert!(matches!(tree.path_to(&net, NodeId(42)), Err(SpatialError::NodeNotFound(_))));
        assert_eq!(tree.distance_m(NodeId(42)), None);
    }

    #[test]
    fn tree_round_trips_through_parts() {
        let (net, nodes) = super::helpers::line_network(4);
        let tree = DijkstraRouter.shortest_path_tree(&net, nodes[0]).unwrap();
        let (origin, dist, prev) = tree.into_parts();
        let tree = ShortestPathTree::from_parts(origin, dist, prev);
        assert_eq!(tree.path_to(&net, nodes[3]).unwrap(), nodes);
    }

    #[test]
    fn cyclic_predecessor_chain_is_no_path() {
        let (net, nodes) = super::helpers::line_network(4);
        let (origin, dist, mut prev) = DijkstraRouter
            .shortest_path_tree(&net, nodes[0])
            .unwrap()
            .into_parts();
        // Point node 2 at one of its own outgoing edges.
        prev[nodes[2].index()] = net.out_edges(nodes[2]).next().unwrap();
        let tree = ShortestPathTree::from_parts(origin, dist, prev);

        assert!(matches!(
            tree.path_to(&net, nodes[3]),
            Err(SpatialError::NoPath { to, .. }) if to == nodes[3]
        ));
        assert_eq!(tree.path_to(&net, nodes[1]).unwrap(), [nodes[0], nodes[1]]);
    }

    #[test]
    fn tree_from_another_network_is_no_path() {
        let (small, small_nodes) = super::helpers::line_network(2);
        let (big, big_nodes) = super::helpers::line_network(5);
        let (origin, _, mut prev) = DijkstraRouter
            .shortest_path_tree(&small, small_nodes[0])
            .unwrap()
            .into_parts();
        prev.push(EdgeId(999));
        let tree = ShortestPathTree::from_parts(origin, vec![0.0, 1_000.0, 2_000.0], prev);

        assert!(matches!(tree.path_to(&big, big_nodes[2]), Err(SpatialError::NoPath { .. })));
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use evac_core::NodeId;
    use crate::{load_network_reader, SpatialError};

    const NODES: &str = "\
id,lat,lon
10,19.000,72.800
20,19.001,72.800
30,19.002,72.800
";

    #[test]
    fn loads_nodes_and_edges() {
        let edges = "from,to,length_m,oneway\n10,20,110.0,false\n20,30,115.5,\n";
        let net = load_network_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 4);
        assert_eq!(net.source_id(NodeId(2)), 30);
        assert_eq!(net.edge_length(NodeId(2), NodeId(1)), Some(115.5));
    }

    #[test]
    fn oneway_adds_single_direction() {
        let edges = "from,to,length_m,oneway\n10,20,110.0,yes\n20,30,115.5,true\n";
        let net = load_network_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap();
        assert_eq!(net.edge_count(), 2);
        assert_eq!(net.edge_length(NodeId(1), NodeId(0)), None);
    }

    #[test]
    fn header_aliases_and_missing_oneway_column() {
        let nodes = "osmid, y, x\n1,19.0,72.8\n2,19.1,72.8\n";
        let edges = "u,v,length\n1,2,90\n";
        let net = load_network_reader(Cursor::new(nodes), Cursor::new(edges)).unwrap();
        assert_eq!(net.edge_count(), 2);
        assert_eq!(net.edge_length(NodeId(0), NodeId(1)), Some(90.0));
    }

    #[test]
    fn unknown_endpoint_rejected() {
        let edges = "from,to,length_m\n10,99,10\n";
        let err = load_network_reader(Cursor::new(NODES), Cursor::new(edges)).err().unwrap();
        assert!(matches!(err, SpatialError::UnknownSourceNode(99)));
    }

    #[test]
    fn duplicate_node_rejected() {
        let nodes = "id,lat,lon\n1,19.0,72.8\n1,19.1,72.8\n";
        let err = load_network_reader(Cursor::new(nodes), Cursor::new("from,to,length_m\n"))
            .err()
            .unwrap();
        assert!(matches!(err, SpatialError::DuplicateSourceNode(1)));
    }

    #[test]
    fn negative_length_rejected() {
        let edges = "from,to,length_m\n10,20,-1\n";
        let err = load_network_reader(Cursor::new(NODES), Cursor::new(edges)).err().unwrap();
        assert!(matches!(err, SpatialError::InvalidLength { .. }));
    }

    #[test]
    fn malformed_row_is_parse_error() {
        let edges = "from,to,length_m\n10,20,long\n";
        let err = load_network_reader(Cursor::new(NODES), Cursor::new(edges)).err().unwrap();
        assert!(matches!(err, SpatialError::Parse(_)));
    }

    #[test]
    fn bad_oneway_is_parse_error() {
        let edges = "from,to,length_m,oneway\n10,20,5,maybe\n";
        let err = load_network_reader(Cursor::new(NODES), Cursor::new(edges)).err().unwrap();
        assert!(matches!(err, SpatialError::Parse(_)));
    }
}
