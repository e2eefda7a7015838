#![allow(dead_code)]

use bulkstep::prelude::*;
use proptest::prelude::*;
use rustc_hash::FxHashMap;

pub fn build_edge_list(len: usize, num_vertices: u64) -> impl Strategy<Value = Vec<(u64, u64)>> {
    proptest::collection::vec((0..num_vertices, 0..num_vertices), 0..=len)
}

/// Builds a symmetric graph, every edge added in both directions.
pub fn build_graph_from_edge_list(
    edges: &[(u64, u64)],
    n_partitions: usize,
) -> GraphStore<u64, u64, ()> {
    let mut builder = GraphBuilder::new(n_partitions);
    for &(src, dst) in edges {
        builder.ensure_vertex(src, 0);
        builder.ensure_vertex(dst, 0);
        builder.add_edge(src, dst, ());
        builder.add_edge(dst, src, ());
    }
    builder.build().unwrap()
}

/// Components by union-find, labelled with their smallest vertex.
pub fn reference_components(edges: &[(u64, u64)]) -> FxHashMap<u64, u64> {
    fn find(parent: &mut FxHashMap<u64, u64>, v: u64) -> u64 {
        let p = parent[&v];
        if p == v {
            return v;
        }
        let root = find(parent, p);
        parent.insert(v, root);
        root
    }

    let mut parent: FxHashMap<u64, u64> = FxHashMap::default();
    for &(src, dst) in edges {
        parent.entry(src).or_insert(src);
        parent.entry(dst).or_insert(dst);
        let (a, b) = (find(&mut parent, src), find(&mut parent, dst));
        // the smaller root wins so roots stay component minima
        if a < b {
            parent.insert(b, a);
        } else if b < a {
            parent.insert(a, b);
        }
    }
    let vertices: Vec<u64> = parent.keys().copied().collect();
    vertices
        .into_iter()
        .map(|v| (v, find(&mut parent, v)))
        .collect()
}
