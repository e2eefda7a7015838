//! Loaders for the two common table layouts of integer id graphs.
//!
//! Vertices created by these loaders start from `V::default()` and edges
//! carry `E::default()`.

use crate::{
    core::{entities::Vertex, storage::GraphBuilder, utils::errors::LoadError},
    graph_loader::GraphLoader,
};
use csv::StringRecord;

fn field<'r>(
    record: &'r StringRecord,
    i: usize,
    name: &'static str,
) -> Result<&'r str, LoadError> {
    record
        .get(i)
        .map(str::trim)
        .ok_or(LoadError::MissingField(name))
}

fn parse_id(name: &'static str, value: &str) -> Result<u64, LoadError> {
    value.trim().parse::<u64>().map_err(|_| LoadError::Parse {
        field: name,
        value: value.to_string(),
    })
}

/// One vertex per row: `v, es` where `es` is a comma separated list of the
/// targets of the vertex's outgoing edges. An empty `es` means no edges.
///
/// ```text
/// 1,"2,3"
/// 2,"1,4"
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacencyListLoader;

impl<V: Default, E: Default> GraphLoader<u64, V, E> for AdjacencyListLoader {
    type Record = StringRecord;

    fn load(
        &self,
        _record_num: u64,
        record: StringRecord,
        builder: &mut GraphBuilder<u64, V, E>,
    ) -> Result<(), LoadError> {
        let id = parse_id("v", field(&record, 0, "v")?)?;
        let targets = field(&record, 1, "es")?
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(|t| parse_id("es", t).map(|t| (t, E::default())))
            .collect::<Result<Vec<_>, _>>()?;
        builder.add_vertex(Vertex::new(id, V::default()).with_edges(targets))
    }
}

/// One edge per row: `src, dst`. Both endpoints are created on first sight.
/// A symmetric loader also adds `dst -> src`, which turns the table into an
/// undirected graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeListLoader {
    pub symmetric: bool,
}

impl EdgeListLoader {
    pub fn new(symmetric: bool) -> Self {
        Self { symmetric }
    }
}

impl<V: Default, E: Default> GraphLoader<u64, V, E> for EdgeListLoader {
    type Record = StringRecord;

    fn load(
        &self,
        _record_num: u64,
        record: StringRecord,
        builder: &mut GraphBuilder<u64, V, E>,
    ) -> Result<(), LoadError> {
        let src = parse_id("src", field(&record, 0, "src")?)?;
        let dst = parse_id("dst", field(&record, 1, "dst")?)?;
        builder.ensure_vertex(src, V::default());
        builder.ensure_vertex(dst, V::default());
        builder.add_edge(src, dst, E::default());
        if self.symmetric {
            builder.add_edge(dst, src, E::default());
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{core::storage::GraphStore, graph_loader::load_graph};
    use itertools::Itertools;

    fn rows(rows: &[&[&str]]) -> Vec<StringRecord> {
        rows.iter().map(|r| StringRecord::from(r.to_vec())).collect()
    }

    fn targets(g: &GraphStore<u64, u64, ()>, id: u64) -> Vec<u64> {
        g.vertex(&id)
            .unwrap()
            .edges()
            .iter()
            .map(|e| e.target)
            .collect_vec()
    }

    #[test]
    fn adjacency_list_square() {
        let records = rows(&[&["1", "2,3"], &["2", "1,4"], &["3", "1, 4"], &["4", "2,3"]]);
        let g: GraphStore<u64, u64, ()> = load_graph(&AdjacencyListLoader, records, 2).unwrap();
        assert_eq!(g.num_vertices(), 4);
        assert_eq!(g.num_edges(), 8);
        assert_eq!(targets(&g, 3), vec![1, 4]);
        assert_eq!(g.value(&1), Some(&0));
    }

    #[test]
    fn adjacency_list_without_edges() {
        let records = rows(&[&["5", ""]]);
        let g: GraphStore<u64, u64, ()> = load_graph(&AdjacencyListLoader, records, 2).unwrap();
        assert!(targets(&g, 5).is_empty());
    }

    #[test]
    fn adjacency_list_rejects_bad_targets() {
        let records = rows(&[&["1", "2,x"]]);
        let err = load_graph::<_, _, u64, u64, ()>(&AdjacencyListLoader, records, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to load graph at record 0: Could not parse es from \"x\""
        );
    }

    #[test]
    fn adjacency_list_needs_both_columns() {
        let records = rows(&[&["1"]]);
        let err = load_graph::<_, _, u64, u64, ()>(&AdjacencyListLoader, records, 2).unwrap_err();
        assert!(matches!(
            err,
            crate::core::utils::errors::BspError::Load {
                source: LoadError::MissingField("es"),
                ..
            }
        ));
    }

    #[test]
    fn edge_list_symmetric() {
        let records = rows(&[&["1", "2"], &["3", "4"]]);
        let g: GraphStore<u64, u64, ()> =
            load_graph(&EdgeListLoader::new(true), records, 3).unwrap();
        assert_eq!(g.num_vertices(), 4);
        assert_eq!(g.num_edges(), 4);
        assert_eq!(targets(&g, 2), vec![1]);
        assert_eq!(targets(&g, 4), vec![3]);
    }

    #[test]
    fn edge_list_directed() {
        let records = rows(&[&["1", "2"], &["1", "3"]]);
        let g: GraphStore<u64, u64, ()> =
            load_graph(&EdgeListLoader::default(), records, 3).unwrap();
        assert_eq!(targets(&g, 1), vec![2, 3]);
        assert!(targets(&g, 2).is_empty());
    }
}
