//! Turning input records into a [`GraphStore`].
//!
//! A [`GraphLoader`] is called once per input record and may add any number
//! of vertices and edges to the [`GraphBuilder`] it is handed. Edges can
//! point at vertices that a later record adds; they are attached when the
//! graph is built.
//!
//! ```
//! use bulkstep::prelude::*;
//!
//! struct Pairs;
//!
//! impl GraphLoader<u64, u64, ()> for Pairs {
//!     type Record = (u64, u64);
//!
//!     fn load(
//!         &self,
//!         _record_num: u64,
//!         (src, dst): (u64, u64),
//!         builder: &mut GraphBuilder<u64, u64, ()>,
//!     ) -> Result<(), LoadError> {
//!         builder.ensure_vertex(src, src);
//!         builder.ensure_vertex(dst, dst);
//!         builder.add_edge(src, dst, ());
//!         Ok(())
//!     }
//! }
//!
//! let graph: GraphStore<u64, u64, ()> = load_graph(&Pairs, [(1, 2), (2, 3)], 4).unwrap();
//! assert_eq!(graph.num_vertices(), 3);
//! assert_eq!(graph.num_edges(), 2);
//! ```

use crate::core::{
    storage::{GraphBuilder, GraphStore},
    utils::errors::{BspError, LoadError},
    VertexId,
};
use tracing::info;

#[cfg(feature = "io")]
pub mod source;

pub trait GraphLoader<Id, V, E> {
    type Record;

    /// Adds whatever `record` describes to `builder`. `record_num` counts
    /// records from 0 in input order.
    fn load(
        &self,
        record_num: u64,
        record: Self::Record,
        builder: &mut GraphBuilder<Id, V, E>,
    ) -> Result<(), LoadError>;
}

/// Runs `loader` over every record and builds the graph.
///
/// A failing record stops the load and is reported with its number.
pub fn load_graph<L, I, Id, V, E>(
    loader: &L,
    records: I,
    n_partitions: usize,
) -> Result<GraphStore<Id, V, E>, BspError>
where
    L: GraphLoader<Id, V, E>,
    I: IntoIterator<Item = L::Record>,
    Id: VertexId,
{
    let mut builder = GraphBuilder::new(n_partitions);
    for (record_num, record) in (0u64..).zip(records) {
        loader
            .load(record_num, record, &mut builder)
            .map_err(|source| BspError::Load {
                record: Some(record_num),
                source,
            })?;
    }
    let graph = builder.build()?;
    info!(
        vertices = graph.num_vertices(),
        edges = graph.num_edges(),
        partitions = graph.num_partitions(),
        "Graph loaded"
    );
    Ok(graph)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::entities::Vertex;

    struct Strict;

    impl GraphLoader<u64, (), ()> for Strict {
        type Record = &'static str;

        fn load(
            &self,
            _record_num: u64,
            record: &'static str,
            builder: &mut GraphBuilder<u64, (), ()>,
        ) -> Result<(), LoadError> {
            let id = record.parse::<u64>().map_err(|_| LoadError::Parse {
                field: "v",
                value: record.to_string(),
            })?;
            builder.add_vertex(Vertex::new(id, ()))
        }
    }

    fn load(records: &[&'static str]) -> Result<GraphStore<u64, (), ()>, BspError> {
        load_graph(&Strict, records.iter().copied(), 2)
    }

    #[test]
    fn every_record_is_loaded() {
        let graph = load(&["1", "2", "3"]).unwrap();
        assert_eq!(graph.num_vertices(), 3);
        assert!(graph.contains(&3));
    }

    #[test]
    fn failing_record_is_reported_by_number() {
        let err = load(&["1", "x", "3"]).unwrap_err();
        assert!(matches!(
            err,
            BspError::Load {
                record: Some(1),
                source: LoadError::Parse { field: "v", .. }
            }
        ));
    }

    #[test]
    fn duplicate_vertex_fails_the_load() {
        let err = load(&["1", "1"]).unwrap_err();
        assert!(matches!(
            err,
            BspError::Load {
                record: Some(1),
                source: LoadError::DuplicateVertex(_)
            }
        ));
    }
}
