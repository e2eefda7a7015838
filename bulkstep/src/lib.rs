//! # bulkstep
//!
//! bulkstep executes vertex programs over a partitioned graph in
//! bulk-synchronous-parallel supersteps. Each superstep every active vertex
//! runs its `compute` once, the messages it sends are buffered (and optionally
//! combined) per partition, and a global barrier turns them into the inboxes
//! of the next superstep. The job ends once no vertex is active and no
//! message is in flight, at which point every vertex runs `cleanup`.
//!
//! ```text
//!  loader ──► GraphStore ──► superstep 0 ──► barrier ──► superstep 1 ──► ... ──► cleanup ──► writer
//!                               │  compute      │ shuffle     │
//!                               └─► outboxes ───┴─► inboxes ──┘
//! ```
//!
//! # Example
//!
//! ```
//! use bulkstep::prelude::*;
//! use bulkstep::algorithms::connected_components::ConnectedComponents;
//!
//! let mut builder = GraphBuilder::new(2);
//! for (src, dst) in [(1u64, 2u64), (2, 1), (3, 4), (4, 3)] {
//!     builder.ensure_vertex(src, 0u64);
//!     builder.ensure_vertex(dst, 0u64);
//!     builder.add_edge(src, dst, ());
//! }
//! let graph = builder.build().unwrap();
//!
//! let result = Job::new(ConnectedComponents)
//!     .with_combiner(MinCombiner)
//!     .run(graph, &TupleWriter)
//!     .unwrap();
//!
//! assert_eq!(result.graph.value(&2), Some(&1));
//! assert_eq!(result.graph.value(&4), Some(&3));
//! ```

pub mod algorithms;
pub mod core;
pub mod db;
pub mod graph_loader;
pub mod io;

pub use bulkstep_api::core::utils::logging;

pub mod prelude {
    pub use crate::{
        core::{
            entities::{Edge, Vertex},
            state::combiner::{Combiner, MaxCombiner, MinCombiner, SumCombiner},
            storage::{GraphBuilder, GraphStore},
            utils::errors::{BspError, LoadError, ProgramError},
        },
        db::task::{
            context::{CleanupContext, ComputeContext},
            program::VertexProgram,
            runner::{CancellationHandle, Job, JobConfig, JobResult, SuperstepStats},
        },
        graph_loader::{load_graph, GraphLoader},
        io::{GraphWriter, TupleWriter},
    };
    pub use bulkstep_api::core::{StateType, VertexId};
}

#[cfg(test)]
#[macro_use]
extern crate quickcheck_macros;
