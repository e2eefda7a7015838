//! Connected components by minimum label propagation.
//!
//! Every vertex starts with its own id as label and keeps forwarding the
//! smallest label it has seen along its outgoing edges. On a symmetric
//! (undirected) graph every vertex ends up labelled with the smallest id of
//! its component after at most `diameter + 2` supersteps.

use crate::{
    core::{
        state::combiner::MinCombiner,
        storage::GraphStore,
        utils::errors::{BspError, ProgramError},
    },
    db::task::{context::ComputeContext, program::VertexProgram, runner::Job},
    io::TupleWriter,
};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl VertexProgram for ConnectedComponents {
    type Id = u64;
    type Value = u64;
    type EdgeValue = ();
    type Message = u64;

    fn compute(
        &self,
        ctx: &mut ComputeContext<'_, Self>,
        messages: &[u64],
    ) -> Result<(), ProgramError> {
        if ctx.superstep() == 0 {
            let id = *ctx.id();
            ctx.set_value(id);
            ctx.send_message_to_neighbors(id)?;
        } else if let Some(min) = messages
            .iter()
            .copied()
            .min()
            .filter(|min| min < ctx.value())
        {
            ctx.set_value(min);
            ctx.send_message_to_neighbors(min)?;
        }
        // woken up again by any smaller label
        ctx.vote_to_halt();
        Ok(())
    }
}

/// Labels every vertex with the smallest id of its component.
///
/// # Arguments
///
/// * `graph` - A symmetric graph, every edge present in both directions
/// * `threads` - Number of threads to use, the shared pool when `None`
///
/// # Returns
///
/// A map from vertex id to the component label.
pub fn connected_components(
    graph: GraphStore<u64, u64, ()>,
    threads: Option<usize>,
) -> Result<FxHashMap<u64, u64>, BspError> {
    let mut job = Job::new(ConnectedComponents).with_combiner(MinCombiner);
    if let Some(threads) = threads {
        job = job.num_threads(threads);
    }
    let result = job.run(graph, &TupleWriter)?;
    Ok(result.output.into_iter().collect())
}
