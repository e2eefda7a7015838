//! Single source shortest paths in hops.

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

/// Marks vertices that cannot be reached from the source.
pub const UNREACHABLE: u64 = u64::MAX;

/// Number of edges on the shortest directed path from `source` to every
/// vertex, [`UNREACHABLE`] when there is none. Whatever value the loader
/// gave a vertex is overwritten in the first superstep.
#[derive(Debug, Clone, Copy)]
pub struct ShortestPaths {
    pub source: u64,
}

impl ShortestPaths {
    pub fn new(source: u64) -> Self {
        Self { source }
    }
}

impl VertexProgram for ShortestPaths {
    type Id = u64;
    type Value = u64;
    type EdgeValue = ();
    type Message = u64;

    fn compute(
        &self,
        ctx: &mut ComputeContext<'_, Self>,
        messages: &[u64],
    ) -> Result<(), ProgramError> {
        let candidate = if ctx.superstep() == 0 {
            ctx.set_value(UNREACHABLE);
            (*ctx.id() == self.source).then_some(0)
        } else {
            messages.iter().copied().min()
        };
        if let Some(hops) = candidate.filter(|hops| hops < ctx.value()) {
            ctx.set_value(hops);
            ctx.send_message_to_neighbors(hops.saturating_add(1))?;
        }
        ctx.vote_to_halt();
        Ok(())
    }
}

/// Hop distance from `source` to every vertex of `graph`.
pub fn shortest_paths(
    graph: GraphStore<u64, u64, ()>,
    source: u64,
    threads: Option<usize>,
) -> Result<FxHashMap<u64, u64>, BspError> {
    let mut job = Job::new(ShortestPaths::new(source)).with_combiner(MinCombiner);
    if let Some(threads) = threads {
        job = job.num_threads(threads);
    }
    let result = job.run(graph, &TupleWriter)?;
    Ok(result.output.into_iter().collect())
}
