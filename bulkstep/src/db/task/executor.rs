//! Runs one partition through one superstep.

use crate::{
    core::{
        state::router::{Inbox, Outbox},
        storage::{GraphLayout, Partition},
        utils::errors::BspError,
        VID,
    },
    db::task::{
        context::{CleanupContext, ComputeContext},
        program::VertexProgram,
    },
    io::GraphWriter,
};

pub(crate) type ProgramPartition<P> = Partition<
    <P as VertexProgram>::Id,
    <P as VertexProgram>::Value,
    <P as VertexProgram>::EdgeValue,
>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PartitionStats {
    /// vertices that ran compute
    pub(crate) computed: usize,
    /// vertices still active after compute
    pub(crate) active: usize,
}

/// Read-only state shared by every partition during a superstep.
pub(crate) struct Superstep<'a, P: VertexProgram> {
    pub(crate) superstep: usize,
    pub(crate) program: &'a P,
    pub(crate) layout: &'a GraphLayout<P::Id>,
    pub(crate) total_num_vertices: usize,
    pub(crate) total_num_edges: usize,
}

impl<P: VertexProgram> Superstep<'_, P> {
    /// Computes every vertex of `partition` that is active or has messages
    /// in `inbox`. Vertices run in load order.
    pub(crate) fn compute_partition(
        &self,
        partition: &mut ProgramPartition<P>,
        inbox: &Inbox<P::Message>,
        outbox: &mut Outbox<P::Id, P::Message>,
    ) -> Result<PartitionStats, BspError> {
        let mut stats = PartitionStats::default();
        for (i, vertex) in partition.vertices_mut().iter_mut().enumerate() {
            let messages = inbox.messages(VID(i));
            if !vertex.is_active() && messages.is_empty() {
                continue;
            }

            let mut ctx = ComputeContext::new(
                self.superstep,
                vertex,
                self.layout,
                outbox,
                self.total_num_vertices,
                self.total_num_edges,
            );
            let result = self.program.compute(&mut ctx, messages);
            let (halted, send_error) = ctx.finish();

            // a failed send wins over whatever compute made of it
            if let Some(err) = send_error.or(result.err()) {
                return Err(BspError::from_compute(
                    self.superstep,
                    format!("{:?}", vertex.id()),
                    err,
                ));
            }

            vertex.set_active(!halted);
            stats.computed += 1;
            if !halted {
                stats.active += 1;
            }
        }
        Ok(stats)
    }
}

/// Runs cleanup for every vertex of `partition` and returns the records
/// written, in load order.
pub(crate) fn cleanup_partition<P, W>(
    program: &P,
    superstep: usize,
    partition: &ProgramPartition<P>,
    writer: &W,
) -> Result<Vec<W::Output>, BspError>
where
    P: VertexProgram,
    W: GraphWriter<P::Id, P::Value>,
{
    let mut records = Vec::with_capacity(partition.len());
    for vertex in partition.vertices() {
        let mut ctx = CleanupContext::<P, W>::new(superstep, vertex, writer, &mut records);
        program
            .cleanup(&mut ctx)
            .map_err(|source| BspError::Cleanup {
                superstep,
                vertex: format!("{:?}", vertex.id()),
                source,
            })?;
    }
    Ok(records)
}
