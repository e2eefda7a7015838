//! The user facing half of a job.
//!
//! A [`VertexProgram`] is written from the point of view of a single vertex.
//! The engine calls [`VertexProgram::compute`] once per superstep for every
//! vertex that is active or has messages waiting, and
//! [`VertexProgram::cleanup`] once per vertex when the job is over.
//!
//! ```
//! use bulkstep::prelude::*;
//!
//! /// Counts the in-degree of every vertex.
//! struct InDegree;
//!
//! impl VertexProgram for InDegree {
//!     type Id = u64;
//!     type Value = usize;
//!     type EdgeValue = ();
//!     type Message = usize;
//!
//!     fn compute(
//!         &self,
//!         ctx: &mut ComputeContext<'_, Self>,
//!         messages: &[usize],
//!     ) -> Result<(), ProgramError> {
//!         if ctx.superstep() == 0 {
//!             ctx.send_message_to_neighbors(1)?;
//!         } else {
//!             ctx.set_value(messages.iter().sum());
//!         }
//!         ctx.vote_to_halt();
//!         Ok(())
//!     }
//! }
//!
//! let mut builder = GraphBuilder::new(2);
//! builder.add_vertex(Vertex::new(1, 0).with_edges([(2, ()), (3, ())])).unwrap();
//! builder.add_vertex(Vertex::new(2, 0).with_edges([(3, ())])).unwrap();
//! builder.add_vertex(Vertex::new(3, 0)).unwrap();
//!
//! let result = Job::new(InDegree)
//!     .with_combiner(SumCombiner)
//!     .run(builder.build().unwrap(), &TupleWriter)
//!     .unwrap();
//! assert_eq!(result.graph.value(&3), Some(&2));
//! ```

use crate::{
    core::{utils::errors::ProgramError, StateType, VertexId},
    db::task::context::{CleanupContext, ComputeContext},
    io::GraphWriter,
};

pub trait VertexProgram: Send + Sync + Sized {
    type Id: VertexId;
    type Value: StateType;
    type EdgeValue: StateType;
    type Message: StateType;

    /// Runs one superstep for the vertex behind `ctx`.
    ///
    /// `messages` are the messages sent to this vertex during the previous
    /// superstep, already combined when the job has a combiner. Superstep 0
    /// always starts with no messages. Returning an error aborts the job.
    fn compute(
        &self,
        ctx: &mut ComputeContext<'_, Self>,
        messages: &[Self::Message],
    ) -> Result<(), ProgramError>;

    /// Runs once for every vertex after the last superstep. Writes the
    /// vertex value unless overridden.
    fn cleanup<W>(&self, ctx: &mut CleanupContext<'_, Self, W>) -> Result<(), ProgramError>
    where
        W: GraphWriter<Self::Id, Self::Value>,
    {
        let vertex = ctx.vertex();
        ctx.write(vertex.id(), vertex.value());
        Ok(())
    }
}
