use crate::{
    core::{
        entities::{Edge, Vertex},
        state::router::{route, Outbox},
        storage::GraphLayout,
        utils::errors::ProgramError,
    },
    db::task::program::VertexProgram,
    io::GraphWriter,
};

type ProgramVertex<P> = Vertex<
    <P as VertexProgram>::Id,
    <P as VertexProgram>::Value,
    <P as VertexProgram>::EdgeValue,
>;

/// Everything a vertex can see and do while it computes.
///
/// The context borrows the vertex mutably and the outbox of its partition, so
/// a compute invocation can only ever touch its own vertex. Messages are
/// buffered and only become visible in the next superstep.
pub struct ComputeContext<'a, P: VertexProgram> {
    superstep: usize,
    vertex: &'a mut ProgramVertex<P>,
    layout: &'a GraphLayout<P::Id>,
    outbox: &'a mut Outbox<P::Id, P::Message>,
    total_num_vertices: usize,
    total_num_edges: usize,
    halted: bool,
    send_error: Option<ProgramError>,
}

impl<'a, P: VertexProgram> ComputeContext<'a, P> {
    pub(crate) fn new(
        superstep: usize,
        vertex: &'a mut ProgramVertex<P>,
        layout: &'a GraphLayout<P::Id>,
        outbox: &'a mut Outbox<P::Id, P::Message>,
        total_num_vertices: usize,
        total_num_edges: usize,
    ) -> Self {
        Self {
            superstep,
            vertex,
            layout,
            outbox,
            total_num_vertices,
            total_num_edges,
            halted: false,
            send_error: None,
        }
    }

    pub fn superstep(&self) -> usize {
        self.superstep
    }

    pub fn id(&self) -> &P::Id {
        self.vertex.id()
    }

    pub fn value(&self) -> &P::Value {
        self.vertex.value()
    }

    pub fn value_mut(&mut self) -> &mut P::Value {
        self.vertex.value_mut()
    }

    pub fn set_value(&mut self, value: P::Value) {
        *self.vertex.value_mut() = value;
    }

    pub fn edges(&self) -> &[Edge<P::Id, P::EdgeValue>] {
        self.vertex.edges()
    }

    pub fn total_num_vertices(&self) -> usize {
        self.total_num_vertices
    }

    pub fn total_num_edges(&self) -> usize {
        self.total_num_edges
    }

    /// Sends `msg` to `target`, delivered at the start of the next superstep.
    ///
    /// Fails if `target` is not a vertex of the graph. The failure aborts the
    /// job even when the program ignores the returned error.
    pub fn send_message(&mut self, target: &P::Id, msg: P::Message) -> Result<(), ProgramError> {
        let sent = route(self.layout, self.outbox, target, msg);
        record(&mut self.send_error, sent)
    }

    /// Sends a copy of `msg` along every outgoing edge.
    pub fn send_message_to_neighbors(&mut self, msg: P::Message) -> Result<(), ProgramError> {
        let Self {
            vertex,
            layout,
            outbox,
            send_error,
            ..
        } = self;
        for edge in vertex.edges() {
            let sent = route(*layout, &mut **outbox, &edge.target, msg.clone());
            record(send_error, sent)?;
        }
        Ok(())
    }

    /// Marks the vertex inactive once this superstep ends. A message sent to
    /// it later wakes it up again.
    pub fn vote_to_halt(&mut self) {
        self.halted = true;
    }

    /// Whether the vertex voted to halt and the first failed send, if any.
    pub(crate) fn finish(self) -> (bool, Option<ProgramError>) {
        (self.halted, self.send_error)
    }
}

// keeps the first failure for the executor and hands the program a copy
fn record(
    slot: &mut Option<ProgramError>,
    sent: Result<(), ProgramError>,
) -> Result<(), ProgramError> {
    match sent {
        Ok(()) => Ok(()),
        Err(err) => {
            let copy = mirror(&err);
            slot.get_or_insert(err);
            Err(copy)
        }
    }
}

fn mirror(err: &ProgramError) -> ProgramError {
    match err {
        ProgramError::UnknownVertex { target } => ProgramError::UnknownVertex {
            target: target.clone(),
        },
        ProgramError::Combine { target, source } => ProgramError::Combine {
            target: target.clone(),
            source: Box::new(ProgramError::msg(source.to_string())),
        },
        other => ProgramError::msg(other.to_string()),
    }
}

/// What a vertex can see once the job is over: its final state and the
/// writer collecting output records. Nothing can be sent or changed.
pub struct CleanupContext<'a, P: VertexProgram, W: GraphWriter<P::Id, P::Value>> {
    superstep: usize,
    vertex: &'a ProgramVertex<P>,
    writer: &'a W,
    records: &'a mut Vec<W::Output>,
}

impl<'a, P: VertexProgram, W: GraphWriter<P::Id, P::Value>> CleanupContext<'a, P, W> {
    pub(crate) fn new(
        superstep: usize,
        vertex: &'a ProgramVertex<P>,
        writer: &'a W,
        records: &'a mut Vec<W::Output>,
    ) -> Self {
        Self {
            superstep,
            vertex,
            writer,
            records,
        }
    }

    /// Number of supersteps the job ran.
    pub fn superstep(&self) -> usize {
        self.superstep
    }

    pub fn vertex(&self) -> &'a ProgramVertex<P> {
        self.vertex
    }

    pub fn id(&self) -> &'a P::Id {
        self.vertex.id()
    }

    pub fn value(&self) -> &'a P::Value {
        self.vertex.value()
    }

    /// Adds one output record.
    pub fn write(&mut self, id: &P::Id, value: &P::Value) {
        self.records.push(self.writer.write(id, value));
    }
}
