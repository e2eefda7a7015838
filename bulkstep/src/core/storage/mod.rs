//! Partitioned vertex storage.
//!
//! Vertices are assigned to partitions by hashing their id. Each partition
//! keeps its vertices in load order and an index from id to slot. The index
//! ([`GraphLayout`]) is frozen at build time and is the only thing other
//! partitions may consult while a superstep runs; vertex state itself is only
//! reachable through the owning partition.

use crate::core::{
    entities::{Edge, Vertex},
    utils::errors::LoadError,
    VertexId, VID,
};
use bulkstep_api::core::{entities::LocalVertexRef, utils::hashing::partition_for};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct GraphLayout<Id> {
    indexes: Vec<FxHashMap<Id, VID>>,
}

impl<Id: VertexId> GraphLayout<Id> {
    fn new(n_partitions: usize) -> Self {
        Self {
            indexes: (0..n_partitions).map(|_| FxHashMap::default()).collect(),
        }
    }

    pub fn num_partitions(&self) -> usize {
        self.indexes.len()
    }

    pub fn partition_of(&self, id: &Id) -> usize {
        partition_for(id, self.num_partitions())
    }

    pub fn resolve(&self, id: &Id) -> Option<LocalVertexRef> {
        let partition = self.partition_of(id);
        self.indexes[partition]
            .get(id)
            .map(|vid| LocalVertexRef::new(partition, *vid))
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.resolve(id).is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Partition<Id, V, E> {
    id: usize,
    vertices: Vec<Vertex<Id, V, E>>,
}

impl<Id, V, E> Partition<Id, V, E> {
    fn new(id: usize) -> Self {
        Self {
            id,
            vertices: vec![],
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, vid: VID) -> Option<&Vertex<Id, V, E>> {
        self.vertices.get(vid.index())
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex<Id, V, E>> + '_ {
        self.vertices.iter()
    }

    pub fn num_edges(&self) -> usize {
        self.vertices.iter().map(|v| v.num_edges()).sum()
    }

    /// Id of the vertex in slot `vid`. Slots come from [`GraphLayout::resolve`].
    pub(crate) fn id_at(&self, vid: VID) -> &Id {
        self.vertices[vid.index()].id()
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [Vertex<Id, V, E>] {
        &mut self.vertices
    }
}

/// The graph of one job.
#[derive(Debug, Clone)]
pub struct GraphStore<Id, V, E> {
    layout: GraphLayout<Id>,
    partitions: Vec<Partition<Id, V, E>>,
    num_vertices: usize,
    num_edges: usize,
}

impl<Id: VertexId, V, E> GraphStore<Id, V, E> {
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn layout(&self) -> &GraphLayout<Id> {
        &self.layout
    }

    pub fn partitions(&self) -> &[Partition<Id, V, E>] {
        &self.partitions
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.layout.contains(id)
    }

    pub fn vertex(&self, id: &Id) -> Option<&Vertex<Id, V, E>> {
        let LocalVertexRef { partition, vid } = self.layout.resolve(id)?;
        self.partitions[partition].vertex(vid)
    }

    pub fn value(&self, id: &Id) -> Option<&V> {
        self.vertex(id).map(|v| v.value())
    }

    /// All vertices, partition by partition, each partition in load order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex<Id, V, E>> + '_ {
        self.partitions.iter().flat_map(|p| p.vertices())
    }

    pub fn num_active(&self) -> usize {
        self.vertices().filter(|v| v.is_active()).count()
    }

    pub fn into_values(self) -> impl Iterator<Item = (Id, V)> {
        self.partitions
            .into_iter()
            .flat_map(|p| p.vertices.into_iter().map(|v| v.into_parts()))
    }

    /// Marks every vertex active, as a freshly loaded graph is.
    pub(crate) fn activate_all(&mut self) {
        for partition in &mut self.partitions {
            for vertex in partition.vertices_mut() {
                vertex.set_active(true);
            }
        }
    }

    pub(crate) fn split_mut(&mut self) -> (&GraphLayout<Id>, &mut [Partition<Id, V, E>]) {
        (&self.layout, &mut self.partitions)
    }
}

/// Collects vertices and edges while a graph is loaded.
///
/// Edges added through [`GraphBuilder::add_edge`] are attached when the graph
/// is built, so records may reference vertices that a later record creates.
#[derive(Debug)]
pub struct GraphBuilder<Id, V, E> {
    layout: GraphLayout<Id>,
    partitions: Vec<Partition<Id, V, E>>,
    pending_edges: Vec<(Id, Edge<Id, E>)>,
}

impl<Id: VertexId, V, E> GraphBuilder<Id, V, E> {
    pub fn new(n_partitions: usize) -> Self {
        let n_partitions = n_partitions.max(1);
        Self {
            layout: GraphLayout::new(n_partitions),
            partitions: (0..n_partitions).map(Partition::new).collect(),
            pending_edges: vec![],
        }
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.layout.contains(id)
    }

    /// Adds a vertex with its outgoing edges. Every id may be added once.
    pub fn add_vertex(&mut self, vertex: Vertex<Id, V, E>) -> Result<(), LoadError> {
        if self.contains(vertex.id()) {
            return Err(LoadError::DuplicateVertex(format!("{:?}", vertex.id())));
        }
        self.insert(vertex);
        Ok(())
    }

    /// Adds a vertex unless one with the same id already exists.
    pub fn ensure_vertex(&mut self, id: Id, value: V) {
        if !self.contains(&id) {
            self.insert(Vertex::new(id, value));
        }
    }

    /// Appends `vertex` to its partition. The id must not be indexed yet.
    fn insert(&mut self, vertex: Vertex<Id, V, E>) {
        let partition = self.layout.partition_of(vertex.id());
        let slot = &mut self.partitions[partition].vertices;
        self.layout.indexes[partition].insert(vertex.id().clone(), VID(slot.len()));
        slot.push(vertex);
    }

    /// Queues an edge `src -> target`, attached to `src` on [`GraphBuilder::build`].
    pub fn add_edge(&mut self, src: Id, target: Id, value: E) {
        self.pending_edges.push((src, Edge::new(target, value)));
    }

    pub fn build(self) -> Result<GraphStore<Id, V, E>, LoadError> {
        let Self {
            layout,
            mut partitions,
            pending_edges,
        } = self;

        for (src, edge) in pending_edges {
            match layout.resolve(&src) {
                Some(LocalVertexRef { partition, vid }) => {
                    partitions[partition].vertices[vid.index()].add_edge(edge.target, edge.value)
                }
                None => {
                    return Err(LoadError::MissingSource {
                        src: format!("{:?}", src),
                        dst: format!("{:?}", edge.target),
                    })
                }
            }
        }

        let num_vertices = partitions.iter().map(|p| p.len()).sum();
        let num_edges = partitions.iter().map(|p| p.num_edges()).sum();

        Ok(GraphStore {
            layout,
            partitions,
            num_vertices,
            num_edges,
        })
    }
}
