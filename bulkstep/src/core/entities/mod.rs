use serde::{Deserialize, Serialize};

/// Directed edge stored with its source vertex.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge<Id, E> {
    pub target: Id,
    pub value: E,
}

impl<Id, E> Edge<Id, E> {
    pub fn new(target: Id, value: E) -> Self {
        Self { target, value }
    }
}

/// A vertex as created by a loader and owned by the graph store afterwards.
///
/// The id never changes once the vertex exists. The value and activity flag
/// are only touched by the vertex's own compute invocation while a job runs,
/// and the edge list is frozen when the graph is built.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex<Id, V, E> {
    id: Id,
    value: V,
    edges: Vec<Edge<Id, E>>,
    active: bool,
}

impl<Id, V, E> Vertex<Id, V, E> {
    pub fn new(id: Id, value: V) -> Self {
        Self {
            id,
            value,
            edges: vec![],
            active: true,
        }
    }

    pub fn with_edges<I: IntoIterator<Item = (Id, E)>>(mut self, edges: I) -> Self {
        self.edges
            .extend(edges.into_iter().map(|(target, value)| Edge::new(target, value)));
        self
    }

    pub fn add_edge(&mut self, target: Id, value: E) {
        self.edges.push(Edge::new(target, value));
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn edges(&self) -> &[Edge<Id, E>] {
        &self.edges
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn into_parts(self) -> (Id, V) {
        (self.id, self.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn edges_keep_insertion_order() {
        let mut v = Vertex::new(1u64, 0u64).with_edges([(3u64, ()), (2, ())]);
        v.add_edge(4, ());
        let targets: Vec<_> = v.edges().iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![3, 2, 4]);
        assert!(v.is_active());
    }
}
