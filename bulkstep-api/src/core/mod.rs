pub mod entities;
pub mod utils;

use std::{fmt::Debug, hash::Hash};

/// Bound for anything the engine stores per vertex or ships between vertices:
/// vertex values, edge values and message payloads.
pub trait StateType: Clone + Debug + Send + Sync + 'static {}

impl<T: Clone + Debug + Send + Sync + 'static> StateType for T {}

/// Bound for the opaque, comparable key identifying a vertex.
pub trait VertexId: Hash + Eq + Ord + Clone + Debug + Send + Sync + 'static {}

impl<T: Hash + Eq + Ord + Clone + Debug + Send + Sync + 'static> VertexId for T {}
