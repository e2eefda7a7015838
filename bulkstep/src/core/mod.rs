pub mod entities;
pub mod state;
pub mod storage;
pub mod utils;

pub use bulkstep_api::core::{entities::VID, StateType, VertexId};
