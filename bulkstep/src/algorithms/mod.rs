//! Ready made vertex programs.

pub mod connected_components;
pub mod shortest_paths;
