//! Tabular input. Needs the `io` feature.

pub mod csv_loader;
pub mod table_loaders;
