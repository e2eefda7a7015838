use bulkstep::{graph_loader::source::csv_loader::CsvErr, prelude::BspError};
use config::ConfigError;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),

    #[error("No input tables given")]
    NoInputs,

    #[error("shortest-paths needs a source vertex")]
    MissingSource,

    #[error(transparent)]
    Job(#[from] BspError),

    #[error("Failed to write output: {0}")]
    Output(#[from] CsvErr),
}
