use bulkstep::prelude::JobConfig;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PARTITIONS: usize = 8;
pub const DEFAULT_DELIMITER: &str = ",";

/// Layout of the input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LoaderKind {
    /// `v, es`: a vertex and the comma separated targets of its edges
    #[default]
    Adjacency,
    /// `src, dst`: one directed edge per row
    Edges,
    /// `src, dst`: one undirected edge per row
    SymmetricEdges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramKind {
    #[default]
    ConnectedComponents,
    ShortestPaths,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CombinerKind {
    /// deliver every message as sent
    #[serde(rename = "none")]
    #[value(name = "none")]
    Disabled,
    #[default]
    Min,
}

/// What to run and where its tables live.
#[derive(Debug, Deserialize, PartialEq, Clone, Serialize)]
pub struct JobSpec {
    pub loader: LoaderKind,
    pub program: ProgramKind,
    pub combiner: CombinerKind,
    /// Source vertex of `shortest-paths`.
    pub source: Option<u64>,
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
    pub header: bool,
    pub delimiter: String,
    pub partitions: usize,
    pub threads: Option<usize>,
    pub max_supersteps: Option<usize>,
}

impl Default for JobSpec {
    fn default() -> Self {
        Self {
            loader: LoaderKind::default(),
            program: ProgramKind::default(),
            combiner: CombinerKind::default(),
            source: None,
            inputs: vec![],
            outputs: vec![],
            header: false,
            delimiter: DEFAULT_DELIMITER.to_string(),
            partitions: DEFAULT_PARTITIONS,
            threads: None,
            max_supersteps: None,
        }
    }
}

impl JobSpec {
    /// Execution options handed to the engine.
    pub fn job_config(&self) -> JobConfig {
        JobConfig {
            num_threads: self.threads,
            max_supersteps: self.max_supersteps,
        }
    }
}
