//! Runs the job an [`AppConfig`] describes.

use crate::{
    config::{
        app_config::AppConfig,
        job_config::{CombinerKind, JobSpec, LoaderKind, ProgramKind},
    },
    error::CliError,
};
use bulkstep::{
    algorithms::{connected_components::ConnectedComponents, shortest_paths::ShortestPaths},
    graph_loader::source::{
        csv_loader::CsvLoader,
        table_loaders::{AdjacencyListLoader, EdgeListLoader},
    },
    db::task::runner::ProgramResult,
    io::csv_writer::CsvWriter,
    prelude::*,
};
use csv::StringRecord;
use std::{io, time::Instant};
use tracing::{info, warn};

/// What a finished job did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub vertices: usize,
    pub edges: usize,
    pub supersteps: usize,
    pub converged: bool,
    pub rows: usize,
}

type Graph = GraphStore<u64, u64, ()>;

fn load(spec: &JobSpec) -> Result<Graph, CliError> {
    if spec.inputs.is_empty() {
        return Err(CliError::NoInputs);
    }
    let csv = CsvLoader::from_paths(spec.inputs.iter().cloned())
        .set_header(spec.header)
        .set_delimiter(&spec.delimiter);
    let graph: Graph = match spec.loader {
        LoaderKind::Adjacency => csv.load_graph(&AdjacencyListLoader, spec.partitions)?,
        LoaderKind::Edges => csv.load_graph(&EdgeListLoader::new(false), spec.partitions)?,
        LoaderKind::SymmetricEdges => csv.load_graph(&EdgeListLoader::new(true), spec.partitions)?,
    };
    Ok(graph)
}

fn execute<P>(
    program: P,
    graph: Graph,
    spec: &JobSpec,
    writer: &CsvWriter,
) -> Result<ProgramResult<P, StringRecord>, BspError>
where
    P: VertexProgram<Id = u64, Value = u64, EdgeValue = (), Message = u64>,
{
    let combiner: Option<Box<dyn Combiner<u64, u64>>> = match spec.combiner {
        CombinerKind::Disabled => None,
        CombinerKind::Min => Some(Box::new(MinCombiner)),
    };
    Job::new(program)
        .with_boxed_combiner(combiner)
        .with_config(spec.job_config())
        .run(graph, writer)
}

/// Loads the input tables, runs the program and writes its output to every
/// output table, or to stdout when there is none.
pub fn run_job(config: &AppConfig) -> Result<JobSummary, CliError> {
    let spec = &config.job;
    let start = Instant::now();

    let graph = load(spec)?;
    let (vertices, edges) = (graph.num_vertices(), graph.num_edges());

    let column = match spec.program {
        ProgramKind::ConnectedComponents => "min_id",
        ProgramKind::ShortestPaths => "distance",
    };
    let mut writer = CsvWriter::new().set_delimiter(&spec.delimiter);
    if spec.header {
        writer = writer.with_header("v", column);
    }

    let result = match spec.program {
        ProgramKind::ConnectedComponents => execute(ConnectedComponents, graph, spec, &writer)?,
        ProgramKind::ShortestPaths => {
            let source = spec.source.ok_or(CliError::MissingSource)?;
            execute(ShortestPaths::new(source), graph, spec, &writer)?
        }
    };
    if !result.converged {
        warn!(
            supersteps = result.supersteps,
            "Job stopped at its superstep limit, output may be incomplete"
        );
    }

    if spec.outputs.is_empty() {
        writer.write_to(io::stdout().lock(), &result.output)?;
    }
    for output in &spec.outputs {
        writer.write_table(output, &result.output)?;
    }

    info!(
        "Job Finished in {:.3} seconds",
        start.elapsed().as_secs_f64()
    );
    Ok(JobSummary {
        vertices,
        edges,
        supersteps: result.supersteps,
        converged: result.converged,
        rows: result.output.len(),
    })
}
