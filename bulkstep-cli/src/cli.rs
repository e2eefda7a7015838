use crate::{
    config::{
        app_config::{load_config, ConfigOverrides},
        job_config::{CombinerKind, LoaderKind, ProgramKind},
        log_config::LoggingConfig,
    },
    error::CliError,
    run::run_job,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{
    fmt, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

#[derive(Parser, Debug)]
#[command(name = "bulkstep", about = "Run a vertex program over CSV tables")]
pub struct Args {
    /// Job config file, toml, json or yaml
    #[arg(long, short, env = "BULKSTEP_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "BULKSTEP_LOADER")]
    loader: Option<LoaderKind>,

    #[arg(long, env = "BULKSTEP_PROGRAM")]
    program: Option<ProgramKind>,

    #[arg(long, env = "BULKSTEP_COMBINER")]
    combiner: Option<CombinerKind>,

    /// Source vertex of shortest-paths
    #[arg(long, env = "BULKSTEP_SOURCE")]
    source: Option<u64>,

    /// Input table, a file or a directory. May be repeated
    #[arg(long = "input", short, env = "BULKSTEP_INPUTS", value_delimiter = ',')]
    inputs: Vec<PathBuf>,

    /// Output table. May be repeated; every table gets the full output
    #[arg(long = "output", short, env = "BULKSTEP_OUTPUTS", value_delimiter = ',')]
    outputs: Vec<PathBuf>,

    /// Tables have a header row
    #[arg(long)]
    header: bool,

    #[arg(long, env = "BULKSTEP_DELIMITER")]
    delimiter: Option<String>,

    #[arg(long, env = "BULKSTEP_PARTITIONS")]
    partitions: Option<usize>,

    #[arg(long, env = "BULKSTEP_THREADS")]
    threads: Option<usize>,

    #[arg(long, env = "BULKSTEP_MAX_SUPERSTEPS")]
    max_supersteps: Option<usize>,

    #[arg(long, env = "BULKSTEP_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides::new()
            .with_loader(self.loader)
            .with_program(self.program)
            .with_combiner(self.combiner)
            .with_source(self.source)
            .with_inputs(self.inputs.clone())
            .with_outputs(self.outputs.clone())
            .with_header(self.header.then_some(true))
            .with_delimiter(self.delimiter.clone())
            .with_partitions(self.partitions)
            .with_threads(self.threads)
            .with_max_supersteps(self.max_supersteps)
            .with_log_level(self.log_level.clone())
    }
}

fn init_logging(logging: &LoggingConfig) {
    // stdout may carry the job output
    let registry = Registry::default().with(logging.get_log_env()).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE),
    );
    registry.try_init().ok();
}

pub fn cli() -> Result<(), CliError> {
    let args = Args::parse();
    let config = load_config(args.overrides(), args.config.clone())?;
    init_logging(&config.logging);

    let summary = run_job(&config)?;
    info!(
        vertices = summary.vertices,
        edges = summary.edges,
        supersteps = summary.supersteps,
        rows = summary.rows,
        "Done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_args_become_overrides() {
        let args = Args::try_parse_from([
            "bulkstep",
            "--program",
            "shortest-paths",
            "--source",
            "7",
            "--combiner",
            "none",
            "-i",
            "a.csv",
            "--input",
            "b.csv",
            "--header",
        ])
        .unwrap();
        let expected = ConfigOverrides::new()
            .with_program(Some(ProgramKind::ShortestPaths))
            .with_source(Some(7))
            .with_combiner(Some(CombinerKind::Disabled))
            .with_inputs(vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")])
            .with_header(Some(true));
        assert_eq!(args.overrides(), expected);
    }

    #[test]
    fn test_no_args_override_nothing() {
        let args = Args::try_parse_from(["bulkstep"]).unwrap();
        assert_eq!(args.overrides(), ConfigOverrides::new());
    }
}
