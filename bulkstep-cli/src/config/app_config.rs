use crate::config::{
    job_config::{CombinerKind, JobSpec, LoaderKind, ProgramKind},
    log_config::LoggingConfig,
};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, PartialEq, Clone, Serialize, Default)]
pub struct AppConfig {
    pub job: JobSpec,
    pub logging: LoggingConfig,
}

/// Settings given on the command line. Unset fields leave the configured
/// value alone.
#[derive(Debug, Serialize, PartialEq, Clone, Default)]
pub struct ConfigOverrides {
    job: JobOverrides,
    logging: LoggingOverrides,
}

#[derive(Debug, Serialize, PartialEq, Clone, Default)]
struct JobOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    loader: Option<LoaderKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    program: Option<ProgramKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    combiner: Option<CombinerKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outputs: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partitions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_supersteps: Option<usize>,
}

#[derive(Debug, Serialize, PartialEq, Clone, Default)]
struct LoggingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(mut self, loader: Option<LoaderKind>) -> Self {
        self.job.loader = loader;
        self
    }

    pub fn with_program(mut self, program: Option<ProgramKind>) -> Self {
        self.job.program = program;
        self
    }

    pub fn with_combiner(mut self, combiner: Option<CombinerKind>) -> Self {
        self.job.combiner = combiner;
        self
    }

    pub fn with_source(mut self, source: Option<u64>) -> Self {
        self.job.source = source;
        self
    }

    /// An empty list keeps the configured inputs.
    pub fn with_inputs(mut self, inputs: Vec<PathBuf>) -> Self {
        self.job.inputs = (!inputs.is_empty()).then_some(inputs);
        self
    }

    /// An empty list keeps the configured outputs.
    pub fn with_outputs(mut self, outputs: Vec<PathBuf>) -> Self {
        self.job.outputs = (!outputs.is_empty()).then_some(outputs);
        self
    }

    pub fn with_header(mut self, header: Option<bool>) -> Self {
        self.job.header = header;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<String>) -> Self {
        self.job.delimiter = delimiter;
        self
    }

    pub fn with_partitions(mut self, partitions: Option<usize>) -> Self {
        self.job.partitions = partitions;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.job.threads = threads;
        self
    }

    pub fn with_max_supersteps(mut self, max_supersteps: Option<usize>) -> Self {
        self.job.max_supersteps = max_supersteps;
        self
    }

    pub fn with_log_level(mut self, log_level: Option<String>) -> Self {
        self.logging.log_level = log_level;
        self
    }
}

// Order of precedence of config loading: config args >> config path >> config default
pub fn load_config(
    overrides: ConfigOverrides,
    config_path: Option<PathBuf>,
) -> Result<AppConfig, ConfigError> {
    let defaults = to_json(&AppConfig::default())?;
    let mut builder = Config::builder().add_source(File::from_str(&defaults, FileFormat::Json));
    if let Some(config_path) = config_path {
        builder = builder.add_source(File::from(config_path));
    }
    let overrides = to_json(&overrides)?;
    builder = builder.add_source(File::from_str(&overrides, FileFormat::Json));
    builder.build()?.try_deserialize::<AppConfig>()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ConfigError> {
    serde_json::to_string(value).map_err(|err| ConfigError::Foreign(Box::new(err)))
}
