use bulkstep::logging::global_info_logger;
use bulkstep_cli::{
    config::{
        app_config::AppConfig,
        job_config::{CombinerKind, LoaderKind, ProgramKind},
    },
    error::CliError,
    run::run_job,
};
use pretty_assertions::assert_eq;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

fn write_table(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn config(inputs: Vec<PathBuf>, outputs: Vec<PathBuf>) -> AppConfig {
    let mut config = AppConfig::default();
    config.job.inputs = inputs;
    config.job.outputs = outputs;
    config.job.header = true;
    config.job.partitions = 3;
    config.job.threads = Some(2);
    config
}

#[test]
fn components_are_written_to_every_output() {
    global_info_logger();
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir, "adj.csv", "v,es\n1,2\n2,\"1,3\"\n3,2\n4,5\n5,4\n");
    let outputs = vec![dir.path().join("a/cc.csv"), dir.path().join("b/cc.csv")];

    let summary = run_job(&config(vec![input], outputs.clone())).unwrap();
    assert_eq!(summary.vertices, 5);
    assert_eq!(summary.edges, 6);
    assert_eq!(summary.rows, 5);
    assert!(summary.converged);

    for output in outputs {
        let mut lines: Vec<String> = fs::read_to_string(output)
            .unwrap()
            .lines()
            .map(String::from)
            .collect();
        let header = lines.remove(0);
        lines.sort();
        assert_eq!(header, "v,min_id");
        assert_eq!(lines, vec!["1,1", "2,1", "3,1", "4,4", "5,4"]);
    }
}

#[test]
fn shortest_paths_over_an_edge_table() {
    global_info_logger();
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir, "edges.csv", "src,dst\n1,2\n2,3\n1,3\n3,4\n");
    let output = dir.path().join("paths.csv");

    let mut config = config(vec![input], vec![output.clone()]);
    config.job.loader = LoaderKind::Edges;
    config.job.program = ProgramKind::ShortestPaths;
    config.job.source = Some(1);
    config.job.combiner = CombinerKind::Disabled;
    run_job(&config).unwrap();

    let mut lines: Vec<String> = fs::read_to_string(output)
        .unwrap()
        .lines()
        .skip(1)
        .map(String::from)
        .collect();
    lines.sort();
    assert_eq!(lines, vec!["1,0", "2,1", "3,1", "4,2"]);
}

#[test]
fn shortest_paths_needs_a_source() {
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir, "edges.csv", "src,dst\n1,2\n");
    let mut config = config(vec![input], vec![dir.path().join("out.csv")]);
    config.job.loader = LoaderKind::Edges;
    config.job.program = ProgramKind::ShortestPaths;

    let err = run_job(&config).unwrap_err();
    assert!(matches!(err, CliError::MissingSource));
}

#[test]
fn no_inputs_is_an_error() {
    let err = run_job(&AppConfig::default()).unwrap_err();
    assert!(matches!(err, CliError::NoInputs));
}

#[test]
fn load_errors_carry_the_record() {
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir, "adj.csv", "v,es\n1,2\nx,1\n");
    let err = run_job(&config(vec![input], vec![dir.path().join("out.csv")])).unwrap_err();
    assert!(err.to_string().contains("at record 1"), "{err}");
}
