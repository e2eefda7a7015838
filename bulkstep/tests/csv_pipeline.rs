#![cfg(feature = "io")]

use bulkstep::{
    algorithms::connected_components::ConnectedComponents,
    graph_loader::source::{
        csv_loader::CsvLoader,
        table_loaders::{AdjacencyListLoader, EdgeListLoader},
    },
    io::csv_writer::CsvWriter,
    prelude::*,
};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn adjacency_table_to_output_table() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("vertices.csv");
    fs::write(&input, "v,es\n1,\"2,3\"\n2,\"1,4\"\n3,\"1,4\"\n4,\"2,3\"\n5,\n").unwrap();

    let graph: GraphStore<u64, u64, ()> = CsvLoader::new(&input)
        .set_header(true)
        .load_graph(&AdjacencyListLoader, 3)
        .unwrap();
    let writer = CsvWriter::new().with_header("v", "min_id");
    let result = Job::new(ConnectedComponents)
        .with_combiner(MinCombiner)
        .run(graph, &writer)
        .unwrap();

    let mut rows = result.output;
    rows.sort_by_key(|row| row.get(0).and_then(|v| v.parse::<u64>().ok()));
    let output = dir.path().join("out").join("cc.csv");
    writer.write_table(&output, &rows).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "v,min_id\n1,1\n2,1\n3,1\n4,1\n5,5\n"
    );
}

#[test]
fn edge_table_with_unknown_column_fails_with_record_number() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("edges.csv");
    fs::write(&input, "1,2\n2,3\nthree,4\n").unwrap();

    let err = CsvLoader::new(&input)
        .load_graph::<_, u64, u64, ()>(&EdgeListLoader::new(true), 2)
        .unwrap_err();
    assert!(matches!(err, BspError::Load { record: Some(2), .. }));
}
