//! Reading CSV tables into a graph.
//!
//! A [`CsvLoader`] is pointed at one or more input tables. Each table is a
//! file or a directory of files; gzip (`.gz`) and bzip2 (`.bz2`) files are
//! decompressed on the fly. Every row is handed to a [`GraphLoader`] as a
//! [`StringRecord`], tables in the order they were added and directory
//! entries in name order.
//!
//! # Example
//! ```no_run
//! use bulkstep::graph_loader::source::csv_loader::CsvLoader;
//! use bulkstep::graph_loader::source::table_loaders::AdjacencyListLoader;
//! use bulkstep::prelude::*;
//!
//! let graph: GraphStore<u64, u64, ()> = CsvLoader::new("/path/to/vertices.csv")
//!     .set_header(true)
//!     .load_graph(&AdjacencyListLoader, 8)
//!     .expect("Csv did not parse.");
//! ```

use crate::{
    core::{
        storage::{GraphBuilder, GraphStore},
        utils::errors::{BspError, LoadError},
        VertexId,
    },
    graph_loader::GraphLoader,
};
use bzip2::read::BzDecoder;
use csv::StringRecord;
use flate2::read::GzDecoder;
use regex::Regex;
use std::{
    collections::VecDeque,
    fs,
    fs::File,
    io,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

#[derive(thiserror::Error, Debug)]
pub enum CsvErr {
    /// An IO error that occurred during file read or write.
    #[error("CSV io failed with error: {0}")]
    IoError(#[from] io::Error),
    /// A CSV parsing error that occurred while parsing the CSV data.
    #[error("CSV parsing failed with error: {0}")]
    CsvError(#[from] csv::Error),
}

impl From<CsvErr> for BspError {
    fn from(err: CsvErr) -> Self {
        LoadError::Csv(err).into()
    }
}

/// A struct that defines the CSV loader with configurable options.
#[derive(Debug)]
pub struct CsvLoader {
    /// Input tables, files or directories containing files.
    paths: Vec<PathBuf>,
    /// Optional regex filter to select specific files by name.
    regex_filter: Option<Regex>,
    /// Specifies whether the CSV files have a header.
    header: bool,
    /// The delimiter character used in the CSV files.
    delimiter: u8,
}

impl CsvLoader {
    /// Creates a new `CsvLoader` reading the table at `p`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bulkstep::graph_loader::source::csv_loader::CsvLoader;
    /// let loader = CsvLoader::new("/path/to/csv_file.csv");
    /// ```
    pub fn new<P: Into<PathBuf>>(p: P) -> Self {
        Self {
            paths: vec![p.into()],
            regex_filter: None,
            header: false,
            delimiter: b',',
        }
    }

    /// Reads from several tables, in order.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(|p| p.into()).collect(),
            regex_filter: None,
            header: false,
            delimiter: b',',
        }
    }

    /// Adds another table, read after the ones already added.
    pub fn add_path<P: Into<PathBuf>>(mut self, p: P) -> Self {
        self.paths.push(p.into());
        self
    }

    /// Sets whether the CSV files have a header.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bulkstep::graph_loader::source::csv_loader::CsvLoader;
    /// let loader = CsvLoader::new("/path/to/csv_file.csv").set_header(true);
    /// ```
    pub fn set_header(mut self, h: bool) -> Self {
        self.header = h;
        self
    }

    /// Sets the delimiter from the first byte of `d`. An empty string keeps
    /// the current delimiter.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bulkstep::graph_loader::source::csv_loader::CsvLoader;
    /// let loader = CsvLoader::new("/path/to/csv_file.csv").set_delimiter("|");
    /// ```
    pub fn set_delimiter(mut self, d: &str) -> Self {
        if let Some(b) = d.as_bytes().first() {
            self.delimiter = *b;
        }
        self
    }

    /// Only reads files whose path matches `r`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use regex::Regex;
    /// use bulkstep::graph_loader::source::csv_loader::CsvLoader;
    ///
    /// let loader = CsvLoader::new("/path/to/csv_files")
    ///    .with_filter(Regex::new(r"file_name_pattern").unwrap());
    /// ```
    pub fn with_filter(mut self, r: Regex) -> Self {
        self.regex_filter = Some(r);
        self
    }

    fn is_dir<P: AsRef<Path>>(p: &P) -> Result<bool, CsvErr> {
        Ok(fs::metadata(p)?.is_dir())
    }

    fn accept_file(&self, p: PathBuf, paths: &mut Vec<PathBuf>) {
        match &self.regex_filter {
            Some(pattern) => {
                if p.to_str().is_some_and(|name| pattern.is_match(name)) {
                    paths.push(p);
                }
            }
            None => paths.push(p),
        }
    }

    /// Every file to read, tables in order, each directory walked in name
    /// order.
    pub fn files_vec(&self) -> Result<Vec<PathBuf>, CsvErr> {
        let mut paths = vec![];
        for table in &self.paths {
            let mut queue = VecDeque::from([table.to_path_buf()]);
            while let Some(path) = queue.pop_front() {
                if Self::is_dir(&path)? {
                    let mut entries = fs::read_dir(&path)?
                        .map(|entry| entry.map(|e| e.path()))
                        .collect::<Result<Vec<_>, _>>()?;
                    entries.sort();
                    for p in entries {
                        if Self::is_dir(&p)? {
                            queue.push_back(p);
                        } else {
                            self.accept_file(p, &mut paths);
                        }
                    }
                } else {
                    self.accept_file(path, &mut paths);
                }
            }
        }
        Ok(paths)
    }

    /// Runs `loader` over every row of every table and builds the graph.
    ///
    /// Rows are numbered from 0 across all files. A row that fails to parse
    /// or to load stops the load and is reported with its number.
    pub fn load_graph<L, Id, V, E>(
        &self,
        loader: &L,
        n_partitions: usize,
    ) -> Result<GraphStore<Id, V, E>, BspError>
    where
        L: GraphLoader<Id, V, E, Record = StringRecord>,
        Id: VertexId,
    {
        let mut builder = GraphBuilder::new(n_partitions);
        let mut record_num = 0u64;
        for path in self.files_vec()? {
            debug!("Loading {}", path.display());
            let mut csv_reader = self.csv_reader(&path)?;
            for rec in csv_reader.records() {
                let record_err = |source: LoadError| BspError::Load {
                    record: Some(record_num),
                    source,
                };
                let record = rec
                    .map_err(CsvErr::from)
                    .map_err(|err| record_err(err.into()))?;
                loader
                    .load(record_num, record, &mut builder)
                    .map_err(record_err)?;
                record_num += 1;
            }
        }
        let graph = builder.build()?;
        info!(
            records = record_num,
            vertices = graph.num_vertices(),
            edges = graph.num_edges(),
            partitions = graph.num_partitions(),
            "Graph loaded from CSV"
        );
        Ok(graph)
    }

    /// Returns a `csv::Reader` for `file_path`, decompressing gzip and bzip2
    /// files by extension.
    fn csv_reader(&self, file_path: &Path) -> Result<csv::Reader<Box<dyn io::Read>>, CsvErr> {
        let name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        let f = File::open(file_path)?;
        let reader: Box<dyn io::Read> = if name.ends_with(".gz") {
            Box::new(BufReader::new(GzDecoder::new(f)))
        } else if name.ends_with(".bz2") {
            Box::new(BufReader::new(BzDecoder::new(f)))
        } else {
            Box::new(f)
        };
        Ok(csv::ReaderBuilder::new()
            .has_headers(self.header)
            .delimiter(self.delimiter)
            .from_reader(reader))
    }
}
