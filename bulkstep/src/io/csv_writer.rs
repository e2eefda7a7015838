//! Writing output tables.

use crate::{graph_loader::source::csv_loader::CsvErr, io::GraphWriter};
use csv::StringRecord;
use flate2::{write::GzEncoder, Compression};
use std::{
    fmt::Display,
    fs::{self, File},
    io,
    path::Path,
};
use tracing::info;

/// Renders `(id, value)` as a two column row and writes rows as CSV tables.
///
/// Tables whose name ends in `.gz` are gzip compressed.
#[derive(Debug, Clone)]
pub struct CsvWriter {
    header: Option<[String; 2]>,
    delimiter: u8,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self {
            header: None,
            delimiter: b',',
        }
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the two columns in a header row.
    pub fn with_header<S: Into<String>>(mut self, id: S, value: S) -> Self {
        self.header = Some([id.into(), value.into()]);
        self
    }

    pub fn set_delimiter(mut self, d: &str) -> Self {
        if let Some(b) = d.as_bytes().first() {
            self.delimiter = *b;
        }
        self
    }

    /// Writes `rows` to the table at `path`, replacing it.
    pub fn write_table<P: AsRef<Path>>(
        &self,
        path: P,
        rows: &[StringRecord],
    ) -> Result<(), CsvErr> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let gzip = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(".gz"));
        if gzip {
            let mut encoder = GzEncoder::new(file, Compression::default());
            self.write_to(&mut encoder, rows)?;
            encoder.finish()?;
        } else {
            self.write_to(file, rows)?;
        }
        info!(rows = rows.len(), "Wrote {}", path.display());
        Ok(())
    }

    /// Writes `rows` to any byte sink, header first.
    pub fn write_to<W: io::Write>(&self, out: W, rows: &[StringRecord]) -> Result<(), CsvErr> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(out);
        if let Some(header) = &self.header {
            writer.write_record(header)?;
        }
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl<Id: Display, V: Display> GraphWriter<Id, V> for CsvWriter {
    type Output = StringRecord;

    fn write(&self, id: &Id, value: &V) -> StringRecord {
        StringRecord::from(vec![id.to_string(), value.to_string()])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        core::storage::GraphStore,
        graph_loader::source::{csv_loader::CsvLoader, table_loaders::EdgeListLoader},
    };
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn rows() -> Vec<StringRecord> {
        let writer = CsvWriter::new();
        vec![writer.write(&1u64, &1u64), writer.write(&2u64, &1u64)]
    }

    #[test]
    fn writes_plain_tables_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/cc.csv");
        CsvWriter::new()
            .with_header("v", "min_id")
            .write_table(&path, &rows())
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "v,min_id\n1,1\n2,1\n");
    }

    #[test]
    fn writes_gzip_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cc.csv.gz");
        CsvWriter::new()
            .set_delimiter("\t")
            .write_table(&path, &rows())
            .unwrap();
        let mut content = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "1\t1\n2\t1\n");
    }

    #[test]
    fn written_tables_can_be_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cc.csv.gz");
        CsvWriter::new().write_table(&path, &rows()).unwrap();
        let g: GraphStore<u64, u64, ()> = CsvLoader::new(&path)
            .load_graph(&EdgeListLoader::default(), 1)
            .unwrap();
        assert_eq!(g.num_vertices(), 2);
        assert_eq!(g.vertex(&2).unwrap().edges()[0].target, 1);
    }
}
