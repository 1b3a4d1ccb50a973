//! CSV result file sink.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::error::Result;
use crate::models::Record;
use crate::storage::RecordSink;

/// Header of the identifier column.
pub const IDENTIFIER_COLUMN: &str = "identifier";

/// Result file written one row at a time.
///
/// The file is reopened for every row and closed again, so rows already
/// appended survive a crash mid-run.
#[derive(Debug)]
pub struct CsvRecordSink {
    path: PathBuf,
    columns: Vec<String>,
    written: usize,
}

impl CsvRecordSink {
    /// Create (or truncate) the file and write the header row.
    pub fn create(path: impl Into<PathBuf>, selection: &[String]) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = WriterBuilder::new().from_writer(File::create(&path)?);
        let header = std::iter::once(IDENTIFIER_COLUMN).chain(selection.iter().map(String::as_str));
        writer.write_record(header)?;
        writer.flush()?;

        log::info!("Writing results to {}", path.display());
        Ok(Self {
            path,
            columns: selection.to_vec(),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Field columns after the identifier, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl RecordSink for CsvRecordSink {
    fn append(&mut self, record: &Record) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        let row = std::iter::once(record.identifier.as_str())
            .chain(self.columns.iter().map(|name| record.get(name).unwrap_or("")));
        writer.write_record(row)?;
        writer.flush()?;

        self.written += 1;
        Ok(())
    }

    fn written(&self) -> usize {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn selection() -> Vec<String> {
        vec!["Logradouro".to_string(), "ImovelValor".to_string()]
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|row| row.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_create_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("result.csv");

        let sink = CsvRecordSink::create(&path, &selection()).unwrap();
        assert_eq!(sink.written(), 0);

        let rows = read_rows(&path);
        assert_eq!(rows, vec![vec!["identifier", "Logradouro", "ImovelValor"]]);
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        fs::write(&path, "old,content\n1,2\n").unwrap();

        CsvRecordSink::create(&path, &selection()).unwrap();
        assert_eq!(read_rows(&path).len(), 1);
    }

    #[test]
    fn test_round_trip_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let selection = selection();
        let mut sink = CsvRecordSink::create(&path, &selection).unwrap();

        let mut values = HashMap::new();
        values.insert("Logradouro".to_string(), "RUA A, 10".to_string());
        values.insert("ImovelValor".to_string(), "1.000,00".to_string());
        sink.append(&Record::new("123.45.678-9", &selection, values))
            .unwrap();
        sink.append(&Record::empty("000", &selection)).unwrap();

        let mut values = HashMap::new();
        values.insert("Logradouro".to_string(), "AV. \"B\"".to_string());
        sink.append(&Record::new("42", &selection, values)).unwrap();
        assert_eq!(sink.written(), 3);

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec!["identifier", "Logradouro", "ImovelValor"]);
        assert_eq!(rows[1], vec!["123.45.678-9", "RUA A, 10", "1.000,00"]);
        assert_eq!(rows[2], vec!["000", "", ""]);
        assert_eq!(rows[3], vec!["42", "AV. \"B\"", ""]);
    }

    #[test]
    fn test_append_fails_when_file_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let selection = selection();
        let mut sink = CsvRecordSink::create(&path, &selection).unwrap();

        fs::remove_file(&path).unwrap();
        assert!(sink.append(&Record::empty("1", &selection)).is_err());
        assert_eq!(sink.written(), 0);
    }
}
