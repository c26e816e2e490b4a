use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Raw CSV table: header names plus records as read (records may be ragged)
#[derive(Debug, Clone, Default)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn read_csv_from_stdin() -> Result<CsvData> {
    let stdin = io::stdin();
    read_csv(stdin.lock()).context("Failed to read CSV from stdin")
}

pub fn read_csv_from_path(path: &Path) -> Result<CsvData> {
    let file = File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    read_csv(file).with_context(|| format!("Failed to read CSV from '{}'", path.display()))
}

/// Read CSV with a header row. Blank lines are skipped, but a record of
/// empty fields (`,`) is kept. Records may have fewer or more fields than
/// the header.
pub fn read_csv<R: Read>(reader: R) -> Result<CsvData> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(String::from)
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse CSV record {}", idx + 1))?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(CsvData { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_csv_basic() {
        let data = read_csv("region,sales\nWest,10\nEast,20\n".as_bytes()).unwrap();
        assert_eq!(data.headers, vec!["region", "sales"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[1], vec!["East", "20"]);
    }

    #[test]
    fn test_read_csv_quoted_commas() {
        let data = read_csv("region,sales\nWest,\"1,200.50\"\n".as_bytes()).unwrap();
        assert_eq!(data.rows[0], vec!["West", "1,200.50"]);
    }

    #[test]
    fn test_read_csv_keeps_empty_field_records() {
        let data = read_csv("a,b\n1,2\n,\n\n3,4\n".as_bytes()).unwrap();
        assert_eq!(data.rows.len(), 3);
        assert_eq!(data.rows[1], vec!["", ""]);
        assert_eq!(data.rows[2], vec!["3", "4"]);
    }

    #[test]
    fn test_read_csv_ragged_records() {
        let data = read_csv("a,b,c\n1,2\n".as_bytes()).unwrap();
        assert_eq!(data.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_read_csv_header_only() {
        let data = read_csv("a,b\n".as_bytes()).unwrap();
        assert_eq!(data.headers, vec!["a", "b"]);
        assert!(data.rows.is_empty());
    }
}
