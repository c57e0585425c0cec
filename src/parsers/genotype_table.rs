// ==============================================================================
// genotype_table.rs - Wide Genotype Matrix Reader
// ==============================================================================
// Description: Streaming reader for tab-separated VCF-derived genotype matrices
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited text, optionally gzip/bgzip compressed
// Example (skip_rows = 2):
//   ##fileformat=VCFv4.2
//   ##source=simulation
//   #CHROM    POS      ID    REF    ALT    EUR_1    EUR_2
//   1         12345    .     A      G      0|0      0|1
// Lines before the column-name row are discarded by count, not by prefix.
// ==============================================================================

use csv::{ReaderBuilder, StringRecord};
use flate2::read::MultiGzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Gzip magic number (bgzip files share it)
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Name of the position column
pub const POS_COLUMN: &str = "POS";

/// Errors that can occur while reading a genotype matrix
#[derive(Error, Debug)]
pub enum GenotypeTableError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("No column-name row after skipping {skip_rows} lines")]
    MissingHeader { skip_rows: usize },

    #[error("Missing column '{column}' ({missing} of {requested} requested columns not found)")]
    MissingColumn {
        column: String,
        missing: usize,
        requested: usize,
    },

    #[error("Column '{column}' appears {count} times in the header row")]
    DuplicateColumn { column: String, count: usize },

    #[error("Invalid position value at line {line}: '{value}'")]
    InvalidPosition { line: u64, value: String },

    #[error("Position {value} at line {line} does not fit in an unsigned 32-bit integer")]
    PositionOutOfRange { line: u64, value: i64 },
}

/// Open a text file, transparently decompressing gzip/bgzip input
pub fn open_text(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>, GenotypeTableError> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);

    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        // bgzip output is a series of gzip members
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// One data row of the matrix, borrowed from the reader's record buffer
#[derive(Debug)]
pub struct WideRow<'a> {
    /// 1-based line number in the (decompressed) file
    pub line: u64,

    /// Raw POS value, before the unsigned cast
    pub position: i64,

    record: &'a StringRecord,
    sample_indices: &'a [usize],
}

impl<'a> WideRow<'a> {
    /// Genotype cells in sample-column order
    pub fn genotypes(&self) -> impl Iterator<Item = &'a str> + 'a {
        let record = self.record;
        let indices = self.sample_indices;
        indices.iter().map(move |&i| &record[i])
    }
}

/// Streaming reader over a wide genotype matrix
///
/// Only the POS column and the requested sample columns are retained; every
/// other column is skipped.
pub struct GenotypeTableReader {
    reader: csv::Reader<Box<dyn BufRead>>,
    record: StringRecord,
    skip_rows: usize,
    pos_index: usize,
    sample_indices: Vec<usize>,
}

impl GenotypeTableReader {
    /// Open a matrix, skip `skip_rows` leading lines and resolve columns
    ///
    /// # Arguments
    /// * `path` - Tab-separated file (.vcf, .vcf.gz, .tsv, ...)
    /// * `skip_rows` - Lines to discard before the column-name row
    /// * `sample_columns` - Sample columns to retain, in output order
    ///
    /// # Returns
    /// * `Err(GenotypeTableError::MissingColumn)` if POS or any sample column is absent
    pub fn open(
        path: impl AsRef<Path>,
        skip_rows: usize,
        sample_columns: &[String],
    ) -> Result<Self, GenotypeTableError> {
        let mut input = open_text(path)?;

        let mut discarded = Vec::new();
        for _ in 0..skip_rows {
            discarded.clear();
            if input.read_until(b'\n', &mut discarded)? == 0 {
                return Err(GenotypeTableError::MissingHeader { skip_rows });
            }
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            // Quote characters are read literally
            .quoting(false)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(GenotypeTableError::MissingHeader { skip_rows });
        }

        let (pos_index, sample_indices) = resolve_columns(&headers, sample_columns)?;

        Ok(Self {
            reader,
            record: StringRecord::new(),
            skip_rows,
            pos_index,
            sample_indices,
        })
    }

    /// Number of retained sample columns
    pub fn sample_count(&self) -> usize {
        self.sample_indices.len()
    }

    /// Read the next data row, or `None` at end of input
    pub fn next_row(&mut self) -> Option<Result<WideRow<'_>, GenotypeTableError>> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => return Some(Err(e.into())),
        }

        let line = self
            .record
            .position()
            .map(|p| p.line())
            .unwrap_or_default()
            + self.skip_rows as u64;

        let raw = &self.record[self.pos_index];
        let position = match raw.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                return Some(Err(GenotypeTableError::InvalidPosition {
                    line,
                    value: raw.to_string(),
                }))
            }
        };

        Some(Ok(WideRow {
            line,
            position,
            record: &self.record,
            sample_indices: &self.sample_indices,
        }))
    }
}

/// Locate POS and every sample column in the header row
fn resolve_columns(
    headers: &StringRecord,
    sample_columns: &[String],
) -> Result<(usize, Vec<usize>), GenotypeTableError> {
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        by_name.insert(name, i);
        *counts.entry(name).or_default() += 1;
    }

    let duplicate = std::iter::once(POS_COLUMN)
        .chain(sample_columns.iter().map(String::as_str))
        .find(|name| counts.get(name).copied().unwrap_or(0) > 1);
    if let Some(column) = duplicate {
        return Err(GenotypeTableError::DuplicateColumn {
            column: column.to_string(),
            count: counts[column],
        });
    }

    let requested = sample_columns.len() + 1;
    let missing: Vec<&str> = std::iter::once(POS_COLUMN)
        .chain(sample_columns.iter().map(String::as_str))
        .filter(|name| !by_name.contains_key(name))
        .collect();

    if let Some(first) = missing.first() {
        return Err(GenotypeTableError::MissingColumn {
            column: first.to_string(),
            missing: missing.len(),
            requested,
        });
    }

    let pos_index = by_name[POS_COLUMN];
    let sample_indices = sample_columns
        .iter()
        .map(|name| by_name[name.as_str()])
        .collect();

    Ok((pos_index, sample_indices))
}

/// Cast a raw POS value to the unsigned 32-bit output type
pub fn cast_position(value: i64, line: u64) -> Result<u32, GenotypeTableError> {
    u32::try_from(value).map_err(|_| GenotypeTableError::PositionOutOfRange { line, value })
}

/// Read the POS column of a mask table into a lookup set
pub fn read_mask_positions(
    path: impl AsRef<Path>,
    skip_rows: usize,
) -> Result<HashSet<i64>, GenotypeTableError> {
    let mut reader = GenotypeTableReader::open(path, skip_rows, &[])?;

    let mut positions = HashSet::new();
    while let Some(row) = reader.next_row() {
        positions.insert(row?.position);
    }

    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Create a temporary test file with the given contents
    fn create_test_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn create_gz_file(contents: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let mut encoder = GzEncoder::new(file.as_file(), Compression::default());
        encoder.write_all(contents.as_bytes()).unwrap();
        encoder.finish().unwrap();
        file
    }

    fn samples(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const MATRIX: &str = "\
##fileformat=VCFv4.2
##source=test
#CHROM\tPOS\tID\tEUR_2\tEUR_1
1\t100\t.\t0|1\t1|1
1\t200\t.\t1|0\t0|0
";

    #[test]
    fn test_read_selected_columns() {
        let file = create_test_file(MATRIX);
        let mut reader =
            GenotypeTableReader::open(file.path(), 2, &samples(&["EUR_1", "EUR_2"])).unwrap();
        assert_eq!(reader.sample_count(), 2);

        let row = reader.next_row().unwrap().unwrap();
        assert_eq!(row.position, 100);
        assert_eq!(row.line, 4);
        // Sample order follows the requested list, not the file
        assert_eq!(row.genotypes().collect::<Vec<_>>(), vec!["1|1", "0|1"]);

        let row = reader.next_row().unwrap().unwrap();
        assert_eq!(row.position, 200);
        assert_eq!(row.genotypes().collect::<Vec<_>>(), vec!["0|0", "1|0"]);

        assert!(reader.next_row().is_none());
    }

    #[test]
    fn test_read_gzip() {
        let file = create_gz_file(MATRIX);
        let mut reader =
            GenotypeTableReader::open(file.path(), 2, &samples(&["EUR_1"])).unwrap();

        let mut positions = Vec::new();
        while let Some(row) = reader.next_row() {
            positions.push(row.unwrap().position);
        }
        assert_eq!(positions, vec![100, 200]);
    }

    #[test]
    fn test_read_multi_member_gzip() {
        // bgzip writes independent gzip members back to back
        let file = NamedTempFile::new().unwrap();
        for member in ["##a\nPOS\tEUR_1\n100\t0|1\n", "200\t1|0\n", "300\t1|1\r\n"] {
            let mut encoder = GzEncoder::new(file.as_file(), Compression::default());
            encoder.write_all(member.as_bytes()).unwrap();
            encoder.finish().unwrap();
        }

        let mut reader =
            GenotypeTableReader::open(file.path(), 1, &samples(&["EUR_1"])).unwrap();
        let mut rows = Vec::new();
        while let Some(row) = reader.next_row() {
            let row = row.unwrap();
            let genotypes: Vec<String> = row.genotypes().map(str::to_string).collect();
            rows.push((row.position, genotypes));
        }

        assert_eq!(
            rows,
            vec![
                (100, vec!["0|1".to_string()]),
                (200, vec!["1|0".to_string()]),
                (300, vec!["1|1".to_string()]),
            ]
        );
    }

    #[test]
    fn test_duplicate_requested_column() {
        let file = create_test_file("POS\tEUR_1\tEUR_1\n100\t0|0\t1|1\n");
        match GenotypeTableReader::open(file.path(), 0, &samples(&["EUR_1"])) {
            Err(GenotypeTableError::DuplicateColumn { column, count }) => {
                assert_eq!(column, "EUR_1");
                assert_eq!(count, 2);
            }
            _ => panic!("Expected DuplicateColumn error"),
        }
    }

    #[test]
    fn test_duplicate_unrequested_column_is_ignored() {
        let file = create_test_file("POS\tID\tID\tEUR_1\n100\t.\t.\t0|1\n");
        let mut reader = GenotypeTableReader::open(file.path(), 0, &samples(&["EUR_1"])).unwrap();
        let row = reader.next_row().unwrap().unwrap();
        assert_eq!(row.genotypes().collect::<Vec<_>>(), vec!["0|1"]);
    }

    #[test]
    fn test_missing_sample_column() {
        let file = create_test_file(MATRIX);
        let result = GenotypeTableReader::open(file.path(), 2, &samples(&["EUR_1", "EUR_3"]));
        match result {
            Err(GenotypeTableError::MissingColumn {
                column,
                missing,
                requested,
            }) => {
                assert_eq!(column, "EUR_3");
                assert_eq!(missing, 1);
                assert_eq!(requested, 3);
            }
            _ => panic!("Expected MissingColumn error"),
        }
    }

    #[test]
    fn test_wrong_skip_rows_loses_pos() {
        let file = create_test_file(MATRIX);
        // Header row becomes "##source=test", so POS cannot be found
        let result = GenotypeTableReader::open(file.path(), 1, &[]);
        assert!(matches!(
            result,
            Err(GenotypeTableError::MissingColumn { ref column, .. }) if column == "POS"
        ));
    }

    #[test]
    fn test_missing_header() {
        let file = create_test_file("##only\n##comments\n");
        assert!(matches!(
            GenotypeTableReader::open(file.path(), 2, &[]),
            Err(GenotypeTableError::MissingHeader { skip_rows: 2 })
        ));
        assert!(matches!(
            GenotypeTableReader::open(file.path(), 5, &[]),
            Err(GenotypeTableError::MissingHeader { skip_rows: 5 })
        ));
    }

    #[test]
    fn test_invalid_position() {
        let file = create_test_file("#CHROM\tPOS\n1\tNOT_A_NUMBER\n");
        let mut reader = GenotypeTableReader::open(file.path(), 0, &[]).unwrap();
        match reader.next_row().unwrap() {
            Err(GenotypeTableError::InvalidPosition { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "NOT_A_NUMBER");
            }
            _ => panic!("Expected InvalidPosition error"),
        }
    }

    #[test]
    fn test_ragged_row_is_error() {
        let file = create_test_file("POS\tEUR_1\n100\t0|0\n200\n");
        let mut reader = GenotypeTableReader::open(file.path(), 0, &samples(&["EUR_1"])).unwrap();
        assert!(reader.next_row().unwrap().is_ok());
        assert!(matches!(
            reader.next_row().unwrap(),
            Err(GenotypeTableError::CsvError(_))
        ));
    }

    #[test]
    fn test_cast_position() {
        assert_eq!(cast_position(12345, 1).unwrap(), 12345);
        assert_eq!(cast_position(u32::MAX as i64, 1).unwrap(), u32::MAX);
        assert!(matches!(
            cast_position(u32::MAX as i64 + 1, 7),
            Err(GenotypeTableError::PositionOutOfRange { line: 7, .. })
        ));
        assert!(cast_position(-1, 1).is_err());
    }

    #[test]
    fn test_read_mask_positions() {
        let file = create_test_file(MATRIX);
        let mask = read_mask_positions(file.path(), 2).unwrap();
        assert_eq!(mask, HashSet::from([100, 200]));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            GenotypeTableReader::open("/nonexistent/matrix.vcf.gz", 0, &[]),
            Err(GenotypeTableError::IoError(_))
        ));
    }
}
