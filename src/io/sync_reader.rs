//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over transfer requests from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<TransferRequest, TransferError>` for each CSV row:
//!
//! ```no_run
//! use rust_transfer_orchestrator::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("transfers.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(request) => println!("Transfer: {}", request),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator, with
//!   the line number of the offending row
//!
//! The reader never holds more than one row in memory.

use crate::io::csv_format::{convert_transfer_record, TransferCsvRecord};
use crate::types::{TransferError, TransferRequest};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Open a CSV file with the reader settings shared by both input files
pub(crate) fn open_csv(path: &Path) -> Result<csv::Reader<File>, TransferError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TransferError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => TransferError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        },
    })?;

    Ok(ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .buffer_capacity(8 * 1024)
        .from_reader(file))
}

/// Synchronous transfer file reader
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the transfer CSV file
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(TransferError::FileNotFound)` if there is no such file
    pub fn new(path: &Path) -> Result<Self, TransferError> {
        Ok(Self {
            reader: open_csv(path)?,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<TransferRequest, TransferError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<TransferCsvRecord>();
        let next = deserializer.next()?;
        self.line_num += 1;

        Some(match next {
            Ok(record) => convert_transfer_record(record, Some(self.line_num)),
            Err(e) => Err(TransferError::from(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));

        assert!(matches!(result, Err(TransferError::FileNotFound { .. })));
    }

    #[test]
    fn test_sync_reader_iterates_requests_in_file_order() {
        let file = create_temp_csv("source,destination,amount\nS,D,500\nD,S,0.25\n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            Ok(TransferRequest::new("S", "D", Decimal::new(500, 0)))
        );
        assert_eq!(
            records[1],
            Ok(TransferRequest::new("D", "S", Decimal::new(25, 2)))
        );
    }

    #[test]
    fn test_sync_reader_reports_line_of_bad_amount() {
        let file = create_temp_csv("source,destination,amount\nS,D,500\nS,D,lots\nS,D,1\n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert_eq!(
            records[1],
            Err(TransferError::invalid_amount("lots", Some(3)))
        );
        assert!(records[2].is_ok());
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let file = create_temp_csv("source,destination,amount\n  S  ,  D  ,  100.0  \n");

        let records: Vec<_> = SyncReader::new(file.path())
            .unwrap()
            .filter_map(Result::ok)
            .collect();

        assert_eq!(
            records,
            vec![TransferRequest::new("S", "D", Decimal::new(1000, 1))]
        );
    }

    #[test]
    fn test_sync_reader_missing_column_is_row_error() {
        let file = create_temp_csv("source,destination,amount\nS,D\nS,D,5\n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], Err(TransferError::ParseError { .. })));
        assert!(records[1].is_ok());
    }

    #[test]
    fn test_sync_reader_handles_empty_file_after_header() {
        let file = create_temp_csv("source,destination,amount\n");

        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }
}
