//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over transfer requests from a CSV file,
//! read in batches for the async strategy.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of TransferRequests
//!                  ↓
//!           csv_format module
//!           (TransferCsvRecord, convert_transfer_record)
//! ```

use crate::io::csv_format::{convert_transfer_record, TransferCsvRecord};
use crate::types::TransferRequest;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous transfer file reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: u64,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing CSV data
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 1,
        }
    }

    /// Read a batch of transfer requests
    ///
    /// Reads up to `batch_size` readable rows. Unreadable rows are logged
    /// and skipped, and do not count towards the batch size.
    ///
    /// # Returns
    ///
    /// Requests in file order. An empty vector means end of file.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<TransferRequest> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<TransferCsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => {
                    self.line_num += 1;
                    match convert_transfer_record(record, Some(self.line_num)) {
                        Ok(request) => batch.push(request),
                        Err(e) => warn!(error = %e, "Skipping transfer record"),
                    }
                }
                Some(Err(e)) => {
                    self.line_num += 1;
                    warn!(line = self.line_num, error = %e, "Skipping unparseable transfer record");
                }
                None => break,
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::io::Cursor;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let csv_content = "source,destination,amount\nS,D,100.0\nD,S,50.0\nA,B,200.0\n";
        let mut async_reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].source_account_id, "S");
        assert_eq!(batch[1].source_account_id, "D");

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].source_account_id, "A");
        assert_eq!(batch[0].amount, Decimal::new(2000, 1));

        assert!(async_reader.read_batch(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_empty_csv() {
        let csv_content = "source,destination,amount\n";
        let mut async_reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        assert!(async_reader.read_batch(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_skips_invalid_record() {
        let csv_content = "source,destination,amount\nS,D,abc\nS,D,50.0\n";
        let mut async_reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        let batch = async_reader.read_batch(10).await;

        assert_eq!(
            batch,
            vec![TransferRequest::new("S", "D", Decimal::new(500, 1))]
        );
    }

    #[tokio::test]
    async fn test_async_reader_keeps_non_positive_amounts() {
        let csv_content = "source,destination,amount\nS,D,0\nS,D,-3\n";
        let mut async_reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        let batch = async_reader.read_batch(10).await;

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].amount, Decimal::new(-3, 0));
    }
}
