//! Storage for scrape input and output.
//!
//! ## Files
//!
//! ```text
//! rips.csv                      # input: one identifier per line, no header
//! resultado20250101-120000.csv  # output: identifier + selected fields
//! ```

pub mod identifiers;
pub mod sink;

use crate::error::Result;
use crate::models::Record;

pub use identifiers::IdentifierSource;
pub use sink::CsvRecordSink;

/// Destination for records as they are produced.
///
/// Every accepted record must be durable before `append` returns, so an
/// interrupted run keeps the rows written so far.
pub trait RecordSink {
    /// Persist one record.
    fn append(&mut self, record: &Record) -> Result<()>;

    /// Number of records appended so far.
    fn written(&self) -> usize;
}
