//! The `OutputWriter` trait implemented by all table writers.

use crate::IoResult;

/// A sink for one kind of row.
///
/// Writers buffer internally; nothing is guaranteed on disk until
/// [`finish`](Self::finish) returns.
pub trait OutputWriter {
    type Row;

    fn write_row(&mut self, row: &Self::Row) -> IoResult<()>;

    /// Write a batch of rows, stopping at the first error.
    fn write_rows(&mut self, rows: &[Self::Row]) -> IoResult<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Flush and close the underlying file handle.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> IoResult<()>;
}
