//! `HistoryObserver<W>` — bridges `SearchObserver` to an `OutputWriter`.

use tp_search::{GenerationStats, SearchObserver};

use crate::row::HistoryRow;
use crate::writer::OutputWriter;
use crate::{IoError, IoResult};

/// A [`SearchObserver`] that streams one [`HistoryRow`] per generation to
/// `W` and finishes the writer when the search ends.
///
/// Errors from the writer are stored internally because `SearchObserver`
/// methods have no return value.  After `optimizer.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct HistoryObserver<W: OutputWriter<Row = HistoryRow>> {
    writer:     W,
    last_error: Option<IoError>,
}

impl<W: OutputWriter<Row = HistoryRow>> HistoryObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<IoError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: IoResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter<Row = HistoryRow>> SearchObserver for HistoryObserver<W> {
    fn on_generation(&mut self, stats: &GenerationStats) {
        let result = self.writer.write_row(&HistoryRow::from(stats));
        self.store_err(result);
    }

    fn on_finish(&mut self, _completed: usize) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
