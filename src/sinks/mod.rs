mod csv;

use crate::cell::CellValue;
use crate::dataset::Column;
use crate::error::Result;

pub use self::csv::CsvSink;

/// Provides the table layout to sinks during initialisation.
pub struct SinkContext<'a> {
    pub columns: &'a [Column],
}

impl<'a> SinkContext<'a> {
    #[must_use]
    pub const fn new(columns: &'a [Column]) -> Self {
        Self { columns }
    }
}

/// Trait implemented by sinks that persist record tables row by row.
pub trait RowSink {
    /// Called before any rows are written to allow the sink to initialise internal state.
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()>;

    /// Invoked for every row of the table, in order.
    fn write_row(&mut self, row: &[CellValue]) -> Result<()>;

    /// Called once all rows have been forwarded to the sink.
    fn finish(&mut self) -> Result<()>;
}
