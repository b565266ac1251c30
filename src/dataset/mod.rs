mod columns;
mod table;

pub use columns::{Column, ColumnRole, OutcomeColumns, OutcomeKind};
pub use table::{Frame, RecordTable};
