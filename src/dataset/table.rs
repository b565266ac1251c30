use std::collections::HashSet;

use super::columns::{Column, ColumnRole, OutcomeColumns};
use crate::cell::{CellValue, MissingValue};
use crate::error::{Error, Result};
use crate::sinks::{RowSink, SinkContext};

/// Header plus rows as read from delimited text, before outcome roles are assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Frame {
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Ordered columns and row-major cells of a survival dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
}

impl RecordTable {
    /// Builds a table and assigns column roles from `outcome`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTable`] when a column name repeats, an outcome
    /// column is absent, or a row does not match the header length.
    pub fn new(
        names: Vec<String>,
        rows: Vec<Vec<CellValue>>,
        outcome: &OutcomeColumns,
    ) -> Result<Self> {
        if outcome.event == outcome.time {
            return Err(Error::malformed(format!(
                "event and time outcome columns share the name '{}'",
                outcome.event
            )));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Error::malformed(format!("duplicate column name '{name}'")));
            }
        }
        for required in [&outcome.event, &outcome.time] {
            if !seen.contains(required.as_str()) {
                return Err(Error::malformed(format!(
                    "outcome column '{required}' not found"
                )));
            }
        }

        for (index, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(Error::malformed(format!(
                    "row {index} has {} cells, expected {}",
                    row.len(),
                    names.len()
                )));
            }
        }

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Column {
                index,
                role: outcome.role_of(&name),
                name,
            })
            .collect();
        Ok(Self { columns, rows })
    }

    /// Builds a table from a single frame holding both outcome and predictor columns.
    ///
    /// # Errors
    ///
    /// See [`RecordTable::new`].
    pub fn from_frame(frame: Frame, outcome: &OutcomeColumns) -> Result<Self> {
        Self::new(frame.columns, frame.rows, outcome)
    }

    /// Concatenates an outcome frame and a feature frame side by side, outcome
    /// columns first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTable`] when the frames differ in row count,
    /// plus everything [`RecordTable::new`] rejects.
    pub fn from_frames(
        outcome_frame: Frame,
        features: Frame,
        outcome: &OutcomeColumns,
    ) -> Result<Self> {
        if outcome_frame.row_count() != features.row_count() {
            return Err(Error::malformed(format!(
                "outcome frame has {} rows but feature frame has {}",
                outcome_frame.row_count(),
                features.row_count()
            )));
        }
        let mut names = outcome_frame.columns;
        names.extend(features.columns);
        let rows = outcome_frame
            .rows
            .into_iter()
            .zip(features.rows)
            .map(|(mut left, right)| {
                left.extend(right);
                left
            })
            .collect();
        Self::new(names, rows, outcome)
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column(name).map(|column| column.index)
    }

    /// Predictor column names in table order.
    #[must_use]
    pub fn predictor_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| column.is_predictor())
            .map(|column| column.name.clone())
            .collect()
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    /// Cells of one column, top to bottom.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    #[must_use]
    pub fn missing_count(&self, column: usize) -> usize {
        self.column_values(column)
            .filter(|value| value.is_missing())
            .count()
    }

    /// Replaces a present cell with an injected missing marker. Cells that are
    /// already missing keep their marker. Returns whether the cell changed.
    pub(crate) fn mask_cell(&mut self, row: usize, column: usize) -> bool {
        debug_assert!(
            matches!(self.columns[column].role, ColumnRole::Predictor),
            "outcome columns are never masked"
        );
        let cell = &mut self.rows[row][column];
        if cell.is_missing() {
            return false;
        }
        *cell = CellValue::Missing(MissingValue::Injected);
        true
    }

    /// Streams the header and every row into `sink`.
    ///
    /// # Errors
    ///
    /// Propagates any error raised by the sink.
    pub fn write_to<S: RowSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.begin(SinkContext::new(&self.columns))?;
        for row in &self.rows {
            sink.write_row(row)?;
        }
        sink.finish()
    }
}
