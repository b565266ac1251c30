use std::io::Write;

use serde::Serialize;

use crate::dataset::RecordTable;
use crate::error::Result;
use crate::plan::MissingnessPlan;

/// Intended vs. realized missingness of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub variable: String,
    /// `None` for columns no plan group covers, including outcome columns.
    pub intended_p: Option<f64>,
    pub n_missing: usize,
    /// Percentage of rows missing, rounded to two decimals.
    pub pct_missing: f64,
}

/// Per-column missingness summary of a masked table, in table column order.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingnessReport {
    row_count: usize,
    entries: Vec<ReportEntry>,
}

impl MissingnessReport {
    /// Recounts missing cells in `table` and pairs them with the probabilities of `plan`.
    #[must_use]
    pub fn from_table(table: &RecordTable, plan: &MissingnessPlan) -> Self {
        let row_count = table.row_count();
        let entries = table
            .columns()
            .iter()
            .map(|column| {
                let n_missing = table.missing_count(column.index);
                ReportEntry {
                    variable: column.name.clone(),
                    intended_p: plan.probability_for(&column.name),
                    n_missing,
                    pct_missing: percentage(n_missing, row_count),
                }
            })
            .collect();
        Self { row_count, entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    #[must_use]
    pub fn entry(&self, variable: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|entry| entry.variable == variable)
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn total_missing(&self) -> usize {
        self.entries.iter().map(|entry| entry.n_missing).sum()
    }

    /// Writes `variable,intended_p,n_missing,pct_missing`, one row per column.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert!((percentage(1, 3) - 33.33).abs() < 1e-9);
        assert!((percentage(2, 3) - 66.67).abs() < 1e-9);
        assert!((percentage(30, 200) - 15.0).abs() < 1e-9);
        assert!(percentage(0, 200).abs() < f64::EPSILON);
    }
}
