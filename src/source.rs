use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::cell::CellValue;
use crate::dataset::{Frame, OutcomeColumns, RecordTable};
use crate::error::{Error, Result};

/// Reads delimited text with a header row into a [`Frame`].
///
/// # Errors
///
/// Returns [`Error::Csv`] on malformed input (including rows whose length
/// differs from the header).
pub fn read_frame<R: Read>(reader: R, delimiter: u8) -> Result<Frame> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|name| name.trim().to_owned())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::parse_field).collect());
    }
    Ok(Frame::new(columns, rows))
}

/// Opens `path` and reads it with [`read_frame`].
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened, or any error of [`read_frame`].
pub fn read_frame_from_path(path: &Path, delimiter: u8) -> Result<Frame> {
    let file = File::open(path)?;
    read_frame(BufReader::new(file), delimiter)
}

/// Supplies the record table of one named dataset.
pub trait DatasetSource {
    fn name(&self) -> &str;

    /// Loads the dataset, assigning outcome roles from `outcome`.
    fn load(&self, outcome: &OutcomeColumns) -> Result<RecordTable>;
}

/// Dataset stored as delimited text: either one combined file, or a feature
/// file plus a separate outcome file.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    name: String,
    features: PathBuf,
    outcome: Option<PathBuf>,
    delimiter: u8,
}

impl CsvDataset {
    /// Dataset named after the file stem of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTable`] if `path` has no usable file stem.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let features = path.into();
        let name = features
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                Error::malformed(format!(
                    "cannot derive a dataset name from {}",
                    features.display()
                ))
            })?
            .to_owned();
        Ok(Self {
            name,
            features,
            outcome: None,
            delimiter: b',',
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Reads outcome columns from a separate file placed before the features.
    #[must_use]
    pub fn with_outcome_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.outcome = Some(path.into());
        self
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn features_path(&self) -> &Path {
        &self.features
    }
}

impl DatasetSource for CsvDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, outcome: &OutcomeColumns) -> Result<RecordTable> {
        let features = read_frame_from_path(&self.features, self.delimiter)?;
        match &self.outcome {
            Some(path) => {
                let outcome_frame = read_frame_from_path(path, self.delimiter)?;
                RecordTable::from_frames(outcome_frame, features, outcome)
            }
            None => RecordTable::from_frame(features, outcome),
        }
    }
}

/// Dataset already held in memory.
#[derive(Debug, Clone)]
pub struct TableSource {
    name: String,
    table: RecordTable,
}

impl TableSource {
    #[must_use]
    pub fn new(name: impl Into<String>, table: RecordTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

impl DatasetSource for TableSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, outcome: &OutcomeColumns) -> Result<RecordTable> {
        let names = self.table.column_names().map(str::to_owned).collect();
        RecordTable::new(names, self.table.rows().to_vec(), outcome)
    }
}
