mod encode;

use std::borrow::Cow;
use std::io::Write;

use csv::{ByteRecord, Writer, WriterBuilder};
use itoa::Buffer as ItoaBuffer;
use ryu::Buffer as RyuBuffer;

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::sinks::{RowSink, SinkContext};

use encode::encode_value;

const DEFAULT_DELIMITER: u8 = b',';
const DEFAULT_SCRATCH_CAPACITY: usize = 32;

/// Writes table rows into a delimited text file (CSV/TSV) without an index column.
pub struct CsvSink<W: Write> {
    output: Option<W>,
    writer: Option<Writer<W>>,
    delimiter: u8,
    write_headers: bool,
    column_count: usize,
    record: ByteRecord,
    scratch: Vec<Vec<u8>>, // one scratch buffer per column
}

impl<W: Write> CsvSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            output: Some(writer),
            writer: None,
            delimiter: DEFAULT_DELIMITER,
            write_headers: true,
            column_count: 0,
            record: ByteRecord::new(),
            scratch: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub const fn with_headers(mut self, headers: bool) -> Self {
        self.write_headers = headers;
        self
    }

    /// Returns the underlying writer once the sink has been finished.
    #[must_use]
    pub fn into_output(self) -> Option<W> {
        self.output
    }

    fn build_writer(&mut self) -> Result<()> {
        let output = self.output.take().ok_or_else(|| Error::Csv {
            details: Cow::from("CSV sink output already taken"),
        })?;
        let writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(output);
        self.writer = Some(writer);
        Ok(())
    }

    fn writer_mut(&mut self) -> Result<&mut Writer<W>> {
        self.writer.as_mut().ok_or_else(|| Error::Csv {
            details: Cow::from("CSV sink used before begin"),
        })
    }

    fn write_headers(&mut self, context: &SinkContext<'_>) -> Result<()> {
        if !self.write_headers {
            return Ok(());
        }
        let mut header = ByteRecord::with_capacity(0, context.columns.len());
        for column in context.columns {
            header.push_field(column.name.as_bytes());
        }
        self.writer_mut()?.write_byte_record(&header)?;
        Ok(())
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()> {
        if self.writer.is_some() {
            return Err(Error::Csv {
                details: Cow::from("CSV sink cannot be reused without finishing"),
            });
        }
        self.build_writer()?;
        self.column_count = context.columns.len();
        self.record = ByteRecord::with_capacity(0, self.column_count);
        self.scratch = (0..self.column_count)
            .map(|_| Vec::with_capacity(DEFAULT_SCRATCH_CAPACITY))
            .collect();

        self.write_headers(&context)
    }

    fn write_row(&mut self, row: &[CellValue]) -> Result<()> {
        if row.len() != self.column_count {
            return Err(Error::Csv {
                details: Cow::Owned(format!(
                    "row length {} does not match expected {}",
                    row.len(),
                    self.column_count
                )),
            });
        }
        self.record.clear();
        let mut ryu = RyuBuffer::new();
        let mut itoa = ItoaBuffer::new();

        for (value, buf) in row.iter().zip(self.scratch.iter_mut()) {
            encode_value(value, buf, &mut ryu, &mut itoa);
            self.record.push_field(buf);
        }
        let writer = self.writer.as_mut().ok_or_else(|| Error::Csv {
            details: Cow::from("CSV sink used before begin"),
        })?;
        writer.write_byte_record(&self.record)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            let out = writer.into_inner().map_err(|e| Error::Csv {
                details: Cow::Owned(format!("csv into_inner failed: {e}")),
            })?;
            self.output = Some(out);
        }
        self.column_count = 0;
        self.scratch.clear();
        self.record.clear();
        Ok(())
    }
}
