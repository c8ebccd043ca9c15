use crate::config::validate_delimiter;
use crate::error::{ExportError, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::{BufWriter, Write};

/// Settings applied to every delimited writer built for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    delimiter: char,
}

impl CsvOptions {
    pub fn new() -> Self {
        Self { delimiter: ',' }
    }

    /// Rejects delimiters that do not fit in one byte or that would collide
    /// with quoting and record boundaries.
    pub fn with_delimiter(mut self, delimiter: char) -> Result<Self> {
        validate_delimiter(delimiter)?;
        self.delimiter = delimiter;
        Ok(self)
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn writer<W: Write>(&self, inner: W) -> DelimitedWriter<W> {
        let encoder = WriterBuilder::new()
            // ASCII, checked in with_delimiter
            .delimiter(self.delimiter as u8)
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .double_quote(true)
            .flexible(true)
            .from_writer(Vec::new());

        DelimitedWriter {
            encoder,
            sink: BufWriter::new(inner),
            records: 0,
        }
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Record-at-a-time writer that counts what it has written.
///
/// `csv` only encodes one line at a time into a scratch buffer; the line is
/// then copied into a buffered sink. `csv` renders a zero-field record as `""`
/// under necessary quoting, so empty records bypass the encoder and become a
/// bare line terminator.
pub struct DelimitedWriter<W: Write> {
    encoder: csv::Writer<Vec<u8>>,
    sink: BufWriter<W>,
    records: usize,
}

impl<W: Write> DelimitedWriter<W> {
    pub fn write_record<I, T>(&mut self, fields: I) -> std::result::Result<(), ExportError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let record = self.records;
        let mut fields = fields.into_iter().peekable();

        if fields.peek().is_some() {
            self.encoder
                .write_record(fields)
                .map_err(|source| ExportError::Write { record, source })?;
            self.encoder.flush().map_err(|e| ExportError::Write {
                record,
                source: e.into(),
            })?;
        } else {
            self.encoder.get_mut().push(b'\n');
        }

        let line = self.encoder.get_mut();
        let written = self.sink.write_all(line);
        line.clear();
        written.map_err(|e| ExportError::Write {
            record,
            source: e.into(),
        })?;

        self.records += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    pub fn flush(&mut self) -> std::result::Result<(), ExportError> {
        self.sink
            .flush()
            .map_err(|source| ExportError::Flush { source })
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> std::result::Result<W, ExportError> {
        self.sink.into_inner().map_err(|e| ExportError::Flush {
            source: e.into_error(),
        })
    }
}
