use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::{
    core::{item::RowSink, record::Record, writer::RecordWriter},
    error::MappingError,
};

/// A [`RecordWriter`] feeding the `csv` crate's encoder.
pub type CsvRecordWriter<T, W> = RecordWriter<T, csv::Writer<W>>;

impl<W: Write> RowSink for csv::Writer<W> {
    fn write_row(&mut self, row: &[String]) -> Result<(), MappingError> {
        self.write_record(row)?;
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&mut self) -> Result<(), MappingError> {
        csv::Writer::flush(self)?;
        Ok(())
    }
}

impl<T, W: Write> RecordWriter<T, csv::Writer<W>> {
    /// Flushes and returns the underlying byte writer.
    pub fn into_writer(self) -> Result<W, MappingError> {
        self.into_inner()
            .into_inner()
            .map_err(|error| MappingError::Io(error.into_error()))
    }
}

/// A builder for CSV record writers.
///
/// # Examples
///
/// ```
/// use rowmap::core::item::ItemWriter;
/// use rowmap::item::csv::csv_writer::CsvRecordWriterBuilder;
///
/// #[derive(Debug, Default)]
/// struct Row {
///     city: String,
///     population: u64,
/// }
///
/// rowmap::record!(Row { city, population => "popcount" });
///
/// let mut wtr = CsvRecordWriterBuilder::new()
///     .from_writer::<Row, _>(vec![])
///     .unwrap();
///
/// wtr.write(&Row { city: "Boston".to_string(), population: 4628910 }).unwrap();
/// wtr.write(&Row { city: "Concord".to_string(), population: 42695 }).unwrap();
///
/// let data = String::from_utf8(wtr.into_writer().unwrap()).unwrap();
/// assert_eq!(data, "\
/// city,popcount
/// Boston,4628910
/// Concord,42695
/// ");
/// ```
#[derive(Debug, Clone)]
pub struct CsvRecordWriterBuilder {
    delimiter: u8,
    terminator: Terminator,
    quote_style: QuoteStyle,
}

impl Default for CsvRecordWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvRecordWriterBuilder {
    pub fn new() -> CsvRecordWriterBuilder {
        CsvRecordWriterBuilder {
            delimiter: b',',
            terminator: Terminator::Any(b'\n'),
            quote_style: QuoteStyle::Necessary,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvRecordWriterBuilder {
        self.delimiter = delimiter;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> CsvRecordWriterBuilder {
        self.terminator = terminator;
        self
    }

    pub fn quote_style(mut self, quote_style: QuoteStyle) -> CsvRecordWriterBuilder {
        self.quote_style = quote_style;
        self
    }

    /// Creates a writer over `wtr`. The header row is written on first use.
    ///
    /// Pass `&mut file` to keep ownership of the underlying stream.
    pub fn from_writer<T: Record, W: Write>(
        self,
        wtr: W,
    ) -> Result<CsvRecordWriter<T, W>, MappingError> {
        let wtr = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(self.terminator)
            .quote_style(self.quote_style)
            .flexible(false)
            .has_headers(false)
            .from_writer(wtr);

        RecordWriter::new(wtr)
    }
}
