use csv::{ReaderBuilder, StringRecord, Terminator};
use std::io::Read;

use crate::{
    core::{item::RowSource, reader::RecordReader, record::Record},
    error::MappingError,
};

/// A [`RecordReader`] fed by the `csv` crate's tokenizer.
pub type CsvRecordReader<T, R> = RecordReader<T, csv::Reader<R>>;

impl<R: Read> RowSource for csv::Reader<R> {
    /// Reads the next CSV record. The tokenizer already drops blank lines.
    fn next_row(&mut self) -> Result<Option<Vec<String>>, MappingError> {
        let mut record = StringRecord::new();
        if self.read_record(&mut record)? {
            Ok(Some(record.iter().map(str::to_string).collect()))
        } else {
            Ok(None)
        }
    }
}

/// A builder for CSV record readers.
///
/// Options are forwarded to the tokenizer as-is. Cells are never trimmed and
/// rows may be shorter or longer than the header.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Terminator: CRLF (accepts `\r`, `\n` and `\r\n`)
/// - Quote: double quote (")
///
/// # Examples
///
/// ```
/// use rowmap::item::csv::csv_reader::CsvRecordReaderBuilder;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct City {
///     city: String,
///     pop: u32,
/// }
///
/// rowmap::record!(City { city, pop });
///
/// let data = "city;pop\nBoston;4628910\n";
/// let mut reader = CsvRecordReaderBuilder::new()
///     .delimiter(b';')
///     .from_reader::<City, _>(data.as_bytes())
///     .unwrap();
///
/// let cities: Vec<City> = reader.records().collect::<Result<_, _>>().unwrap();
/// assert_eq!(cities[0].pop, 4628910);
/// ```
#[derive(Debug, Clone)]
pub struct CsvRecordReaderBuilder {
    delimiter: u8,
    terminator: Terminator,
    quote: u8,
}

impl Default for CsvRecordReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvRecordReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            terminator: Terminator::CRLF,
            quote: b'"',
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Creates a reader over `rdr`, consuming its header row.
    ///
    /// The reader does not open or close anything; pass `&mut file` to keep
    /// ownership of the underlying stream.
    pub fn from_reader<T: Record, R: Read>(
        self,
        rdr: R,
    ) -> Result<CsvRecordReader<T, R>, MappingError> {
        let rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .terminator(self.terminator)
            .quote(self.quote)
            // the header is read as a regular row and resolved by the mapper
            .has_headers(false)
            .flexible(true)
            .from_reader(rdr);

        RecordReader::new(rdr)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::{
        core::{item::RowSource, reader::ReaderState},
        error::MappingError,
        item::csv::csv_reader::CsvRecordReaderBuilder,
    };

    #[derive(Debug, Default, PartialEq)]
    struct Car {
        year: u16,
        make: String,
        model: String,
    }

    crate::record!(Car { year, make, model });

    #[test]
    fn csv_source_should_yield_raw_rows() -> Result<(), Box<dyn Error>> {
        let data = "a,b\n\n\"c,d\", e \n";
        let mut source = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_bytes());

        assert_eq!(source.next_row()?, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(
            source.next_row()?,
            Some(vec!["c,d".to_string(), " e ".to_string()])
        );
        assert_eq!(source.next_row()?, None);

        Ok(())
    }

    #[test]
    fn records_should_be_read() -> Result<(), Box<dyn Error>> {
        let data = "year,make,model
1948,Porsche,356
2011,Peugeot,206+";

        let mut reader = CsvRecordReaderBuilder::new().from_reader::<Car, _>(data.as_bytes())?;
        let cars = reader.records().collect::<Result<Vec<Car>, _>>()?;

        assert_eq!(
            cars,
            vec![
                Car {
                    year: 1948,
                    make: "Porsche".to_string(),
                    model: "356".to_string(),
                },
                Car {
                    year: 2011,
                    make: "Peugeot".to_string(),
                    model: "206+".to_string(),
                },
            ]
        );
        assert_eq!(reader.state(), ReaderState::Exhausted);

        Ok(())
    }

    #[test]
    fn empty_input_should_fail_header() {
        let result = CsvRecordReaderBuilder::new().from_reader::<Car, _>("".as_bytes());
        assert!(matches!(result, Err(MappingError::Header(_))));
    }

    #[test]
    fn malformed_utf8_should_pass_tokenizer_error_through() {
        let data: &[u8] = b"year,make,model\n2011,\xff\xfe,206\n";
        let mut reader = CsvRecordReaderBuilder::new()
            .from_reader::<Car, _>(data)
            .unwrap();

        let mut records = reader.records();
        assert!(matches!(records.next(), Some(Err(MappingError::Csv(_)))));
        assert!(records.next().is_none());
    }
}
