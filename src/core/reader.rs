use std::{
    collections::{BTreeMap, HashMap},
    iter::FusedIterator,
};

use log::{debug, trace};

use crate::{
    core::{
        item::{ItemReader, ItemReaderResult, RowSource},
        metadata::{self, FieldDescriptor},
        record::Record,
    },
    error::MappingError,
};

/// Lifecycle of a [`RecordReader`]. `Exhausted` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Ready,
    Streaming,
    Exhausted,
    Failed,
}

/// Decodes rows from a [`RowSource`] into records of type `T`.
///
/// The first row is taken as the header when the reader is built. Header
/// names (trimmed) are matched against the declared column names of `T`;
/// unmatched header columns are never read and unmatched fields keep their
/// default value. Rows with no cells are skipped.
///
/// The reader is single pass: once the source is exhausted, or a row fails
/// to decode, every further pull yields nothing.
///
/// ```
/// use rowmap::core::{item::IterSource, reader::RecordReader};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// rowmap::record!(Person { name => "Name", age => "Age" });
///
/// let rows = vec![
///     vec!["Name".to_string(), "Age".to_string()],
///     vec!["Alice".to_string(), "30".to_string()],
/// ];
/// let mut reader = RecordReader::<Person, _>::new(IterSource::new(rows)).unwrap();
///
/// let people: Vec<Person> = reader.records().collect::<Result<_, _>>().unwrap();
/// assert_eq!(people, vec![Person { name: "Alice".to_string(), age: 30 }]);
/// ```
pub struct RecordReader<T, S> {
    source: S,
    headers: Vec<String>,
    fields: Vec<FieldDescriptor<T>>,
    /// Column index to position in `fields`.
    columns: BTreeMap<usize, usize>,
    state: ReaderState,
}

impl<T: Record, S: RowSource> RecordReader<T, S> {
    /// Reads the header row from `source` and maps it onto `T`.
    ///
    /// Fails with [`MappingError::Header`] when no header row can be read and
    /// with [`MappingError::Configuration`] when `T` cannot be resolved.
    pub fn new(mut source: S) -> Result<Self, MappingError> {
        let headers = match source.next_row() {
            Ok(Some(headers)) => headers,
            Ok(None) => {
                return Err(MappingError::Header(
                    "input is empty, expected a header row".to_string(),
                ));
            }
            Err(error) => {
                return Err(MappingError::Header(format!(
                    "unable to read header row: {error}"
                )));
            }
        };

        let fields = metadata::resolve::<T>()?;
        let columns = map_columns(&headers, &fields);

        debug!(
            "Mapped {} of {} header columns onto {}",
            columns.len(),
            headers.len(),
            std::any::type_name::<T>()
        );

        Ok(Self {
            source,
            headers,
            fields,
            columns,
            state: ReaderState::Ready,
        })
    }

    /// Lazy sequence of decoded records.
    ///
    /// A decode or tokenizer error is yielded once and ends the sequence.
    /// Dropping the sequence early leaves the remaining rows unread.
    pub fn records(&mut self) -> Records<'_, T, S> {
        Records { reader: self }
    }

    /// Owning variant of [`records`](Self::records).
    pub fn into_records(self) -> IntoRecords<T, S> {
        IntoRecords { reader: self }
    }

    fn decode_row(&self, row: &[String]) -> Result<T, MappingError> {
        let mut record = T::default();
        for (&column, &position) in &self.columns {
            if let Some(cell) = row.get(column) {
                self.fields[position].decode(&mut record, cell)?;
            }
        }
        Ok(record)
    }
}

impl<T, S> RecordReader<T, S> {
    /// The header row as read, untrimmed.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Mapped columns as `(column index, declared name)`, by column index.
    pub fn mapped_columns(&self) -> Vec<(usize, &str)> {
        self.columns
            .iter()
            .map(|(&column, &position)| (column, self.fields[position].name()))
            .collect()
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }
}

impl<T: Record, S: RowSource> ItemReader<T> for RecordReader<T, S> {
    /// Pulls and decodes the next non-empty row.
    ///
    /// # Returns
    /// - `Ok(Some(record))` if a row was decoded
    /// - `Ok(None)` at end of input, or once the reader has failed
    /// - `Err(error)` on a tokenizer or decode error; the reader is then `Failed`
    fn read(&mut self) -> ItemReaderResult<T> {
        match self.state {
            ReaderState::Exhausted | ReaderState::Failed => return Ok(None),
            ReaderState::Ready => self.state = ReaderState::Streaming,
            ReaderState::Streaming => {}
        }

        loop {
            let row = match self.source.next_row() {
                Ok(Some(row)) => row,
                Ok(None) => {
                    self.state = ReaderState::Exhausted;
                    return Ok(None);
                }
                Err(error) => return Err(self.fail(error)),
            };

            if row.is_empty() {
                trace!("Skipping blank row");
                continue;
            }

            return self
                .decode_row(&row)
                .map(Some)
                .map_err(|error| self.fail(error));
        }
    }
}

impl<T, S> RecordReader<T, S> {
    fn fail(&mut self, error: MappingError) -> MappingError {
        if error.is_codec_error() {
            debug!("Stopping on row decode error: {}", error);
        } else {
            debug!("Stopping on source error: {}", error);
        }
        self.state = ReaderState::Failed;
        error
    }
}

/// Builds the column index to field position mapping. Header names are
/// trimmed; when a name repeats in the header, its last occurrence wins.
fn map_columns<T>(headers: &[String], fields: &[FieldDescriptor<T>]) -> BTreeMap<usize, usize> {
    let by_name: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(column, header)| (header.trim(), column))
        .collect();

    let mut columns = BTreeMap::new();
    for (position, field) in fields.iter().enumerate() {
        match by_name.get(field.name()) {
            Some(&column) => {
                columns.insert(column, position);
            }
            None => trace!("Field '{}' has no header column", field.name()),
        }
    }

    for (column, header) in headers.iter().enumerate() {
        if !columns.contains_key(&column) {
            trace!("Ignoring header column {} '{}'", column, header);
        }
    }

    columns
}

/// Borrowing record sequence, see [`RecordReader::records`].
pub struct Records<'r, T, S> {
    reader: &'r mut RecordReader<T, S>,
}

impl<T: Record, S: RowSource> Iterator for Records<'_, T, S> {
    type Item = Result<T, MappingError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read().transpose()
    }
}

impl<T: Record, S: RowSource> FusedIterator for Records<'_, T, S> {}

/// Owning record sequence, see [`RecordReader::into_records`].
pub struct IntoRecords<T, S> {
    reader: RecordReader<T, S>,
}

impl<T, S> IntoRecords<T, S> {
    pub fn into_reader(self) -> RecordReader<T, S> {
        self.reader
    }
}

impl<T: Record, S: RowSource> Iterator for IntoRecords<T, S> {
    type Item = Result<T, MappingError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read().transpose()
    }
}

impl<T: Record, S: RowSource> FusedIterator for IntoRecords<T, S> {}
