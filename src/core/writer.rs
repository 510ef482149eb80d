use log::debug;

use crate::{
    core::{
        item::{ItemWriter, RowSink},
        metadata::{self, FieldDescriptor},
        record::Record,
    },
    error::MappingError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    HeaderPending,
    Streaming,
}

/// Encodes records of type `T` into rows on a [`RowSink`].
///
/// Columns follow the resolved field order of `T`. The header row is
/// written once, on the first write or on [`write_header`](Self::write_header).
/// Every row is flushed as soon as it is written.
///
/// ```
/// use rowmap::core::{item::ItemWriter, writer::RecordWriter};
///
/// #[derive(Debug, Default)]
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// rowmap::record!(Person { name => "Name", age => "Age,index=0" });
///
/// let mut writer = RecordWriter::<Person, _>::new(Vec::<Vec<String>>::new()).unwrap();
/// writer.write(&Person { name: "Alice".to_string(), age: 30 }).unwrap();
///
/// assert_eq!(
///     writer.into_inner(),
///     vec![
///         vec!["Age".to_string(), "Name".to_string()],
///         vec!["30".to_string(), "Alice".to_string()],
///     ]
/// );
/// ```
pub struct RecordWriter<T, K> {
    sink: K,
    fields: Vec<FieldDescriptor<T>>,
    state: WriterState,
}

impl<T: Record, K: RowSink> RecordWriter<T, K> {
    /// Resolves the field order of `T`. Nothing is written yet.
    pub fn new(sink: K) -> Result<Self, MappingError> {
        let fields = metadata::resolve::<T>()?;
        Ok(Self {
            sink,
            fields,
            state: WriterState::HeaderPending,
        })
    }

    /// Writes and flushes the header row unless it was already written.
    pub fn write_header(&mut self) -> Result<(), MappingError> {
        if self.state == WriterState::Streaming {
            return Ok(());
        }

        let header: Vec<String> = self
            .fields
            .iter()
            .map(|field| field.name().to_string())
            .collect();
        self.sink.write_row(&header)?;
        self.sink.flush()?;

        debug!("Header written: {:?}", header);
        self.state = WriterState::Streaming;
        Ok(())
    }

    fn encode_row(&self, item: &T) -> Result<Vec<String>, MappingError> {
        self.fields.iter().map(|field| field.encode(item)).collect()
    }
}

impl<T, K> RecordWriter<T, K> {
    /// Declared column names in output order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name()).collect()
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn get_ref(&self) -> &K {
        &self.sink
    }

    pub fn into_inner(self) -> K {
        self.sink
    }
}

impl<T: Record, K: RowSink> ItemWriter<T> for RecordWriter<T, K> {
    /// Encodes `item` and writes it as one row.
    ///
    /// The whole row is encoded before anything reaches the sink, so an
    /// encode failure emits nothing for this item.
    fn write(&mut self, item: &T) -> Result<(), MappingError> {
        self.write_header()?;

        let row = self.encode_row(item).inspect_err(|error| {
            debug!("Unable to encode record: {}", error);
        })?;
        self.sink.write_row(&row)?;
        self.sink.flush()
    }

    fn flush(&mut self) -> Result<(), MappingError> {
        self.sink.flush()
    }
}
