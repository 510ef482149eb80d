use crate::error::MappingError;

/// Result of a single pull: `Ok(None)` means the source is exhausted.
pub type ItemReaderResult<R> = Result<Option<R>, MappingError>;

pub trait ItemReader<R> {
    fn read(&mut self) -> ItemReaderResult<R>;
}

pub trait ItemWriter<W> {
    fn write(&mut self, item: &W) -> Result<(), MappingError>;

    fn flush(&mut self) -> Result<(), MappingError>;

    /// Writes every item in order, stopping at the first failure.
    fn write_all<'a, I>(&mut self, items: I) -> Result<(), MappingError>
    where
        I: IntoIterator<Item = &'a W>,
        W: 'a,
    {
        for item in items {
            self.write(item)?;
        }
        Ok(())
    }
}

/// Producer of tokenized rows, e.g. a CSV parser.
pub trait RowSource {
    /// Next row, `Ok(None)` at end of input. Tokenizer errors are returned
    /// as-is so they stay distinguishable from end of input.
    fn next_row(&mut self) -> Result<Option<Vec<String>>, MappingError>;
}

/// Consumer of rows, e.g. a CSV encoder.
pub trait RowSink {
    fn write_row(&mut self, row: &[String]) -> Result<(), MappingError>;

    fn flush(&mut self) -> Result<(), MappingError>;
}

/// [`RowSource`] over an in-memory iterator of rows.
///
/// ```
/// use rowmap::core::item::{IterSource, RowSource};
///
/// let mut source = IterSource::new(vec![vec!["a".to_string()], vec![]]);
/// assert_eq!(source.next_row().unwrap(), Some(vec!["a".to_string()]));
/// assert_eq!(source.next_row().unwrap(), Some(vec![]));
/// assert_eq!(source.next_row().unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    rows: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Vec<String>>,
{
    pub fn new<T: IntoIterator<IntoIter = I>>(rows: T) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl<I> RowSource for IterSource<I>
where
    I: Iterator<Item = Vec<String>>,
{
    fn next_row(&mut self) -> Result<Option<Vec<String>>, MappingError> {
        Ok(self.rows.next())
    }
}

impl RowSink for Vec<Vec<String>> {
    fn write_row(&mut self, row: &[String]) -> Result<(), MappingError> {
        self.push(row.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MappingError> {
        Ok(())
    }
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn next_row(&mut self) -> Result<Option<Vec<String>>, MappingError> {
        (**self).next_row()
    }
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn write_row(&mut self, row: &[String]) -> Result<(), MappingError> {
        (**self).write_row(row)
    }

    fn flush(&mut self) -> Result<(), MappingError> {
        (**self).flush()
    }
}
