//! CSV support for reading and writing typed records.
//!
//! The `csv` crate does the tokenizing (quoting, escaping, line splitting);
//! this module plugs it into the generic [`RecordReader`](crate::core::reader::RecordReader)
//! and [`RecordWriter`](crate::core::writer::RecordWriter) through the
//! [`RowSource`](crate::core::item::RowSource) and
//! [`RowSink`](crate::core::item::RowSink) traits.
//!
//! # Module Architecture
//!
//! 1. **CsvRecordReader**: reads the header row, maps it onto the record's
//!    declared column names and decodes every following row.
//!
//! 2. **CsvRecordWriter**: writes the header row in resolved field order,
//!    then one flushed row per record.
//!
//! Both are created through builders.
//!
//! # Ownership
//!
//! Readers and writers never open or close streams. Pass `&mut file` (or any
//! `Read` / `Write` borrow) to keep the stream after the reader or writer is
//! dropped.
//!
//! # Examples
//!
//! ## Reading, filtering and writing back
//!
//! ```
//! use rowmap::core::{filter::filter_ok, item::ItemWriter};
//! use rowmap::item::csv::{
//!     csv_reader::CsvRecordReaderBuilder, csv_writer::CsvRecordWriterBuilder,
//! };
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Person {
//!     name: String,
//!     email: String,
//!     age: i64,
//! }
//!
//! rowmap::record!(Person {
//!     name => "Name",
//!     email => "Email",
//!     age => "Age",
//! });
//!
//! let input = "\
//! Name,Email,Age
//! Alice,alice@example.com,30
//! Bob,bob@example.com,25
//! ";
//!
//! let mut reader = CsvRecordReaderBuilder::new()
//!     .from_reader::<Person, _>(input.as_bytes())
//!     .unwrap();
//!
//! let adults: Vec<Person> = filter_ok(|p: &Person| p.age > 25, reader.records())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(adults.len(), 1);
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = CsvRecordWriterBuilder::new()
//!         .from_writer::<Person, _>(&mut buffer)
//!         .unwrap();
//!     writer.write_all(&adults).unwrap();
//! }
//!
//! assert_eq!(
//!     String::from_utf8(buffer).unwrap(),
//!     "Name,Email,Age\nAlice,alice@example.com,30\n"
//! );
//! ```

/// A module providing facilities for reading CSV records.
pub mod csv_reader;

/// A module providing facilities for writing CSV records.
pub mod csv_writer;
