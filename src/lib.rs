#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # rowmap

 Map CSV rows to strongly-typed records and back.

 `rowmap` turns each row of a CSV file into a plain Rust struct and each
 struct back into a row. Columns are matched by name through a field table
 declared once per record type, values are converted by a small codec that
 covers text, integers, floats, booleans and RFC 3339 timestamps, and any
 field type can take over its own conversion through custom hooks.

 ## Core Concepts

- **Record:** A struct with a statically declared field table, usually generated by the `record!` macro.
- **Field annotation:** `"Name,index=2"` sets the column name and position of a field; `"-"` leaves the field out.
- **RecordReader:** Reads one header row, maps it onto the record's columns, then decodes every following row lazily.
- **RecordWriter:** Writes the header row in resolved field order, then one flushed row per record.
- **Custom hooks:** `CsvUnmarshal` and `CsvMarshal` let a field type define its own text form.

 ## Features

| **Feature**   | **Description**                                               |
|---------------|---------------------------------------------------------------|
| csv           | Enables the CSV reader and writer built on the `csv` crate    |
| chrono        | Enables RFC 3339 timestamp fields (`chrono::DateTime`)        |
| full          | Enables all available features                                |

 ## Getting Started

```rust
# use rowmap::{
#     core::{
#         codec::{BoxError, CsvMarshal, CsvUnmarshal},
#         filter::filter_ok,
#         item::ItemWriter,
#     },
#     item::csv::{csv_reader::CsvRecordReaderBuilder, csv_writer::CsvRecordWriterBuilder},
#     MappingError,
# };
#[derive(Debug, Default, Clone, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

impl CsvUnmarshal for Point {
    fn unmarshal_csv(&mut self, text: &str) -> Result<(), BoxError> {
        let (x, y) = text.split_once(';').ok_or("expected 'x;y'")?;
        self.x = x.parse()?;
        self.y = y.parse()?;
        Ok(())
    }
}

impl CsvMarshal for Point {
    fn marshal_csv(&self) -> Result<String, BoxError> {
        Ok(format!("{:.2};{:.2}", self.x, self.y))
    }
}

rowmap::custom_field!(Point);

#[derive(Debug, Default, Clone, PartialEq)]
struct Place {
    name: String,
    location: Point,
    visits: u32,
}

rowmap::record!(Place {
    name => "Name",
    location => "Location,index=0",
    visits => "Visits",
});

fn main() -> Result<(), MappingError> {
    let input = "\
Name,Location,Visits
Home,1;2,12
Office,3.5;-1,0
";

    let mut reader = CsvRecordReaderBuilder::new().from_reader::<Place, _>(input.as_bytes())?;
    let visited: Vec<Place> =
        filter_ok(|place: &Place| place.visits > 0, reader.records()).collect::<Result<_, _>>()?;

    let mut output = Vec::new();
    {
        let mut writer = CsvRecordWriterBuilder::new().from_writer::<Place, _>(&mut output)?;
        writer.write_all(&visited)?;
    }

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "Location,Name,Visits\n1.00;2.00,Home,12\n"
    );

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

pub mod core;

pub mod error;

#[doc(inline)]
pub use error::*;

pub mod item;
