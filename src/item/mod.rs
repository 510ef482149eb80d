#[cfg(feature = "csv")]
/// This module provides a CSV record reader and writer backed by the `csv` crate.
pub mod csv;
