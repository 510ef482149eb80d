/// Pull and push abstractions, and the row boundary to a tokenizer.
pub mod item;

/// Statically declared field tables for record types.
pub mod record;

/// Resolution of field tables into ordered column descriptors.
pub mod metadata;

/// Text to typed value conversion.
pub mod codec;

pub mod filter;

/// Row to record decoding.
pub mod reader;

/// Record to row encoding.
pub mod writer;
