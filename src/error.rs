use thiserror::Error;

use crate::core::codec::{BoxError, CodecError};

#[derive(Error, Debug)]
/// Mapping error
pub enum MappingError {
    /// The record type cannot be mapped, e.g. a malformed `index=` annotation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No header row could be obtained when building a reader.
    #[error("header error: {0}")]
    Header(String),

    /// A cell could not be converted to or from the field's type.
    #[error("invalid value for field '{field}': {source}")]
    Format {
        field: String,
        #[source]
        source: BoxError,
    },

    /// The field's type has no coercion rule and no custom hook.
    #[error("unsupported type {type_name} for field '{field}'")]
    UnsupportedType {
        field: String,
        type_name: &'static str,
    },

    #[cfg(feature = "csv")]
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MappingError {
    /// Attaches the declared column name to a codec failure.
    pub fn from_codec(field: &str, error: CodecError) -> Self {
        match error {
            CodecError::Format(source) => MappingError::Format {
                field: field.to_string(),
                source,
            },
            CodecError::UnsupportedType(type_name) => MappingError::UnsupportedType {
                field: field.to_string(),
                type_name,
            },
        }
    }

    /// Returns `true` for the per-cell kinds (`Format`, `UnsupportedType`).
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            MappingError::Format { .. } | MappingError::UnsupportedType { .. }
        )
    }
}
