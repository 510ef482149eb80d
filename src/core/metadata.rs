//! Resolution of a record type's field table into ordered column
//! descriptors.
//!
//! Each field carries an annotation of comma-separated components. The first
//! component is the column name (empty means the field identifier, `-` skips
//! the field); the remaining components are `key=value` pairs, of which only
//! `index` is recognized. Fields with an explicit `index` keep it; the others
//! are numbered in declaration order starting just above the highest explicit
//! index. The result is stable-sorted by ordinal.

use log::debug;

use crate::{
    core::{
        codec::TypeHandle,
        record::{FieldDecl, Record},
    },
    error::MappingError,
};

/// Name component that excludes a field from mapping.
pub const SKIP_SENTINEL: &str = "-";

/// Parsed form of a field annotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldTag {
    /// Column name, `None` when the annotation leaves it empty.
    pub name: Option<String>,
    pub skip: bool,
    pub index: Option<usize>,
}

/// Parses the annotation `tag` declared on the field `ident`.
///
/// Unknown keys are ignored. A malformed `index` value is a
/// [`MappingError::Configuration`].
pub fn parse_tag(ident: &str, tag: &str) -> Result<FieldTag, MappingError> {
    let mut components = tag.split(',');
    let name = components.next().unwrap_or_default();

    let mut parsed = FieldTag {
        name: (!name.is_empty()).then(|| name.to_string()),
        skip: name == SKIP_SENTINEL,
        index: None,
    };
    if parsed.skip {
        return Ok(parsed);
    }

    for component in components {
        let Some((key, value)) = component.split_once('=') else {
            continue;
        };
        if key.trim() != "index" {
            continue;
        }

        let value = value.trim();
        let index = value.parse::<usize>().map_err(|error| {
            MappingError::Configuration(format!(
                "invalid index value '{value}' in field '{ident}': {error}"
            ))
        })?;
        parsed.index = Some(index);
    }

    Ok(parsed)
}

/// A mapped field with its resolved column name and position.
pub struct FieldDescriptor<T> {
    name: String,
    ordinal: usize,
    explicit: bool,
    decl: FieldDecl<T>,
}

impl<T> FieldDescriptor<T> {
    /// Declared column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Whether the ordinal came from an `index=` annotation.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn ident(&self) -> &'static str {
        self.decl.ident
    }

    pub fn type_handle(&self) -> TypeHandle {
        self.decl.type_handle
    }

    /// Decodes `text` into this field of `record`.
    pub fn decode(&self, record: &mut T, text: &str) -> Result<(), MappingError> {
        (self.decl.decode)(record, text).map_err(|error| MappingError::from_codec(&self.name, error))
    }

    /// Encodes this field of `record`.
    pub fn encode(&self, record: &T) -> Result<String, MappingError> {
        (self.decl.encode)(record).map_err(|error| MappingError::from_codec(&self.name, error))
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ordinal", &self.ordinal)
            .field("explicit", &self.explicit)
            .field("ident", &self.decl.ident)
            .finish()
    }
}

/// Resolves the field table of `T` into descriptors sorted by ordinal.
pub fn resolve<T: Record>() -> Result<Vec<FieldDescriptor<T>>, MappingError> {
    resolve_fields(T::fields(), std::any::type_name::<T>())
}

/// Resolves an explicit field table. `record_name` only feeds diagnostics.
pub fn resolve_fields<T>(
    decls: Vec<FieldDecl<T>>,
    record_name: &str,
) -> Result<Vec<FieldDescriptor<T>>, MappingError> {
    if decls.is_empty() {
        return Err(MappingError::Configuration(format!(
            "record type {record_name} declares no fields"
        )));
    }

    let mut fields = Vec::with_capacity(decls.len());
    let mut max_explicit: Option<usize> = None;

    for decl in decls {
        let tag = parse_tag(decl.ident, decl.tag)?;
        if tag.skip {
            debug!("Skipping field {}.{}", record_name, decl.ident);
            continue;
        }

        if let Some(index) = tag.index {
            max_explicit = Some(max_explicit.map_or(index, |max| max.max(index)));
        }

        fields.push(FieldDescriptor {
            name: tag.name.unwrap_or_else(|| decl.ident.to_string()),
            ordinal: tag.index.unwrap_or_default(),
            explicit: tag.index.is_some(),
            decl,
        });
    }

    let mut next = max_explicit.map_or(0, |max| max + 1);
    for field in fields.iter_mut().filter(|field| !field.explicit) {
        field.ordinal = next;
        next += 1;
    }

    // sort_by_key is stable, so equal explicit ordinals keep declaration order
    fields.sort_by_key(|field| field.ordinal);

    debug!(
        "Resolved {} fields for {}: {:?}",
        fields.len(),
        record_name,
        fields.iter().map(|field| field.name.as_str()).collect::<Vec<_>>()
    );

    Ok(fields)
}
