use std::fmt;

use crate::core::codec::{CodecError, TypeHandle};

/// One entry of a record type's field table.
///
/// `tag` uses the annotation syntax understood by
/// [`metadata::parse_tag`](crate::core::metadata::parse_tag):
/// `"Name,index=2"`, `",index=0"`, `"-"` or `""`.
pub struct FieldDecl<T> {
    /// The field's own identifier, used when the tag names no column.
    pub ident: &'static str,
    pub tag: &'static str,
    pub type_handle: TypeHandle,
    pub decode: fn(&mut T, &str) -> Result<(), CodecError>,
    pub encode: fn(&T) -> Result<String, CodecError>,
}

impl<T> Clone for FieldDecl<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldDecl<T> {}

impl<T> fmt::Debug for FieldDecl<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("ident", &self.ident)
            .field("tag", &self.tag)
            .field("type_handle", &self.type_handle)
            .finish()
    }
}

/// A structured type whose fields can be mapped to CSV columns.
///
/// The field table is declared statically, in declaration order, usually
/// through the [`record!`](crate::record) macro. `Default` supplies the zero
/// value used for columns missing from a row.
pub trait Record: Default {
    fn fields() -> Vec<FieldDecl<Self>>;
}

/// Implements [`Record`] for a struct by listing its fields in declaration
/// order, each with an optional annotation.
///
/// ```
/// #[derive(Debug, Default)]
/// struct Person {
///     name: String,
///     email: String,
///     age: i64,
///     internal_id: u64,
/// }
///
/// rowmap::record!(Person {
///     name => "Name",
///     email => "Email,index=0",
///     age => "Age",
///     internal_id => "-",
/// });
/// ```
#[macro_export]
macro_rules! record {
    (@tag) => {
        ""
    };
    (@tag $tag:literal) => {
        $tag
    };
    ($record:ty { $($field:ident $(=> $tag:literal)?),* $(,)? }) => {
        impl $crate::core::record::Record for $record {
            fn fields() -> ::std::vec::Vec<$crate::core::record::FieldDecl<Self>> {
                ::std::vec![
                    $(
                        $crate::core::record::FieldDecl {
                            ident: ::std::stringify!($field),
                            tag: $crate::record!(@tag $($tag)?),
                            type_handle: $crate::core::codec::TypeHandle::of_field(
                                |record: &Self| &record.$field,
                            ),
                            decode: |record: &mut Self, text: &str| {
                                $crate::core::codec::decode(&mut record.$field, text)
                            },
                            encode: |record: &Self| $crate::core::codec::encode(&record.$field),
                        }
                    ),*
                ]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::Record;
    use crate::core::codec::FieldKind;

    #[derive(Debug, Default, PartialEq)]
    struct Car {
        year: u16,
        make: String,
        price: f64,
    }

    crate::record!(Car {
        year => "Year,index=1",
        make,
        price => "-",
    });

    #[test]
    fn field_table_should_follow_declaration_order() {
        let fields = Car::fields();
        let idents: Vec<&str> = fields.iter().map(|field| field.ident).collect();
        assert_eq!(idents, vec!["year", "make", "price"]);

        assert_eq!(fields[0].tag, "Year,index=1");
        assert_eq!(fields[1].tag, "");
        assert_eq!(fields[2].tag, "-");
        assert_eq!(fields[0].type_handle.kind, FieldKind::UnsignedInt);
        assert_eq!(fields[1].type_handle.kind, FieldKind::Text);
    }

    #[test]
    fn field_table_should_decode_and_encode_through_the_record() {
        let fields = Car::fields();
        let mut car = Car::default();

        (fields[0].decode)(&mut car, "2011").unwrap();
        (fields[1].decode)(&mut car, "Peugeot").unwrap();
        (fields[2].decode)(&mut car, "12000.5").unwrap();

        assert_eq!(
            car,
            Car {
                year: 2011,
                make: "Peugeot".to_string(),
                price: 12000.5,
            }
        );
        assert_eq!((fields[2].encode)(&car).unwrap(), "12000.5");
        assert!((fields[0].decode)(&mut car, "MMXI").is_err());
    }
}
