//! Conversion of single cells between text and typed field values.
//!
//! Every mappable field type implements [`Field`], which hands the codec a
//! typed view of the value: a mutable [`Slot`] when decoding and a borrowed
//! [`Value`] when encoding. The codec then dispatches in a fixed order:
//!
//! 1. custom hooks ([`CsvUnmarshal`] / [`CsvMarshal`]), whose result is final
//! 2. timestamps (RFC 3339, feature `chrono`)
//! 3. primitive kinds: text, integers, floats, booleans
//! 4. anything else fails with [`CodecError::UnsupportedType`]
//!
//! # Custom hooks
//!
//! ```
//! use rowmap::core::codec::{self, BoxError, CsvMarshal, CsvUnmarshal};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: f64,
//!     y: f64,
//! }
//!
//! impl CsvUnmarshal for Point {
//!     fn unmarshal_csv(&mut self, text: &str) -> Result<(), BoxError> {
//!         let (x, y) = text.split_once(';').ok_or("expected 'x;y'")?;
//!         self.x = x.parse()?;
//!         self.y = y.parse()?;
//!         Ok(())
//!     }
//! }
//!
//! impl CsvMarshal for Point {
//!     fn marshal_csv(&self) -> Result<String, BoxError> {
//!         Ok(format!("{:.2};{:.2}", self.x, self.y))
//!     }
//! }
//!
//! rowmap::custom_field!(Point);
//!
//! let mut point = Point::default();
//! codec::decode(&mut point, "1;2").unwrap();
//! assert_eq!(point, Point { x: 1.0, y: 2.0 });
//! assert_eq!(codec::encode(&point).unwrap(), "1.00;2.00");
//! ```

use std::{any::type_name, error::Error, fmt::Display, str::FromStr};

use thiserror::Error;

#[cfg(feature = "chrono")]
use chrono::{DateTime, FixedOffset, SecondsFormat, Timelike, Utc};

/// Error type returned by custom hooks and carried by format failures.
pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Error, Debug)]
/// Failure converting a single cell.
pub enum CodecError {
    #[error("{0}")]
    Format(BoxError),

    #[error("unsupported type {0}")]
    UnsupportedType(&'static str),
}

/// Custom decode hook. When a field type implements it (through
/// [`custom_field!`](crate::custom_field)), no built-in rule is consulted.
pub trait CsvUnmarshal {
    fn unmarshal_csv(&mut self, text: &str) -> Result<(), BoxError>;
}

/// Custom encode hook, the mirror of [`CsvUnmarshal`].
pub trait CsvMarshal {
    fn marshal_csv(&self) -> Result<String, BoxError>;
}

/// Broad category of a field type, as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Custom,
    Timestamp,
    Text,
    SignedInt,
    UnsignedInt,
    Float,
    Bool,
    Unsupported,
}

/// Runtime handle on a field's type: its name for diagnostics and its kind
/// for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeHandle {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl TypeHandle {
    pub fn of<F: Field>() -> Self {
        TypeHandle {
            name: type_name::<F>(),
            kind: F::KIND,
        }
    }

    /// Derives the handle from a field accessor, so a field table can be
    /// declared without spelling out field types.
    pub fn of_field<T, F: Field>(_accessor: impl Fn(&T) -> &F) -> Self {
        Self::of::<F>()
    }
}

/// Mutable typed view of a field, used by [`decode`].
pub enum Slot<'a> {
    Custom(&'a mut dyn CsvUnmarshal),
    #[cfg(feature = "chrono")]
    Timestamp(&'a mut DateTime<Utc>),
    #[cfg(feature = "chrono")]
    OffsetTimestamp(&'a mut DateTime<FixedOffset>),
    Text(&'a mut String),
    Int(IntSlot<'a>),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Bool(&'a mut bool),
    Unsupported(&'static str),
}

/// Integer targets, one per width so overflow is checked against the
/// field's own bounds.
pub enum IntSlot<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    I128(&'a mut i128),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    U128(&'a mut u128),
    Usize(&'a mut usize),
}

/// Borrowed typed view of a field, used by [`encode`].
pub enum Value<'a> {
    Custom(&'a dyn CsvMarshal),
    #[cfg(feature = "chrono")]
    Timestamp(DateTime<Utc>),
    Text(&'a str),
    Signed(i128),
    Unsigned(u128),
    F32(f32),
    F64(f64),
    Bool(bool),
    Unsupported(&'static str),
}

/// A type that can be stored in a mapped record field.
pub trait Field {
    const KIND: FieldKind;

    fn slot(&mut self) -> Slot<'_>;

    fn value(&self) -> Value<'_>;
}

/// Decodes `text` into `target`.
pub fn decode<F: Field>(target: &mut F, text: &str) -> Result<(), CodecError> {
    match target.slot() {
        Slot::Custom(hook) => hook.unmarshal_csv(text).map_err(CodecError::Format),
        #[cfg(feature = "chrono")]
        Slot::Timestamp(slot) => {
            *slot = parse_rfc3339(text)?.with_timezone(&Utc);
            Ok(())
        }
        #[cfg(feature = "chrono")]
        Slot::OffsetTimestamp(slot) => {
            *slot = parse_rfc3339(text)?;
            Ok(())
        }
        Slot::Text(slot) => {
            slot.clear();
            slot.push_str(text);
            Ok(())
        }
        Slot::Int(slot) => decode_int(slot, text),
        Slot::F32(slot) => parse_into(slot, text, "f32"),
        Slot::F64(slot) => parse_into(slot, text, "f64"),
        Slot::Bool(slot) => {
            *slot = parse_bool(text)?;
            Ok(())
        }
        Slot::Unsupported(name) => Err(CodecError::UnsupportedType(name)),
    }
}

/// Encodes `source` to its text form.
pub fn encode<F: Field>(source: &F) -> Result<String, CodecError> {
    match source.value() {
        Value::Custom(hook) => hook.marshal_csv().map_err(CodecError::Format),
        #[cfg(feature = "chrono")]
        Value::Timestamp(value) => Ok(value.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::Text(value) => Ok(value.to_string()),
        Value::Signed(value) => Ok(value.to_string()),
        Value::Unsigned(value) => Ok(value.to_string()),
        // Display prints the shortest representation that parses back exactly.
        Value::F32(value) => Ok(value.to_string()),
        Value::F64(value) => Ok(value.to_string()),
        Value::Bool(value) => Ok(value.to_string()),
        Value::Unsupported(name) => Err(CodecError::UnsupportedType(name)),
    }
}

fn parse_into<T>(slot: &mut T, text: &str, kind: &str) -> Result<(), CodecError>
where
    T: FromStr,
    T::Err: Display,
{
    *slot = text.parse().map_err(|error| {
        CodecError::Format(format!("cannot parse '{text}' as {kind}: {error}").into())
    })?;
    Ok(())
}

fn decode_int(slot: IntSlot<'_>, text: &str) -> Result<(), CodecError> {
    match slot {
        IntSlot::I8(slot) => parse_into(slot, text, "i8"),
        IntSlot::I16(slot) => parse_into(slot, text, "i16"),
        IntSlot::I32(slot) => parse_into(slot, text, "i32"),
        IntSlot::I64(slot) => parse_into(slot, text, "i64"),
        IntSlot::I128(slot) => parse_into(slot, text, "i128"),
        IntSlot::Isize(slot) => parse_into(slot, text, "isize"),
        IntSlot::U8(slot) => parse_into(slot, text, "u8"),
        IntSlot::U16(slot) => parse_into(slot, text, "u16"),
        IntSlot::U32(slot) => parse_into(slot, text, "u32"),
        IntSlot::U64(slot) => parse_into(slot, text, "u64"),
        IntSlot::U128(slot) => parse_into(slot, text, "u128"),
        IntSlot::Usize(slot) => parse_into(slot, text, "usize"),
    }
}

fn parse_bool(text: &str) -> Result<bool, CodecError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CodecError::Format(
            format!("cannot parse '{text}' as bool").into(),
        )),
    }
}

/// Fixed timestamp profile: `T` separator, optional fraction, numeric offset.
#[cfg(feature = "chrono")]
const RFC3339_PROFILE: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Parses `text` against [`RFC3339_PROFILE`], also accepting an upper-case
/// `Z` for UTC. Lower-case separators, whitespace and leap seconds fail.
#[cfg(feature = "chrono")]
fn parse_rfc3339(text: &str) -> Result<DateTime<FixedOffset>, CodecError> {
    let invalid = |reason: &dyn Display| {
        CodecError::Format(format!("cannot parse '{text}' as RFC 3339 timestamp: {reason}").into())
    };

    if text.as_bytes().get(10) != Some(&b'T') || text.contains(char::is_whitespace) {
        return Err(invalid(&"expected 'YYYY-MM-DDThh:mm:ss' with an offset"));
    }

    let parsed = match text.strip_suffix('Z') {
        Some(local) => DateTime::parse_from_str(&format!("{local}+00:00"), RFC3339_PROFILE),
        None => DateTime::parse_from_str(text, RFC3339_PROFILE),
    }
    .map_err(|error| invalid(&error))?;

    // chrono stores second 60 as an overflowing nanosecond count
    if parsed.nanosecond() >= 1_000_000_000 {
        return Err(invalid(&"leap second is out of range"));
    }
    Ok(parsed)
}

/// Implements [`Field`] for a type that provides both [`CsvUnmarshal`] and
/// [`CsvMarshal`].
///
/// A type with only one hook uses `custom_field!(unmarshal Ty)` or
/// `custom_field!(marshal Ty)`; the missing direction fails with
/// [`CodecError::UnsupportedType`].
///
/// ```
/// use rowmap::core::codec::{self, BoxError, CodecError, CsvUnmarshal};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Level(u8);
///
/// impl CsvUnmarshal for Level {
///     fn unmarshal_csv(&mut self, text: &str) -> Result<(), BoxError> {
///         self.0 = text.trim_start_matches('L').parse()?;
///         Ok(())
///     }
/// }
///
/// rowmap::custom_field!(unmarshal Level);
///
/// let mut level = Level::default();
/// codec::decode(&mut level, "L3").unwrap();
/// assert_eq!(level, Level(3));
/// assert!(matches!(codec::encode(&level), Err(CodecError::UnsupportedType(_))));
/// ```
#[macro_export]
macro_rules! custom_field {
    (unmarshal $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::core::codec::Field for $ty {
                const KIND: $crate::core::codec::FieldKind = $crate::core::codec::FieldKind::Custom;

                fn slot(&mut self) -> $crate::core::codec::Slot<'_> {
                    $crate::core::codec::Slot::Custom(self)
                }

                fn value(&self) -> $crate::core::codec::Value<'_> {
                    $crate::core::codec::Value::Unsupported(::std::any::type_name::<Self>())
                }
            }
        )+
    };
    (marshal $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::core::codec::Field for $ty {
                const KIND: $crate::core::codec::FieldKind = $crate::core::codec::FieldKind::Custom;

                fn slot(&mut self) -> $crate::core::codec::Slot<'_> {
                    $crate::core::codec::Slot::Unsupported(::std::any::type_name::<Self>())
                }

                fn value(&self) -> $crate::core::codec::Value<'_> {
                    $crate::core::codec::Value::Custom(self)
                }
            }
        )+
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::core::codec::Field for $ty {
                const KIND: $crate::core::codec::FieldKind = $crate::core::codec::FieldKind::Custom;

                fn slot(&mut self) -> $crate::core::codec::Slot<'_> {
                    $crate::core::codec::Slot::Custom(self)
                }

                fn value(&self) -> $crate::core::codec::Value<'_> {
                    $crate::core::codec::Value::Custom(self)
                }
            }
        )+
    };
}

macro_rules! int_field {
    ($($ty:ty => $variant:ident, $kind:ident, $value:ident as $wide:ty;)+) => {
        $(
            impl Field for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn slot(&mut self) -> Slot<'_> {
                    Slot::Int(IntSlot::$variant(self))
                }

                fn value(&self) -> Value<'_> {
                    Value::$value(*self as $wide)
                }
            }
        )+
    };
}

int_field! {
    i8 => I8, SignedInt, Signed as i128;
    i16 => I16, SignedInt, Signed as i128;
    i32 => I32, SignedInt, Signed as i128;
    i64 => I64, SignedInt, Signed as i128;
    i128 => I128, SignedInt, Signed as i128;
    isize => Isize, SignedInt, Signed as i128;
    u8 => U8, UnsignedInt, Unsigned as u128;
    u16 => U16, UnsignedInt, Unsigned as u128;
    u32 => U32, UnsignedInt, Unsigned as u128;
    u64 => U64, UnsignedInt, Unsigned as u128;
    u128 => U128, UnsignedInt, Unsigned as u128;
    usize => Usize, UnsignedInt, Unsigned as u128;
}

impl Field for String {
    const KIND: FieldKind = FieldKind::Text;

    fn slot(&mut self) -> Slot<'_> {
        Slot::Text(self)
    }

    fn value(&self) -> Value<'_> {
        Value::Text(self)
    }
}

impl Field for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn slot(&mut self) -> Slot<'_> {
        Slot::F32(self)
    }

    fn value(&self) -> Value<'_> {
        Value::F32(*self)
    }
}

impl Field for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn slot(&mut self) -> Slot<'_> {
        Slot::F64(self)
    }

    fn value(&self) -> Value<'_> {
        Value::F64(*self)
    }
}

impl Field for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn slot(&mut self) -> Slot<'_> {
        Slot::Bool(self)
    }

    fn value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

#[cfg(feature = "chrono")]
impl Field for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Timestamp;

    fn slot(&mut self) -> Slot<'_> {
        Slot::Timestamp(self)
    }

    fn value(&self) -> Value<'_> {
        Value::Timestamp(*self)
    }
}

#[cfg(feature = "chrono")]
impl Field for DateTime<FixedOffset> {
    const KIND: FieldKind = FieldKind::Timestamp;

    fn slot(&mut self) -> Slot<'_> {
        Slot::OffsetTimestamp(self)
    }

    fn value(&self) -> Value<'_> {
        Value::Timestamp(self.with_timezone(&Utc))
    }
}

// Collections have no single-cell text form.
impl<T> Field for Vec<T> {
    const KIND: FieldKind = FieldKind::Unsupported;

    fn slot(&mut self) -> Slot<'_> {
        Slot::Unsupported(type_name::<Self>())
    }

    fn value(&self) -> Value<'_> {
        Value::Unsupported(type_name::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Text type whose hooks upper-case on the way in and tag on the way out.
    #[derive(Debug, Default, PartialEq)]
    struct Shout(String);

    impl CsvUnmarshal for Shout {
        fn unmarshal_csv(&mut self, text: &str) -> Result<(), BoxError> {
            if text.is_empty() {
                return Err("empty shout".into());
            }
            self.0 = text.to_uppercase();
            Ok(())
        }
    }

    impl CsvMarshal for Shout {
        fn marshal_csv(&self) -> Result<String, BoxError> {
            Ok(format!("{}!", self.0))
        }
    }

    crate::custom_field!(Shout);

    #[test]
    fn text_should_pass_through_untrimmed() {
        let mut value = String::from("previous");
        decode(&mut value, "  padded ").unwrap();
        assert_eq!(value, "  padded ");
        assert_eq!(encode(&value).unwrap(), "  padded ");
    }

    #[test]
    fn integers_should_respect_their_own_bounds() {
        let mut small = 0i8;
        decode(&mut small, "-128").unwrap();
        assert_eq!(small, -128);
        assert!(matches!(decode(&mut small, "128"), Err(CodecError::Format(_))));

        let mut unsigned = 0u16;
        assert!(matches!(decode(&mut unsigned, "-1"), Err(CodecError::Format(_))));
        decode(&mut unsigned, "65535").unwrap();
        assert_eq!(encode(&unsigned).unwrap(), "65535");

        let mut wide = 0i64;
        assert!(matches!(decode(&mut wide, "12.5"), Err(CodecError::Format(_))));
        assert!(matches!(decode(&mut wide, " 12"), Err(CodecError::Format(_))));
        decode(&mut wide, "-42").unwrap();
        assert_eq!(encode(&wide).unwrap(), "-42");
    }

    #[test]
    fn floats_should_encode_shortest_round_trip_form() {
        let mut value = 0f64;
        decode(&mut value, "98.6").unwrap();
        assert_eq!(value, 98.6);
        assert_eq!(encode(&value).unwrap(), "98.6");
        assert_eq!(encode(&0.1f64).unwrap(), "0.1");
        assert_eq!(encode(&3.0f64).unwrap(), "3");
        assert_eq!(encode(&0.1f32).unwrap(), "0.1");

        let error = decode(&mut value, "1,5").unwrap_err();
        assert!(error.to_string().contains("'1,5'"));
    }

    #[test]
    fn booleans_should_accept_canonical_tokens() {
        let mut value = false;
        for token in ["1", "t", "T", "TRUE", "true", "True"] {
            decode(&mut value, token).unwrap();
            assert!(value, "{token}");
        }
        for token in ["0", "f", "F", "FALSE", "false", "False"] {
            decode(&mut value, token).unwrap();
            assert!(!value, "{token}");
        }
        assert!(matches!(decode(&mut value, "yes"), Err(CodecError::Format(_))));
        assert_eq!(encode(&true).unwrap(), "true");
        assert_eq!(encode(&false).unwrap(), "false");
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn timestamps_should_use_rfc3339() {
        use chrono::TimeZone;

        let mut value = DateTime::<Utc>::default();
        decode(&mut value, "2023-01-02T15:04:05Z").unwrap();
        assert_eq!(value, Utc.with_ymd_and_hms(2023, 1, 2, 15, 4, 5).unwrap());
        assert_eq!(encode(&value).unwrap(), "2023-01-02T15:04:05Z");

        decode(&mut value, "2023-06-15T11:30:00+02:00").unwrap();
        assert_eq!(encode(&value).unwrap(), "2023-06-15T09:30:00Z");

        decode(&mut value, "2023-06-15T09:30:00.250Z").unwrap();
        assert_eq!(value.timestamp_subsec_millis(), 250);

        for text in [
            "2023-01-02",
            "2023-01-02 15:04:05",
            "2023-01-02 15:04:05Z",
            "2023-01-02t15:04:05z",
            "2023-01-02T15:04:05z",
            "2023-01-02T15:04:60Z",
            "2023-01-02T15:04:05",
            " 2023-01-02T15:04:05Z",
        ] {
            assert!(
                matches!(decode(&mut value, text), Err(CodecError::Format(_))),
                "{text}"
            );
        }

        let mut zoned = DateTime::<FixedOffset>::default();
        decode(&mut zoned, "2023-06-15T11:30:00+02:00").unwrap();
        assert_eq!(zoned.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(encode(&zoned).unwrap(), "2023-06-15T09:30:00Z");
    }

    #[test]
    fn custom_hooks_should_take_precedence() {
        assert_eq!(TypeHandle::of::<Shout>().kind, FieldKind::Custom);

        let mut value = Shout::default();
        decode(&mut value, "hello").unwrap();
        assert_eq!(value, Shout("HELLO".to_string()));
        assert_eq!(encode(&value).unwrap(), "HELLO!");

        let error = decode(&mut value, "").unwrap_err();
        assert_eq!(error.to_string(), "empty shout");
    }

    #[test]
    fn one_sided_hooks_should_leave_other_direction_unsupported() {
        #[derive(Debug, Default, PartialEq)]
        struct Inbound(String);

        impl CsvUnmarshal for Inbound {
            fn unmarshal_csv(&mut self, text: &str) -> Result<(), BoxError> {
                self.0 = text.to_lowercase();
                Ok(())
            }
        }

        #[derive(Debug, Default, PartialEq)]
        struct Outbound(u8);

        impl CsvMarshal for Outbound {
            fn marshal_csv(&self) -> Result<String, BoxError> {
                Ok(format!("#{}", self.0))
            }
        }

        crate::custom_field!(unmarshal Inbound);
        crate::custom_field!(marshal Outbound);

        let mut inbound = Inbound::default();
        decode(&mut inbound, "MiXeD").unwrap();
        assert_eq!(inbound, Inbound("mixed".to_string()));
        assert!(matches!(
            encode(&inbound),
            Err(CodecError::UnsupportedType(name)) if name.ends_with("Inbound")
        ));

        let mut outbound = Outbound(7);
        assert_eq!(encode(&outbound).unwrap(), "#7");
        assert!(matches!(
            decode(&mut outbound, "#8"),
            Err(CodecError::UnsupportedType(name)) if name.ends_with("Outbound")
        ));
        assert_eq!(outbound, Outbound(7));
        assert_eq!(TypeHandle::of::<Inbound>().kind, FieldKind::Custom);
    }

    #[test]
    fn collections_should_be_unsupported() {
        let mut tags: Vec<String> = Vec::new();
        assert!(matches!(
            decode(&mut tags, "a;b"),
            Err(CodecError::UnsupportedType(name)) if name.contains("Vec")
        ));
        assert!(matches!(encode(&tags), Err(CodecError::UnsupportedType(_))));
        assert_eq!(TypeHandle::of::<Vec<u8>>().kind, FieldKind::Unsupported);
    }

    #[test]
    fn type_handle_should_follow_accessor() {
        struct Row {
            age: u32,
        }
        let handle = TypeHandle::of_field(|row: &Row| &row.age);
        assert_eq!(handle, TypeHandle { name: "u32", kind: FieldKind::UnsignedInt });
    }
}
