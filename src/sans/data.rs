//! States and conversions processing data records.

use alloc::{borrow::Cow, string::String, vec::Vec};

use thiserror::Error;

use super::{
    base_type::BaseType,
    definition::{FieldDefinition, LocalDefinition},
    header::RecordHeader,
    timestamp::{INVALID_TIMESTAMP, TIMESTAMP_FIELD, Timestamp},
};

/// An error advancing over a data record.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DataError {
    /// The supplied bytes do not match the size given by the definition.
    #[error("Expected {expected} data record bytes, found {found}.")]
    Length { expected: usize, found: usize },
}

/// A field that could not be decoded as its declared base type.
///
/// The field is kept as raw bytes, and decoding continues.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum FieldDecodeError {
    #[error("Unknown base type (0x{0:02X}).")]
    UnknownBaseType(u8),
    #[error("Field size ({size}) is not a multiple of the base type size ({base_size}).")]
    SizeMismatch { size: u8, base_size: u8 },
}

/// A single element of a field, converted to the Rust primitive of its base
/// type.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum Value {
    Enum(u8),
    Sint8(i8),
    Uint8(u8),
    Sint16(i16),
    Uint16(u16),
    Sint32(i32),
    Uint32(u32),
    Float32(f32),
    Float64(f64),
    Uint8z(u8),
    Uint16z(u16),
    Uint32z(u32),
    Sint64(i64),
    Uint64(u64),
    Uint64z(u64),
}

impl Value {
    /// The value as an unsigned integer, for unsigned base types.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Enum(x) | Value::Uint8(x) | Value::Uint8z(x) => Some(x.into()),
            Value::Uint16(x) | Value::Uint16z(x) => Some(x.into()),
            Value::Uint32(x) | Value::Uint32z(x) => Some(x.into()),
            Value::Uint64(x) | Value::Uint64z(x) => Some(x),
            _ => None,
        }
    }

    /// The value as a signed integer, for integer base types that fit.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Sint8(x) => Some(x.into()),
            Value::Sint16(x) => Some(x.into()),
            Value::Sint32(x) => Some(x.into()),
            Value::Sint64(x) => Some(x),
            Value::Float32(_) | Value::Float64(_) => None,
            _ => self.as_u64().and_then(|x| i64::try_from(x).ok()),
        }
    }

    /// The value as a floating point number.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Float32(x) => x.into(),
            Value::Float64(x) => x,
            Value::Sint8(x) => x.into(),
            Value::Sint16(x) => x.into(),
            Value::Sint32(x) => x.into(),
            Value::Sint64(x) => x as f64,
            _ => self.as_u64().unwrap_or_default() as f64,
        }
    }
}

/// The decoded content of a field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum FieldData<'a> {
    /// A field holding a single element.
    Scalar(Value),
    /// A field holding several elements of its base type.
    Array(Vec<Value>),
    /// A `string` field, up to its first zero byte.
    String(Cow<'a, str>),
    /// A `byte` field, or a field that could not be decoded.
    Bytes(&'a [u8]),
}

impl FieldData<'_> {
    /// The single element of a scalar field, or the first element of an
    /// array.
    pub fn first(&self) -> Option<&Value> {
        match self {
            FieldData::Scalar(x) => Some(x),
            FieldData::Array(xs) => xs.first(),
            FieldData::String(_) | FieldData::Bytes(_) => None,
        }
    }

    pub fn is_array(&self) -> bool {
        match self {
            FieldData::Array(_) => true,
            FieldData::Bytes(r) => r.len() > 1,
            FieldData::Scalar(_) | FieldData::String(_) => false,
        }
    }
}

/// A decoded field of a data record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldValue<'a> {
    /// Position of the field within its definition.
    pub index: usize,
    pub number: u8,
    pub size: u8,
    pub base_type_raw: u8,
    pub base_type: BaseType,
    pub raw: &'a [u8],
    pub value: FieldData<'a>,
    /// Whether the field holds nothing but 'invalid' marker values.
    pub invalid: bool,
    /// Positions of the elements holding the 'invalid' marker value.
    pub invalid_elements: Vec<usize>,
    pub decode_error: Option<FieldDecodeError>,
    /// The absolute timestamp held by a timestamp field.
    pub timestamp: Option<Timestamp>,
}

/// A developer field of a data record, kept as raw bytes.
///
/// The meaning of developer fields is described by separate messages in the
/// document, and is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeveloperFieldValue<'a> {
    /// Position of the field within the developer fields of its definition.
    pub index: usize,
    pub number: u8,
    pub size: u8,
    pub developer_data_index: u8,
    pub raw: &'a [u8],
}

/// State token to decode the fields of a data record.
#[derive(Debug)]
pub struct Data {
    pub(super) time_offset: Option<u8>,
}

impl Data {
    /// The time offset of a compressed timestamp header, if present.
    pub fn time_offset(&self) -> Option<u8> {
        self.time_offset
    }

    /// Transition to another state by decoding the fields of a data record.
    ///
    /// The bytes must be exactly those following the record header, as many
    /// as [`LocalDefinition::data_size`] gives.
    ///
    /// Returns the fields and developer fields, and a successor state token.
    pub fn advance<'a>(
        self,
        definition: &LocalDefinition,
        r: &'a [u8],
    ) -> Result<(Vec<FieldValue<'a>>, Vec<DeveloperFieldValue<'a>>, RecordHeader), DataError> {
        let expected = definition.data_size();
        let length = DataError::Length {
            expected,
            found: r.len(),
        };

        if r.len() != expected {
            Err(length)?;
        }

        let is_little_endian = definition.architecture.is_little_endian();
        let mut rest = r;

        let mut fields = Vec::with_capacity(definition.fields.len());
        for (index, field) in definition.fields.iter().enumerate() {
            let (raw, tail) = rest.split_at_checked(field.size as usize).ok_or(length)?;
            rest = tail;

            fields.push(decode_field(index, field, is_little_endian, raw));
        }

        let mut developer_fields = Vec::with_capacity(definition.developer_fields.len());
        for (index, field) in definition.developer_fields.iter().enumerate() {
            let (raw, tail) = rest.split_at_checked(field.size as usize).ok_or(length)?;
            rest = tail;

            developer_fields.push(DeveloperFieldValue {
                index,
                number: field.number,
                size: field.size,
                developer_data_index: field.developer_data_index,
                raw,
            });
        }

        Ok((fields, developer_fields, RecordHeader(())))
    }
}

/// Decode the bytes of a single field according to its definition.
///
/// Numeric fields are split into elements of their base type, each compared
/// against the type's 'invalid' marker value. Fields of an unknown base type,
/// or with a size that does not divide into elements, are kept as raw bytes
/// and annotated with a [`FieldDecodeError`].
pub fn decode_field<'a>(
    index: usize,
    definition: &FieldDefinition,
    is_little_endian: bool,
    raw: &'a [u8],
) -> FieldValue<'a> {
    let base_type = definition.base_type;

    let mut field = FieldValue {
        index,
        number: definition.number,
        size: definition.size,
        base_type_raw: definition.base_type_raw,
        base_type,
        raw,
        value: FieldData::Bytes(raw),
        invalid: false,
        invalid_elements: Vec::new(),
        decode_error: None,
        timestamp: None,
    };

    let decode: fn(&[u8], bool) -> Elements = match base_type {
        BaseType::Enum => elements::<Enum, 1>,
        BaseType::Sint8 => elements::<Sint8, 1>,
        BaseType::Uint8 => elements::<Uint8, 1>,
        BaseType::Sint16 => elements::<Sint16, 2>,
        BaseType::Uint16 => elements::<Uint16, 2>,
        BaseType::Sint32 => elements::<Sint32, 4>,
        BaseType::Uint32 => elements::<Uint32, 4>,
        BaseType::Float32 => elements::<Float32, 4>,
        BaseType::Float64 => elements::<Float64, 8>,
        BaseType::Uint8z => elements::<Uint8z, 1>,
        BaseType::Uint16z => elements::<Uint16z, 2>,
        BaseType::Uint32z => elements::<Uint32z, 4>,
        BaseType::Sint64 => elements::<Sint64, 8>,
        BaseType::Uint64 => elements::<Uint64, 8>,
        BaseType::Uint64z => elements::<Uint64z, 8>,

        BaseType::String => {
            let text = raw.split(|b| *b == 0).next().unwrap_or_default();
            field.value = FieldData::String(String::from_utf8_lossy(text));
            field.invalid = is_filled(raw, 0x00);
            return field;
        }
        BaseType::Byte => {
            field.invalid = is_filled(raw, 0xFF);
            return field;
        }
        BaseType::Unknown(code) => {
            field.decode_error = Some(FieldDecodeError::UnknownBaseType(code));
            return field;
        }
    };

    let base_size = base_type.size();
    if raw.len() % base_size != 0 {
        field.decode_error = Some(FieldDecodeError::SizeMismatch {
            size: definition.size,
            base_size: base_size as u8,
        });
        return field;
    }

    let (mut values, invalid_elements) = decode(raw, is_little_endian);

    field.invalid = invalid_elements.len() == values.len();
    field.invalid_elements = invalid_elements;
    field.value = match values.len() {
        1 => FieldData::Scalar(values.remove(0)),
        _ => FieldData::Array(values),
    };

    if definition.number == TIMESTAMP_FIELD {
        field.timestamp = match field.value.first() {
            Some(Value::Uint32(x)) if *x != INVALID_TIMESTAMP => Some(Timestamp(*x)),
            _ => None,
        };
    }

    field
}

/// Whether a non-empty span consists of a single repeated byte.
fn is_filled(r: &[u8], b: u8) -> bool {
    !r.is_empty() && r.iter().all(|x| *x == b)
}

/// Decoded elements, and the positions of those that were invalid.
type Elements = (Vec<Value>, Vec<usize>);

fn elements<T: FieldInner<From = [u8; N]>, const N: usize>(r: &[u8], is_le: bool) -> Elements {
    let (chunks, _) = r.as_chunks::<N>();
    let mut invalid = Vec::new();

    let values = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let (value, is_invalid) = T::from(*chunk, is_le);
            if is_invalid {
                invalid.push(i);
            }
            value
        })
        .collect();

    (values, invalid)
}

pub trait FieldInner {
    /// The data storing this base type.
    type From;

    /// Convert data of this base type to a value, and whether it held the
    /// 'invalid' marker value.
    fn from(r: Self::From, is_le: bool) -> (Value, bool);
}

macro_rules! field_inner {
    ($t:ident, $into:ident, $invalid:ident, $(#[$attr:meta])*) => {
        $(#[$attr])*
        #[derive(Debug)]
        pub struct $t;

        impl FieldInner for $t {
            type From = [u8; size_of::<$into>()];

            fn from(r: Self::From, is_le: bool) -> (Value, bool) {
                let x = if is_le {
                    $into::from_le_bytes(r)
                } else {
                    $into::from_be_bytes(r)
                };

                (Value::$t(x), x == $into::$invalid)
            }
        }
    };
    (float $t:ident, $into:ident, $bits:ident, $(#[$attr:meta])*) => {
        $(#[$attr])*
        #[derive(Debug)]
        pub struct $t;

        impl FieldInner for $t {
            type From = [u8; size_of::<$bits>()];

            fn from(r: Self::From, is_le: bool) -> (Value, bool) {
                let bits = if is_le {
                    $bits::from_le_bytes(r)
                } else {
                    $bits::from_be_bytes(r)
                };

                (Value::$t($into::from_bits(bits)), bits == $bits::MAX)
            }
        }
    };
}

field_inner!(Enum, u8, MAX, /** `enum` */);
field_inner!(Uint8, u8, MAX, /** `uint8` */);
field_inner!(Uint8z, u8, MIN, /** `uint8z` */);
field_inner!(Uint16, u16, MAX, /** `uint16` */);
field_inner!(Uint16z, u16, MIN, /** `uint16z` */);
field_inner!(Uint32, u32, MAX, /** `uint32` */);
field_inner!(Uint32z, u32, MIN, /** `uint32z` */);
field_inner!(Uint64, u64, MAX, /** `uint64` */);
field_inner!(Uint64z, u64, MIN, /** `uint64z` */);

field_inner!(Sint8, i8, MAX, /** `sint8` */);
field_inner!(Sint16, i16, MAX, /** `sint16` */);
field_inner!(Sint32, i32, MAX, /** `sint32` */);
field_inner!(Sint64, i64, MAX, /** `sint64` */);

field_inner!(float Float32, f32, u32, /** `float32` */);
field_inner!(float Float64, f64, u64, /** `float64` */);
