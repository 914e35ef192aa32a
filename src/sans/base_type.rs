//! Catalog of field base types.

/// The primitive encoding of a field, resolved from the base type byte of a
/// field definition.
///
/// Only the low five bits of the byte identify the type; the high bit marks
/// types with more than one byte (and therefore a byte order) and is ignored.
/// Codes outside the catalog are kept as [`BaseType::Unknown`], so that the
/// field can still be passed through as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum BaseType {
    Enum,
    Sint8,
    Uint8,
    Sint16,
    Uint16,
    Sint32,
    Uint32,
    String,
    Float32,
    Float64,
    Uint8z,
    Uint16z,
    Uint32z,
    Byte,
    Sint64,
    Uint64,
    Uint64z,
    /// A code outside the catalog, holding the low five bits.
    Unknown(u8),
}

impl BaseType {
    /// Resolve the base type byte of a field definition.
    pub fn from_raw(r: u8) -> Self {
        match r & 0x1F {
            0x00 => BaseType::Enum,
            0x01 => BaseType::Sint8,
            0x02 => BaseType::Uint8,
            0x03 => BaseType::Sint16,
            0x04 => BaseType::Uint16,
            0x05 => BaseType::Sint32,
            0x06 => BaseType::Uint32,
            0x07 => BaseType::String,
            0x08 => BaseType::Float32,
            0x09 => BaseType::Float64,
            0x0A => BaseType::Uint8z,
            0x0B => BaseType::Uint16z,
            0x0C => BaseType::Uint32z,
            0x0D => BaseType::Byte,
            0x0E => BaseType::Sint64,
            0x0F => BaseType::Uint64,
            0x10 => BaseType::Uint64z,
            code => BaseType::Unknown(code),
        }
    }

    /// The canonical base type byte, with the multi-byte flag set where the
    /// protocol sets it.
    pub fn code(self) -> u8 {
        match self {
            BaseType::Enum => 0x00,
            BaseType::Sint8 => 0x01,
            BaseType::Uint8 => 0x02,
            BaseType::Sint16 => 0x83,
            BaseType::Uint16 => 0x84,
            BaseType::Sint32 => 0x85,
            BaseType::Uint32 => 0x86,
            BaseType::String => 0x07,
            BaseType::Float32 => 0x88,
            BaseType::Float64 => 0x89,
            BaseType::Uint8z => 0x0A,
            BaseType::Uint16z => 0x8B,
            BaseType::Uint32z => 0x8C,
            BaseType::Byte => 0x0D,
            BaseType::Sint64 => 0x8E,
            BaseType::Uint64 => 0x8F,
            BaseType::Uint64z => 0x90,
            BaseType::Unknown(code) => code,
        }
    }

    /// The protocol's name for this base type.
    pub fn name(self) -> &'static str {
        match self {
            BaseType::Enum => "enum",
            BaseType::Sint8 => "sint8",
            BaseType::Uint8 => "uint8",
            BaseType::Sint16 => "sint16",
            BaseType::Uint16 => "uint16",
            BaseType::Sint32 => "sint32",
            BaseType::Uint32 => "uint32",
            BaseType::String => "string",
            BaseType::Float32 => "float32",
            BaseType::Float64 => "float64",
            BaseType::Uint8z => "uint8z",
            BaseType::Uint16z => "uint16z",
            BaseType::Uint32z => "uint32z",
            BaseType::Byte => "byte",
            BaseType::Sint64 => "sint64",
            BaseType::Uint64 => "uint64",
            BaseType::Uint64z => "uint64z",
            BaseType::Unknown(_) => "unknown",
        }
    }

    /// The size of a single element in bytes.
    ///
    /// Fields may span several elements, forming an array.
    pub fn size(self) -> usize {
        match self {
            BaseType::Enum
            | BaseType::Sint8
            | BaseType::Uint8
            | BaseType::String
            | BaseType::Uint8z
            | BaseType::Byte
            | BaseType::Unknown(_) => 1,
            BaseType::Sint16 | BaseType::Uint16 | BaseType::Uint16z => 2,
            BaseType::Sint32 | BaseType::Uint32 | BaseType::Float32 | BaseType::Uint32z => 4,
            BaseType::Float64 | BaseType::Sint64 | BaseType::Uint64 | BaseType::Uint64z => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            BaseType::Sint8
                | BaseType::Sint16
                | BaseType::Sint32
                | BaseType::Sint64
                | BaseType::Float32
                | BaseType::Float64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, BaseType::Float32 | BaseType::Float64)
    }

    /// Whether zero, rather than all ones, marks an invalid element.
    pub fn is_zero_invalid(self) -> bool {
        matches!(
            self,
            BaseType::Uint8z | BaseType::Uint16z | BaseType::Uint32z | BaseType::Uint64z
        )
    }

    pub fn is_known(self) -> bool {
        !matches!(self, BaseType::Unknown(_))
    }
}

impl From<u8> for BaseType {
    fn from(r: u8) -> Self {
        Self::from_raw(r)
    }
}
