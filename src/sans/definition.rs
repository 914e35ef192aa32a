//! States processing definition records.

use alloc::vec::Vec;

use either::Either::{self, Left, Right};
use thiserror::Error;
use zerocopy::FromBytes;

use super::{base_type::BaseType, header::RecordHeader};

/// An error advancing over a definition record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// The architecture byte names neither byte order.
    #[error("Unknown architecture ({0}).")]
    UnknownArchitecture(u8),
}

/// Byte order of the multi-byte values in data records of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum Architecture {
    LittleEndian,
    BigEndian,
}

impl Architecture {
    /// The architecture byte as stored in a definition record.
    pub fn byte(self) -> u8 {
        match self {
            Architecture::LittleEndian => 0,
            Architecture::BigEndian => 1,
        }
    }

    pub fn is_little_endian(self) -> bool {
        self == Architecture::LittleEndian
    }
}

impl TryFrom<u8> for Architecture {
    type Error = DefinitionError;

    fn try_from(r: u8) -> Result<Self, Self::Error> {
        match r {
            0 => Ok(Architecture::LittleEndian),
            1 => Ok(Architecture::BigEndian),
            _ => Err(DefinitionError::UnknownArchitecture(r)),
        }
    }
}

/// Layout of one field in the data records of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldDefinition {
    pub number: u8,
    /// Size of the field in bytes, possibly spanning several elements.
    pub size: u8,
    /// The base type byte exactly as stored.
    pub base_type_raw: u8,
    pub base_type: BaseType,
}

/// Layout of one developer field in the data records of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeveloperFieldDefinition {
    pub number: u8,
    pub size: u8,
    /// Index of the developer data description owning this field.
    pub developer_data_index: u8,
}

/// A decoded definition record, describing the data records that follow it
/// under the same local message number.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LocalDefinition {
    pub local: u8,
    pub architecture: Architecture,
    pub global_message: u16,
    pub fields: Vec<FieldDefinition>,
    pub developer_fields: Vec<DeveloperFieldDefinition>,
}

impl LocalDefinition {
    /// Number of bytes following the record header in each data record of
    /// this definition.
    pub fn data_size(&self) -> usize {
        let fields = self.fields.iter().map(|f| f.size as usize);
        let developer_fields = self.developer_fields.iter().map(|f| f.size as usize);
        fields.chain(developer_fields).sum()
    }
}

/// State token to decode the fixed content of a definition record.
#[derive(Debug)]
pub struct Definition {
    pub(super) is_developer: bool,
}

#[repr(C, packed)]
#[derive(Debug, FromBytes)]
struct DefinitionMessage {
    _reserved: u8,
    architecture: u8,
    global_message: [u8; 2],
    fields_remaining: u8,
}

#[repr(C, packed)]
#[derive(FromBytes)]
struct FieldHeader {
    field: u8,
    size: u8,
    base_type: u8,
}

impl Definition {
    /// Whether the record header announced developer fields.
    pub fn is_developer(&self) -> bool {
        self.is_developer
    }

    /// Transition to another state by decoding the fixed content of a
    /// definition record.
    ///
    /// Returns the architecture, the global message number, and a successor
    /// state token.
    pub fn advance(
        self,
        r: [u8; 5],
    ) -> Result<(Architecture, u16, Either<DefinitionField, DefinitionEnd>), DefinitionError> {
        let DefinitionMessage {
            architecture,
            global_message,
            fields_remaining,
            ..
        } = zerocopy::transmute!(r);

        let architecture = Architecture::try_from(architecture)?;
        let global_message = if architecture.is_little_endian() {
            u16::from_le_bytes(global_message)
        } else {
            u16::from_be_bytes(global_message)
        };

        let successor = if fields_remaining != 0 {
            Left(DefinitionField {
                fields_remaining,
                is_developer: self.is_developer,
            })
        } else {
            Right(definition_end(self.is_developer))
        };

        Ok((architecture, global_message, successor))
    }
}

/// Successor state once every field definition has been decoded.
pub type DefinitionEnd = Either<DeveloperFieldCount, RecordHeader>;

fn definition_end(is_developer: bool) -> DefinitionEnd {
    if is_developer {
        Left(DeveloperFieldCount(()))
    } else {
        Right(RecordHeader(()))
    }
}

/// State token to decode a field definition.
#[derive(Debug)]
pub struct DefinitionField {
    pub(super) fields_remaining: u8,
    pub(super) is_developer: bool,
}

impl DefinitionField {
    /// Transition to another state by decoding a field definition.
    ///
    /// Returns the field definition, and a successor state token.
    pub fn advance(self, r: [u8; 3]) -> (FieldDefinition, Either<Self, DefinitionEnd>) {
        let FieldHeader {
            field,
            size,
            base_type,
        } = zerocopy::transmute!(r);

        let definition = FieldDefinition {
            number: field,
            size,
            base_type_raw: base_type,
            base_type: BaseType::from_raw(base_type),
        };

        let fields_remaining = self.fields_remaining - 1;

        let successor = if fields_remaining != 0 {
            Left(Self {
                fields_remaining,
                is_developer: self.is_developer,
            })
        } else {
            Right(definition_end(self.is_developer))
        };

        (definition, successor)
    }
}

/// State token to decode the number of developer field definitions.
#[derive(Debug)]
pub struct DeveloperFieldCount(pub(super) ());

impl DeveloperFieldCount {
    /// Transition to another state by decoding the number of developer field
    /// definitions.
    pub fn advance(self, r: [u8; 1]) -> Either<DeveloperField, RecordHeader> {
        let fields_remaining = r[0];

        if fields_remaining != 0 {
            Left(DeveloperField { fields_remaining })
        } else {
            Right(RecordHeader(()))
        }
    }
}

/// State token to decode a developer field definition.
#[derive(Debug)]
pub struct DeveloperField {
    pub(super) fields_remaining: u8,
}

impl DeveloperField {
    /// Transition to another state by decoding a developer field definition.
    ///
    /// Returns the developer field definition, and a successor state token.
    pub fn advance(
        self,
        r: [u8; 3],
    ) -> (DeveloperFieldDefinition, Either<Self, RecordHeader>) {
        let FieldHeader {
            field,
            size,
            base_type: developer_data_index,
        } = zerocopy::transmute!(r);

        let definition = DeveloperFieldDefinition {
            number: field,
            size,
            developer_data_index,
        };

        let fields_remaining = self.fields_remaining - 1;

        let successor = if fields_remaining != 0 {
            Left(Self { fields_remaining })
        } else {
            Right(RecordHeader(()))
        };

        (definition, successor)
    }
}
