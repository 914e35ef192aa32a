//! Decoded records, in document order.

use alloc::vec::Vec;

use crate::sans::{
    data::{DeveloperFieldValue, FieldValue},
    definition::LocalDefinition,
    profile::message_name,
    timestamp::CompressedTimestamp,
};

/// Whether a record defines a message layout or carries message data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum RecordKind {
    Definition,
    Data,
}

/// A single record, as found in the document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecordEnvelope<'a> {
    /// Position of the record in the document, starting from zero.
    pub index: usize,
    /// Offset of the record header from the start of the document.
    pub offset: usize,
    /// The record header byte.
    pub header: u8,
    /// The local message number addressed by the record header.
    pub local: u8,
    /// The global message number defined, or resolved through the active
    /// definition.
    pub global_message: u16,
    pub payload: Payload<'a>,
    /// Every byte of the record, including the record header.
    pub raw: &'a [u8],
}

impl<'a> RecordEnvelope<'a> {
    pub fn kind(&self) -> RecordKind {
        match self.payload {
            Payload::Definition(_) => RecordKind::Definition,
            Payload::Data(_) => RecordKind::Data,
        }
    }

    pub fn definition(&self) -> Option<&LocalDefinition> {
        match &self.payload {
            Payload::Definition(definition) => Some(definition),
            Payload::Data(_) => None,
        }
    }

    pub fn data(&self) -> Option<&DataRecord<'a>> {
        match &self.payload {
            Payload::Definition(_) => None,
            Payload::Data(data) => Some(data),
        }
    }

    /// The profile name of the global message number, if it is well known.
    pub fn message_name(&self) -> Option<&'static str> {
        message_name(self.global_message)
    }
}

/// The content of a record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum Payload<'a> {
    Definition(LocalDefinition),
    Data(DataRecord<'a>),
}

/// The content of a data record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataRecord<'a> {
    /// The expansion of a compressed timestamp header, if the record has one.
    pub compressed_timestamp: Option<CompressedTimestamp>,
    pub fields: Vec<FieldValue<'a>>,
    pub developer_fields: Vec<DeveloperFieldValue<'a>>,
}

impl<'a> DataRecord<'a> {
    /// Retrieve the first field with a field number.
    pub fn field(&self, number: u8) -> Option<&FieldValue<'a>> {
        self.fields.iter().find(|f| f.number == number)
    }
}
