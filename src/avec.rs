//! Convenience interfaces for decoding whole documents.
//!
//! [`decode_slice`] walks a buffered document from its header to its trailing
//! check value, and returns every record in document order as a
//! [`RecordEnvelope`], along with the header, both cyclic redundancy checks,
//! and the number of bytes found after the document.
//!
//! A decode either succeeds, possibly carrying advisory [`Warning`]s, or fails
//! with a single [`slice::Error`] locating the fault. There is no partial
//! result.
//!
//! Each call owns its own decoding state, so separate documents may be decoded
//! concurrently.

use alloc::vec::Vec;

use thiserror::Error;
use tracing::warn;

use crate::sans::{
    check::{CrcCheck, CrcKind},
    data::FieldDecodeError,
    header::HeaderInfo,
};

pub mod record;
pub mod slice;

pub use record::{DataRecord, Payload, RecordEnvelope, RecordKind};
pub use slice::decode as decode_slice;

/// A fully decoded document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Decoded<'a> {
    pub header: HeaderInfo,
    pub header_crc: CrcCheck,
    pub file_crc: CrcCheck,
    /// Every record, in document order.
    pub records: Vec<RecordEnvelope<'a>>,
    pub definition_count: usize,
    pub data_count: usize,
    /// Number of bytes following the trailing check value.
    pub leftover_bytes: usize,
}

impl<'a> Decoded<'a> {
    /// Iterate over the data records.
    pub fn data_records(&self) -> impl Iterator<Item = &RecordEnvelope<'a>> {
        self.records.iter().filter(|r| r.kind() == RecordKind::Data)
    }

    /// Iterate over the data records of a global message number.
    pub fn messages(&self, global: u16) -> impl Iterator<Item = &RecordEnvelope<'a>> {
        self.data_records().filter(move |r| r.global_message == global)
    }

    /// Collect advisory conditions found while decoding.
    ///
    /// Check mismatches and leftover bytes come first, followed by fields that
    /// could not be decoded, in document order.
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();

        for check in [&self.header_crc, &self.file_crc] {
            if let (true, Some(stored), Some(computed)) =
                (check.is_mismatch(), check.stored, check.computed)
            {
                warnings.push(match check.kind {
                    CrcKind::Header => Warning::HeaderCrc { stored, computed },
                    CrcKind::File => Warning::FileCrc { stored, computed },
                });
            }
        }

        if self.leftover_bytes > 0 {
            warnings.push(Warning::LeftoverBytes(self.leftover_bytes));
        }

        let fields = self.data_records().flat_map(|r| {
            let fields = r.data().map(|d| d.fields.as_slice()).unwrap_or_default();
            fields.iter().map(move |f| (r.index, f))
        });

        for (record, field) in fields {
            if let Some(error) = field.decode_error {
                warnings.push(Warning::Field {
                    record,
                    field: field.number,
                    error,
                });
            }
        }

        warnings
    }
}

/// An advisory condition found while decoding.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum Warning {
    /// The header check value does not match the header.
    #[error("Calculated ({computed:#06X}) and found ({stored:#06X}) header CRC values do not match.")]
    HeaderCrc { stored: u16, computed: u16 },
    /// The trailing check value does not match the document.
    #[error("Calculated ({computed:#06X}) and found ({stored:#06X}) file CRC values do not match.")]
    FileCrc { stored: u16, computed: u16 },
    /// Bytes were found after the trailing check value.
    #[error("Found {0} leftover bytes after the document.")]
    LeftoverBytes(usize),
    /// A field could not be decoded as its base type.
    #[error("Record {record}, field {field}: {error}")]
    Field {
        record: usize,
        field: u8,
        error: FieldDecodeError,
    },
}

impl Warning {
    /// Emit this warning as a log event.
    pub(crate) fn log(&self) {
        warn!(warning = %self, "Advisory condition while decoding");
    }
}
