//! States processing document and record headers.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::{
    FromBytes,
    byteorder::little_endian::{U16, U32},
};

use super::{data::Data, definition::Definition};

/// The four-byte marker identifying a document.
pub const DATA_TYPE: [u8; 4] = *b".FIT";

/// An error advancing over a document header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentHeaderError {
    /// Fewer bytes than the smallest possible header.
    #[error("Document too short for a header ({0} bytes).")]
    TooShort(usize),
    /// Incorrect filetype marker.
    #[error("Incorrect file type marker ({0:?}).")]
    NotFitData([u8; 4]),
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    UnknownHeaderLength(u8),
}

/// Fields of a document header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeaderInfo {
    /// Length of the header in bytes, either 12 or 14.
    pub size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Length of the data region following the header, in bytes.
    pub data_size: u32,
    pub data_type: [u8; 4],
}

impl HeaderInfo {
    /// The file type marker as text.
    pub fn data_type(&self) -> &str {
        core::str::from_utf8(&self.data_type).unwrap_or_default()
    }

    /// Whether the header carries its own cyclic redundancy check.
    pub fn is_extended(&self) -> bool {
        self.size == 14
    }
}

/// State token to decode a document header.
#[derive(Debug)]
pub struct DocumentHeader;

impl DocumentHeader {
    /// Transition to another state by decoding a document header.
    ///
    /// Returns the header fields, and a successor state token.
    pub fn advance(
        r: [u8; 12],
    ) -> Result<(HeaderInfo, Either<ExtendedDocumentHeader, RecordHeader>), DocumentHeaderError>
    {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct FileHeader {
            header_size: u8,
            protocol_version: u8,
            profile_version: U16,
            data_size: U32,
            data_type: [u8; 4],
        }

        let FileHeader {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            data_type,
        } = zerocopy::transmute!(r);

        let successor = match header_size {
            14 => Left(ExtendedDocumentHeader(())),
            12 => Right(RecordHeader(())),
            _ => Err(DocumentHeaderError::UnknownHeaderLength(header_size))?,
        };

        if data_type != DATA_TYPE {
            Err(DocumentHeaderError::NotFitData(data_type))?;
        }

        let header = HeaderInfo {
            size: header_size,
            protocol_version,
            profile_version: profile_version.get(),
            data_size: data_size.get(),
            data_type,
        };

        Ok((header, successor))
    }
}

/// State token to decode additional bytes of an extended document header.
#[derive(Debug)]
pub struct ExtendedDocumentHeader(pub(super) ());

impl ExtendedDocumentHeader {
    /// Transition to another state by decoding the additional bytes of an
    /// extended document header.
    ///
    /// Returns the stored header check value, and the successor state token.
    pub fn advance(self, r: [u8; 2]) -> (u16, RecordHeader) {
        (u16::from_le_bytes(r), RecordHeader(()))
    }
}

/// State token to decode a record header.
#[derive(Debug)]
pub struct RecordHeader(pub(crate) ());

impl RecordHeader {
    /// Transition to another state by decoding a record header.
    ///
    /// Returns the local message number, and a successor state token for a
    /// definition or data record.
    pub fn advance(self, r: [u8; 1]) -> (u8, Either<Definition, Data>) {
        let r = r[0];

        bitfield! {
            struct ControlByte(u8) {
                [7] is_compressed,
            }
        }

        if ControlByte(r).is_compressed() {
            bitfield! {
                struct CompressedHeader(u8) {
                    [0..5] time_offset: u8,
                    [5..7] local_message: u8,
                }
            }

            let header = CompressedHeader(r);

            let successor = Right(Data {
                time_offset: Some(header.time_offset()),
            });

            (header.local_message(), successor)
        } else {
            bitfield! {
                struct NormalHeader(u8) {
                    [0..4] local_message: u8,
                    [5] is_developer,
                    [6] is_definition,
                }
            }

            let header = NormalHeader(r);

            let successor = if header.is_definition() {
                Left(Definition {
                    is_developer: header.is_developer(),
                })
            } else {
                Right(Data { time_offset: None })
            };

            (header.local_message(), successor)
        }
    }
}
