//! Slice-based decoder implementation.

use alloc::vec::Vec;

use either::Either::{Left, Right};
use thiserror::Error;
use tracing::{debug, trace};

use crate::sans::{
    Decoder,
    check::CrcCheck,
    data::Data,
    definition::{Definition, DefinitionError, LocalDefinition},
    header::{DocumentHeaderError, RecordHeader},
    registry::Registry,
    timestamp::Timestamps,
};

use super::{
    Decoded,
    record::{DataRecord, Payload, RecordEnvelope, RecordKind},
};

/// Errors occurring while decoding from a slice.
///
/// Each of these ends decoding; no records are returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Incorrect file header.
    #[error("Incorrect file header: {0}")]
    Header(#[from] DocumentHeaderError),
    /// The slice ends before the declared data region and trailing check value.
    ///
    /// `required` saturates at `usize::MAX` when the declared size cannot be
    /// addressed on this platform.
    #[error("Document truncated: {required} bytes declared, {found} found.")]
    TruncatedDocument { required: usize, found: usize },
    /// A record runs past the end of the declared data region.
    #[error("Record {index} at byte {offset} runs past the end of the data region.")]
    Truncated { index: usize, offset: usize },
    /// A data record addresses a local message number with no definition.
    #[error("Record {index} at byte {offset} references undefined local message {local}.")]
    UndefinedLocal { local: u8, index: usize, offset: usize },
    /// A definition record could not be decoded.
    #[error("Record {index} at byte {offset} has an invalid definition: {source}")]
    Definition {
        index: usize,
        offset: usize,
        source: DefinitionError,
    },
}

/// Decode every record from a slice of a document.
///
/// This method is also re-exported as `chainring::avec::decode_slice`.
pub fn decode(r: &[u8]) -> Result<Decoded<'_>, Error> {
    let head = *r
        .first_chunk::<12>()
        .ok_or(DocumentHeaderError::TooShort(r.len()))?;

    let (header, successor) = Decoder::advance(head)?;

    let (stored_header_crc, record_header) = match successor {
        Left(state) => {
            let extension = r
                .get(12..)
                .and_then(|r| r.first_chunk::<2>())
                .ok_or(DocumentHeaderError::TooShort(r.len()))?;

            let (stored, state) = state.advance(*extension);
            (Some(stored), state)
        }
        Right(state) => (None, state),
    };

    debug!(
        size = header.size,
        protocol_version = header.protocol_version,
        profile_version = header.profile_version,
        data_size = header.data_size,
        "Decoded document header"
    );

    let start = header.size as usize; // Offset to the start of the record section.

    // Offset to the end of the record section, and to the end of the trailer.
    let bounds = usize::try_from(header.data_size)
        .ok()
        .and_then(|size| start.checked_add(size))
        .and_then(|end| Some((end, end.checked_add(2)?)));

    let Some((end, required)) = bounds else {
        return Err(Error::TruncatedDocument {
            required: usize::MAX,
            found: r.len(),
        });
    };

    let (Some(data), Some(covered), Some(trailer)) = (
        r.get(start..end),
        r.get(..end),
        r.get(end..required).and_then(|r| r.first_chunk::<2>()),
    ) else {
        return Err(Error::TruncatedDocument {
            required,
            found: r.len(),
        });
    };

    // Checks are advisory, and never stop decoding.
    let header_crc = CrcCheck::header(stored_header_crc, &head);
    let file_crc = CrcCheck::file(u16::from_le_bytes(*trailer), covered);

    let records = RecordStream::new(data, start).run(record_header)?;

    let definition_count = records
        .iter()
        .filter(|r| r.kind() == RecordKind::Definition)
        .count();
    let data_count = records.len() - definition_count;

    let decoded = Decoded {
        header,
        header_crc,
        file_crc,
        records,
        definition_count,
        data_count,
        leftover_bytes: r.len() - required,
    };

    debug!(
        records = decoded.records.len(),
        definition_count,
        data_count,
        leftover_bytes = decoded.leftover_bytes,
        "Decoded document"
    );

    for warning in decoded.warnings() {
        warning.log();
    }

    Ok(decoded)
}

/// Position within the record section, and the record being decoded.
struct Cursor<'a> {
    r: &'a [u8],
    /// Offset of the record section from the start of the document.
    base: usize,
    i: usize,
    index: usize,
    start: usize,
}

impl<'a> Cursor<'a> {
    /// Take an exact number of bytes from the tip, advancing the offset.
    fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let bytes = self
            .r
            .get(self.i..)
            .and_then(|r| r.first_chunk::<N>())
            .copied()
            .ok_or_else(|| self.truncated())?;

        self.i += N;
        Ok(bytes)
    }

    /// Take a slice of bytes from the tip, advancing the offset.
    fn take_slice(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let r: &'a [u8] = self.r;
        let bytes = r
            .get(self.i..self.i.saturating_add(n))
            .ok_or_else(|| self.truncated())?;

        self.i += n;
        Ok(bytes)
    }

    /// Every byte of the current record read so far.
    fn record(&self) -> &'a [u8] {
        let r: &'a [u8] = self.r;
        r.get(self.start..self.i).unwrap_or_default()
    }

    fn offset(&self) -> usize {
        self.base + self.start
    }

    fn truncated(&self) -> Error {
        Error::Truncated {
            index: self.index,
            offset: self.offset(),
        }
    }
}

/// State spanning the records of a single document.
struct RecordStream<'a> {
    cursor: Cursor<'a>,
    definitions: Registry,
    timestamps: Timestamps,
}

impl<'a> RecordStream<'a> {
    fn new(r: &'a [u8], base: usize) -> Self {
        Self {
            cursor: Cursor {
                r,
                base,
                i: 0,
                index: 0,
                start: 0,
            },
            definitions: Registry::new(),
            timestamps: Timestamps::new(),
        }
    }

    /// Decode records until the end of the record section.
    fn run(mut self, mut record_header: RecordHeader) -> Result<Vec<RecordEnvelope<'a>>, Error> {
        let mut records = Vec::new();

        while self.cursor.i < self.cursor.r.len() {
            self.cursor.index = records.len();
            self.cursor.start = self.cursor.i;

            let (record, successor) = self.next(record_header)?;

            records.push(record);
            record_header = successor;
        }

        Ok(records)
    }

    fn next(&mut self, state: RecordHeader) -> Result<(RecordEnvelope<'a>, RecordHeader), Error> {
        let [header] = self.cursor.take()?;
        let (local, successor) = state.advance([header]);

        let (global_message, payload, record_header) = match successor {
            Left(state) => {
                let (definition, state) = self.decode_definition(state, local)?;

                let global_message = definition.global_message;
                self.definitions.define(definition.clone());

                (global_message, Payload::Definition(definition), state)
            }
            Right(state) => {
                let (global_message, data, state) = self.decode_data(state, local)?;

                (global_message, Payload::Data(data), state)
            }
        };

        let record = RecordEnvelope {
            index: self.cursor.index,
            offset: self.cursor.offset(),
            header,
            local,
            global_message,
            payload,
            raw: self.cursor.record(),
        };

        trace!(
            index = record.index,
            offset = record.offset,
            local,
            global_message,
            kind = ?record.kind(),
            "Decoded record"
        );

        Ok((record, record_header))
    }

    fn decode_definition(
        &mut self,
        state: Definition,
        local: u8,
    ) -> Result<(LocalDefinition, RecordHeader), Error> {
        let cursor = &mut self.cursor;

        let (architecture, global_message, mut successor) = state
            .advance(cursor.take()?)
            .map_err(|source| Error::Definition {
                index: cursor.index,
                offset: cursor.offset(),
                source,
            })?;

        let mut definition = LocalDefinition {
            local,
            architecture,
            global_message,
            fields: Vec::new(),
            developer_fields: Vec::new(),
        };

        let end = loop {
            successor = match successor {
                Left(state) => {
                    let (field, successor) = state.advance(cursor.take()?);
                    definition.fields.push(field);
                    successor
                }
                Right(end) => break end,
            };
        };

        let record_header = match end {
            Left(state) => match state.advance(cursor.take()?) {
                Left(mut state) => loop {
                    let (field, successor) = state.advance(cursor.take()?);
                    definition.developer_fields.push(field);

                    state = match successor {
                        Left(state) => state,
                        Right(state) => break state,
                    };
                },
                Right(state) => state,
            },
            Right(state) => state,
        };

        Ok((definition, record_header))
    }

    fn decode_data(
        &mut self,
        state: Data,
        local: u8,
    ) -> Result<(u16, DataRecord<'a>, RecordHeader), Error> {
        let Self {
            cursor,
            definitions,
            timestamps,
        } = self;

        let definition = definitions
            .get(local)
            .ok_or_else(|| Error::UndefinedLocal {
                local,
                index: cursor.index,
                offset: cursor.offset(),
            })?;

        let r = cursor.take_slice(definition.data_size())?;

        // Expand against the reference held before this record's own fields.
        let compressed_timestamp = state.time_offset().map(|offset| timestamps.expand(offset));

        let (fields, developer_fields, record_header) = state
            .advance(definition, r)
            .map_err(|_| cursor.truncated())?;

        for timestamp in fields.iter().filter_map(|f| f.timestamp) {
            timestamps.observe(timestamp.0);
        }

        let data = DataRecord {
            compressed_timestamp,
            fields,
            developer_fields,
        };

        Ok((definition.global_message, data, record_header))
    }
}
