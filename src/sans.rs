//! Building blocks of the decoder.
//!
//! This module is intended for applications that need finer control than
//! [`crate::avec::decode_slice`] offers, or that want to test a single step of
//! the decoding process in isolation.
//!
//! # Architecture
//!
//! Document and record structure is represented by zero-size, non-copy state
//! tokens. Once enough bytes are ready, transition to another state by calling
//! the token's `advance` method. This will return a successor state token,
//! along with any extracted data.
//!
//! Only the initial state, re-exported for convenience as [`Decoder`], can be
//! constructed.
//!
//! Unlike the record structure, the state that spans records is held in
//! ordinary owned values:
//!
//! - [`registry::Registry`] keeps the most recent definition for each local
//! message number.
//!
//! - [`timestamp::Timestamps`] keeps the reference used to expand compressed
//! timestamp headers.
//!
//! Some areas of the decoding process are not represented in the state
//! machine and must be carefully written by the driver:
//!
//! - Reading bytes from the correct place in the document, and failing when a
//! record runs past the end of the declared data region.
//!
//! - Ending decoding once the specified number of document bytes have been
//! read.
//!
//! - Applying cyclic redundancy checks. Helpers are provided in the [`check`]
//! module.
//!
//! Implementers are recommended to begin by studying the driver in
//! [`crate::avec::slice`].

pub mod base_type;
pub mod check;
pub mod data;
pub mod definition;
pub mod header;
pub mod profile;
pub mod registry;
pub mod timestamp;

/// Entrypoint to the state machine.
pub type Decoder = header::DocumentHeader;
