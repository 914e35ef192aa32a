#![no_std]

//! A loss-free, order-preserving decoder for Garmin's Flexible and
//! Interoperable Data Transfer protocol.
//!
//! Chainring turns a fully buffered document into an ordered sequence of
//! records: every definition record, every data record (with each field
//! decoded to its base type and flagged where it holds the 'invalid' marker
//! value), and every developer field as raw bytes. Nothing in the stream is
//! dropped, and each record keeps its byte offset and raw bytes so downstream
//! tools can cross-reference the source.
//!
//! Most users should begin with [`avec::decode_slice`]. The building blocks it
//! drives (header and record state tokens, the base-type catalog, the field
//! decoder and the timestamp reconstructor) are exposed in the [`sans`]
//! module.
//!
//! ```
//! let decoded = chainring::avec::decode_slice(&bytes)?;
//!
//! for warning in decoded.warnings() {
//!     eprintln!("{warning}");
//! }
//!
//! for record in decoded.messages(20) {
//!     let data = record.data().unwrap();
//!     println!("{:?}", data.field(253));
//! }
//! ```
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable `std` support in error and logging dependencies (default).
//! - `serde`: derive `Serialize` for the decoded output model.

extern crate alloc;

pub mod avec;
pub mod sans;
