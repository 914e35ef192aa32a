//! Reconstruction of absolute timestamps from compressed record headers.

/// Field number holding an absolute timestamp in any message.
pub const TIMESTAMP_FIELD: u8 = 253;

/// Value of a timestamp field marking the absence of a timestamp.
pub const INVALID_TIMESTAMP: u32 = u32::MAX;

/// Seconds from the Unix epoch to the protocol epoch, 1989-12-31T00:00:00Z.
pub const EPOCH_UNIX_SECONDS: i64 = 631_065_600;

const OFFSET_MASK: u32 = 0x1F;

/// An absolute timestamp, in seconds since the protocol epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Timestamp(pub u32);

impl Timestamp {
    /// Seconds since the Unix epoch.
    pub fn unix_seconds(self) -> i64 {
        EPOCH_UNIX_SECONDS + self.0 as i64
    }
}

/// The expansion of a compressed timestamp header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CompressedTimestamp {
    /// The five-bit offset carried in the record header.
    pub offset: u8,
    /// The reconstructed timestamp, or `None` when no absolute timestamp had
    /// been seen earlier in the document.
    pub absolute: Option<Timestamp>,
}

impl CompressedTimestamp {
    pub fn has_reference(&self) -> bool {
        self.absolute.is_some()
    }
}

/// Rolling reference for compressed timestamp headers.
#[derive(Debug, Default, Clone)]
pub struct Timestamps {
    last: Option<u32>,
    last_offset: u32,
}

impl Timestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current reference, if any.
    pub fn reference(&self) -> Option<Timestamp> {
        self.last.map(Timestamp)
    }

    /// Refresh the reference from an absolute timestamp field.
    ///
    /// Returns `false`, leaving the reference untouched, for the 'invalid'
    /// marker value.
    pub fn observe(&mut self, timestamp: u32) -> bool {
        if timestamp == INVALID_TIMESTAMP {
            return false;
        }

        self.last = Some(timestamp);
        self.last_offset = timestamp & OFFSET_MASK;
        true
    }

    /// Expand the five-bit offset of a compressed timestamp header, advancing
    /// the reference.
    pub fn expand(&mut self, offset: u8) -> CompressedTimestamp {
        let offset = offset & OFFSET_MASK as u8;

        let absolute = self.last.as_mut().map(|last| {
            let delta = (offset as u32).wrapping_sub(self.last_offset) & OFFSET_MASK;
            *last = last.wrapping_add(delta);
            Timestamp(*last)
        });

        if absolute.is_some() {
            self.last_offset = offset as u32;
        }

        CompressedTimestamp { offset, absolute }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reference() {
        let mut timestamps = Timestamps::new();
        let expanded = timestamps.expand(7);
        assert_eq!(expanded.offset, 7);
        assert!(!expanded.has_reference());
        assert_eq!(timestamps.reference(), None);
    }

    #[test]
    fn advances_within_window() {
        let mut timestamps = Timestamps::new();
        assert!(timestamps.observe(1000)); // offset 8

        assert_eq!(timestamps.expand(10).absolute, Some(Timestamp(1002)));
        assert_eq!(timestamps.expand(10).absolute, Some(Timestamp(1002)));
        assert_eq!(timestamps.expand(15).absolute, Some(Timestamp(1007)));
    }

    #[test]
    fn wraps_around() {
        let mut timestamps = Timestamps::new();
        timestamps.observe(1022); // offset 30

        assert_eq!(timestamps.expand(2).absolute, Some(Timestamp(1026)));
    }

    #[test]
    fn ignores_invalid_timestamps() {
        let mut timestamps = Timestamps::new();
        assert!(!timestamps.observe(INVALID_TIMESTAMP));
        assert_eq!(timestamps.reference(), None);

        timestamps.observe(64);
        assert!(!timestamps.observe(INVALID_TIMESTAMP));
        assert_eq!(timestamps.reference(), Some(Timestamp(64)));
    }

    #[test]
    fn epoch_is_a_reference() {
        let mut timestamps = Timestamps::new();
        assert!(timestamps.observe(0));
        assert_eq!(timestamps.reference(), Some(Timestamp(0)));

        assert_eq!(timestamps.expand(3).absolute, Some(Timestamp(3)));
    }

    #[test]
    fn unix_conversion() {
        assert_eq!(Timestamp(0).unix_seconds(), 631_065_600);
        assert_eq!(Timestamp(86_400).unix_seconds(), 631_152_000);
    }
}
