//! Helpers for computing and reporting cyclic redundancy checks.

/// Accumulate a slice of bytes into a cyclic redundancy check value.
pub fn compute_crc(init: u16, r: &[u8]) -> u16 {
    r.iter().fold(init, |acc, b| crc_byte(acc, *b))
}

/// Accumulate a single byte into a cyclic redundancy check value.
fn crc_byte(mut crc: u16, b: u8) -> u16 {
    const CRC_TABLE: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
        0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
    ];

    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    crc = (crc >> 4) & 0x0FFF;
    crc = crc ^ tmp ^ CRC_TABLE[(b & 0xF) as usize];

    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    crc = (crc >> 4) & 0x0FFF;
    crc = crc ^ tmp ^ CRC_TABLE[((b >> 4) & 0xF) as usize];

    crc
}

/// The region of the document covered by a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum CrcKind {
    /// The first twelve bytes of an extended document header.
    Header,
    /// The document header and the whole declared data region.
    File,
}

impl CrcKind {
    /// A stable label for this check.
    pub fn label(self) -> &'static str {
        match self {
            CrcKind::Header => "header",
            CrcKind::File => "header_plus_data",
        }
    }
}

/// The outcome of a cyclic redundancy check.
///
/// A mismatch is advisory: decoding continues and the result is reported
/// alongside the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CrcCheck {
    /// Which check this is.
    pub kind: CrcKind,
    /// Whether the document carries a stored value for this check.
    pub present: bool,
    /// The value stored in the document.
    pub stored: Option<u16>,
    /// The value calculated over the covered bytes, if a comparison was made.
    pub computed: Option<u16>,
    /// Whether the check passed, or was not applicable.
    pub valid: bool,
}

impl CrcCheck {
    /// Check the header of a document.
    ///
    /// `stored` is `None` for a 12-byte header, which carries no check. A
    /// stored value of zero means the producer skipped the check, and is
    /// accepted without calculation.
    pub fn header(stored: Option<u16>, header: &[u8]) -> Self {
        let computed = stored.filter(|s| *s != 0).map(|_| compute_crc(0, header));

        Self {
            kind: CrcKind::Header,
            present: stored.is_some(),
            stored,
            computed,
            valid: computed.is_none_or(|c| Some(c) == stored),
        }
    }

    /// Check a whole document, given the bytes preceding the trailer and the
    /// value found in the trailer.
    pub fn file(stored: u16, covered: &[u8]) -> Self {
        let computed = compute_crc(0, covered);

        Self {
            kind: CrcKind::File,
            present: true,
            stored: Some(stored),
            computed: Some(computed),
            valid: computed == stored,
        }
    }

    /// Whether a stored value was compared and found not to match.
    pub fn is_mismatch(&self) -> bool {
        self.present && !self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(compute_crc(0, b"123456789"), 0xBB3D);
    }

    #[test]
    fn accumulates_across_slices() {
        let whole = compute_crc(0, b"123456789");
        let split = compute_crc(compute_crc(0, b"1234"), b"56789");
        assert_eq!(whole, split);
    }

    #[test]
    fn header_without_check() {
        let check = CrcCheck::header(None, &[0; 12]);
        assert!(!check.present);
        assert!(check.valid);
        assert_eq!(check.computed, None);
    }

    #[test]
    fn header_with_skipped_check() {
        let check = CrcCheck::header(Some(0), &[1; 12]);
        assert!(check.present);
        assert!(check.valid);
        assert_eq!(check.computed, None);
        assert!(!check.is_mismatch());
    }

    #[test]
    fn file_mismatch() {
        let check = CrcCheck::file(0x1234, b"123456789");
        assert_eq!(check.computed, Some(0xBB3D));
        assert!(check.is_mismatch());
        assert_eq!(check.kind.label(), "header_plus_data");
    }
}
