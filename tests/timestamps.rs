mod support;

use chainring::{
    avec::decode_slice,
    sans::timestamp::{CompressedTimestamp, Timestamp},
};
use support::*;

fn expanded(data: &[u8]) -> Vec<Option<CompressedTimestamp>> {
    decode_slice(data)
        .unwrap()
        .data_records()
        .map(|r| r.data().unwrap().compressed_timestamp)
        .collect()
}

#[test]
fn expands_from_reference() {
    let data = Document::new()
        .definition(0, 20, &[(253, 4, UINT32), (3, 1, UINT8)])
        .definition(1, 20, &[(3, 1, UINT8)])
        .data(0, &[0xE8, 0x03, 0x00, 0x00, 0x50]) // 1000, offset 8.
        .compressed(1, 10, &[0x51])
        .compressed(1, 15, &[0x52])
        .build();

    let timestamps = expanded(&data);
    assert_eq!(timestamps[0], None);
    assert_eq!(
        timestamps[1],
        Some(CompressedTimestamp {
            offset: 10,
            absolute: Some(Timestamp(1002)),
        })
    );
    assert_eq!(timestamps[2].and_then(|t| t.absolute), Some(Timestamp(1007)));
}

#[test]
fn wraps_across_window() {
    let data = Document::new()
        .definition(0, 20, &[(253, 4, UINT32)])
        .definition(1, 20, &[(3, 1, UINT8)])
        .data(0, &[0xFE, 0x03, 0x00, 0x00]) // 1022, offset 30.
        .compressed(1, 2, &[0x00])
        .compressed(1, 2, &[0x00])
        .build();

    let timestamps = expanded(&data);
    assert_eq!(timestamps[1].and_then(|t| t.absolute), Some(Timestamp(1026)));
    assert_eq!(timestamps[2].and_then(|t| t.absolute), Some(Timestamp(1026)));
}

#[test]
fn no_reference_yet() {
    let data = Document::new()
        .definition(1, 20, &[(3, 1, UINT8)])
        .compressed(1, 5, &[0x00])
        .build();

    let decoded = decode_slice(&data).unwrap();
    let record = decoded.data_records().next().unwrap();
    let compressed = record.data().unwrap().compressed_timestamp.unwrap();

    assert_eq!(compressed.offset, 5);
    assert!(!compressed.has_reference());
    assert!(decoded.warnings().is_empty());
}

#[test]
fn invalid_timestamp_keeps_reference() {
    let data = Document::new()
        .definition(0, 20, &[(253, 4, UINT32)])
        .definition(1, 20, &[(3, 1, UINT8)])
        .data(0, &[0x00, 0x01, 0x00, 0x00]) // 256, offset 0.
        .data(0, &[0xFF, 0xFF, 0xFF, 0xFF])
        .compressed(1, 4, &[0x00])
        .build();

    let timestamps = expanded(&data);
    assert_eq!(timestamps[2].and_then(|t| t.absolute), Some(Timestamp(260)));
}

#[test]
fn later_timestamp_field_resets_reference() {
    let data = Document::new()
        .definition(0, 20, &[(253, 4, UINT32)])
        .definition(1, 20, &[(3, 1, UINT8)])
        .data(0, &[0x00, 0x01, 0x00, 0x00]) // 256, offset 0.
        .compressed(1, 3, &[0x00])
        .data(0, &[0x10, 0x02, 0x00, 0x00]) // 528, offset 16.
        .compressed(1, 20, &[0x00])
        .build();

    let timestamps = expanded(&data);
    assert_eq!(timestamps[1].and_then(|t| t.absolute), Some(Timestamp(259)));
    assert_eq!(timestamps[3].and_then(|t| t.absolute), Some(Timestamp(532)));
}

#[test]
fn compressed_local_numbers() {
    let data = Document::new()
        .definition(0, 20, &[(253, 4, UINT32)])
        .definition(3, 19, &[(3, 1, UINT8)])
        .data(0, &[0x00, 0x01, 0x00, 0x00])
        .compressed(3, 1, &[0x07])
        .build();

    let decoded = decode_slice(&data).unwrap();
    let record = decoded.data_records().nth(1).unwrap();

    assert_eq!(record.local, 3);
    assert_eq!(record.global_message, 19);
    assert_eq!(record.header, 0x80 | 0x60 | 0x01);
    assert_eq!(
        record.data().unwrap().compressed_timestamp.and_then(|t| t.absolute),
        Some(Timestamp(257))
    );
}
