//! Records longer than one block, assembled across block boundaries.

use std::io::Cursor;

use yxdb_reader::{BLOCK_SIZE, ReaderConfig, YxdbReader};
use yxdb_tests::schemas::{very_long_field_metadata, very_long_field_record};
use yxdb_tests::{BlockEncoding, FieldDef, FixtureBuilder, record_info_xml, variable_record};

fn read_all(bytes: Vec<u8>, config: ReaderConfig) -> Vec<(Vec<u8>, bool)> {
    let mut reader = YxdbReader::from_reader(Cursor::new(bytes), config).unwrap();
    let mut out = Vec::new();
    while reader.advance() {
        out.push((reader.record().to_vec(), reader.is_long_record()));
    }
    if let Some(e) = reader.last_error() {
        panic!("stream failed after {} records: {e}", out.len());
    }
    reader.close().unwrap();
    out
}

#[test]
fn reassembled_records_match_their_source_bytes() {
    let records: Vec<Vec<u8>> = [10, BLOCK_SIZE * 3 + 17, 5, BLOCK_SIZE + 1, BLOCK_SIZE * 2]
        .iter()
        .zip(1u8..)
        .map(|(&len, id)| very_long_field_record(id, len))
        .collect();
    let bytes = FixtureBuilder::new(very_long_field_metadata())
        .records(&records)
        .build();

    for config in [ReaderConfig::inline(), ReaderConfig::default()] {
        let read = read_all(bytes.clone(), config);
        assert_eq!(read.len(), records.len());
        for (i, ((got, long), want)) in read.iter().zip(&records).enumerate() {
            assert_eq!(got.len(), want.len(), "record {i}");
            assert!(got == want, "record {i} differs");
            assert_eq!(*long, want.len() > BLOCK_SIZE, "record {i}");
        }
    }
}

#[test]
fn consecutive_long_records() {
    let records: Vec<Vec<u8>> = (1..=4u8)
        .map(|id| very_long_field_record(id, BLOCK_SIZE + usize::from(id) * 1000))
        .collect();
    let bytes = FixtureBuilder::new(very_long_field_metadata())
        .records(&records)
        .encoding(BlockEncoding::Stored)
        .build();
    let read = read_all(bytes, ReaderConfig::inline());
    assert!(read.iter().all(|(_, long)| *long));
    let got: Vec<Vec<u8>> = read.into_iter().map(|(bytes, _)| bytes).collect();
    assert_eq!(got, records);
}

#[test]
fn long_record_with_small_blocks() {
    let records = vec![
        very_long_field_record(1, 100),
        very_long_field_record(2, BLOCK_SIZE + 4321),
        very_long_field_record(3, 100),
    ];
    let bytes = FixtureBuilder::new(very_long_field_metadata())
        .records(&records)
        .block_size(1000)
        .build();
    let got: Vec<Vec<u8>> = read_all(bytes, ReaderConfig::default())
        .into_iter()
        .map(|(bytes, _)| bytes)
        .collect();
    assert_eq!(got, records);
}

#[test]
fn record_of_exactly_one_block_is_not_long() {
    // 10 header bytes + payload == BLOCK_SIZE
    let record = very_long_field_record(1, BLOCK_SIZE - 10);
    let bytes = FixtureBuilder::new(very_long_field_metadata())
        .record(&record)
        .record(&very_long_field_record(2, 1))
        .build();
    let read = read_all(bytes, ReaderConfig::inline());
    assert_eq!(read.len(), 2);
    assert_eq!(read[0].0.len(), BLOCK_SIZE);
    assert!(!read[0].1);
    assert_eq!(read[1].0[0], 2);
}

#[test]
fn fixed_prefix_larger_than_a_block() {
    let metadata = record_info_xml(&[
        FieldDef::new("id", "Int32"),
        FieldDef::new("wide", "String").size(300_000),
    ]);
    let record = |id: i32| {
        let mut fixed = id.to_le_bytes().to_vec();
        fixed.push(0);
        fixed.extend((0..300_001usize).map(|i| b'a' + (i % 26) as u8));
        fixed
    };
    let records: Vec<Vec<u8>> = (1..=3).map(record).collect();
    let bytes = FixtureBuilder::new(metadata).records(&records).build();

    let read = read_all(bytes, ReaderConfig::default());
    assert_eq!(read.len(), 3);
    for ((got, long), want) in read.iter().zip(&records) {
        assert!(*long);
        assert!(got == want);
    }
}

#[test]
fn wide_fixed_prefix_with_variable_data() {
    let metadata = record_info_xml(&[
        FieldDef::new("wide", "WString").size(140_000),
        FieldDef::new("tail", "V_String").size(1000),
    ]);
    let fixed = vec![7u8; 280_001 + 4];
    let records = vec![
        variable_record(&fixed, Some(b"short".as_slice())),
        variable_record(&fixed, Some(&[][..])),
    ];
    let bytes = FixtureBuilder::new(metadata).records(&records).build();
    let got: Vec<Vec<u8>> = read_all(bytes, ReaderConfig::inline())
        .into_iter()
        .map(|(bytes, _)| bytes)
        .collect();
    assert_eq!(got, records);
}
