#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use yxdb_wire::{HEADER_SIZE, YxdbHeader};

#[derive(Arbitrary, Debug)]
struct Input {
    description: [u8; 64],
    file_id: u32,
    created_at: u32,
    metadata_len: u32,
    record_block_index_offset: u64,
    record_count: u64,
    compression_version: u32,
}

// Fuzz target: YxdbHeader write->read roundtrip.
fuzz_target!(|input: Input| {
    let text_len = input.description.iter().position(|&b| b == 0).unwrap_or(64);
    let description = String::from_utf8_lossy(&input.description[..text_len]).into_owned();
    if description.len() > 64 {
        return;
    }
    let header = YxdbHeader {
        description,
        file_id: input.file_id,
        created_at: input.created_at,
        metadata_len: input.metadata_len,
        record_block_index_offset: input.record_block_index_offset,
        record_count: input.record_count,
        compression_version: input.compression_version,
    };

    let mut buf = [0u8; HEADER_SIZE];
    header.write_to(&mut buf).unwrap();
    let parsed = YxdbHeader::read_from(&buf).unwrap();
    assert_eq!(parsed, header);
});
