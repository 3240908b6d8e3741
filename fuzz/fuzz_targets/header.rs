#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: YxdbHeader::read_from with arbitrary bytes.
fuzz_target!(|data: &[u8]| {
    let _ = yxdb_wire::YxdbHeader::read_from(data);
});
