#![no_main]

use libfuzzer_sys::fuzz_target;
use yxdb_wire::OUTPUT_CAPACITY;

// Fuzz target: lzf::decompress with arbitrary token streams.
//
// Catches bugs in:
// - Output bounds checks before each token
// - Back-references reaching before the output start
// - Truncated literal runs and length/distance bytes
fuzz_target!(|data: &[u8]| {
    let mut out = vec![0u8; OUTPUT_CAPACITY];
    if let Ok(n) = yxdb_wire::lzf::decompress(data, &mut out) {
        assert!(n <= OUTPUT_CAPACITY);
    }

    // A small destination exercises OutputTooSmall.
    let mut small = [0u8; 64];
    let _ = yxdb_wire::lzf::decompress(data, &mut small);
});
