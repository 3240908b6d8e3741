#![no_main]

use libfuzzer_sys::fuzz_target;
use yxdb_tests::compress::compress;

// Fuzz target: compress->decompress roundtrip through the fixture encoder.
fuzz_target!(|data: &[u8]| {
    let packed = compress(data);
    let mut out = vec![0u8; data.len()];
    let n = yxdb_wire::lzf::decompress(&packed, &mut out).unwrap();
    assert_eq!(&out[..n], data);
});
