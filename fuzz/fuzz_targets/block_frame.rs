#![no_main]

use libfuzzer_sys::fuzz_target;
use yxdb_wire::block_frame::read_block;

// Fuzz target: read consecutive length-prefixed blocks until end of input
// or the first framing error.
fuzz_target!(|data: &[u8]| {
    let mut input = data;
    let mut payload = Vec::new();
    while let Ok(Some(prefix)) = read_block(&mut input, &mut payload) {
        assert!(payload.len() <= prefix.payload_limit());
    }
});
