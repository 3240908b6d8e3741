#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use yxdb_reader::{ReaderConfig, YxdbReader};

// Fuzz target: open a whole file from arbitrary bytes and stream at most a
// bounded number of records. Every failure must surface as an error.
fuzz_target!(|data: &[u8]| {
    let Ok(mut reader) = YxdbReader::from_reader(Cursor::new(data.to_vec()), ReaderConfig::inline())
    else {
        return;
    };
    let mut n = 0;
    while n < 10_000 && reader.advance() {
        let _ = reader.record().len();
        n += 1;
    }
    let _ = reader.close();
});
