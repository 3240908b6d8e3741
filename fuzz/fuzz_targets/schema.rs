#![no_main]

use libfuzzer_sys::fuzz_target;
use yxdb_types::{RecordLayout, parse_metadata};

// Fuzz target: metadata XML parsing, including the MetaInfo wrapper retry,
// and layout computation on whatever schema comes out.
fuzz_target!(|text: &str| {
    if let Ok(parsed) = parse_metadata(text.to_string()) {
        let _ = RecordLayout::from_schema(&parsed.schema);
    }
});
