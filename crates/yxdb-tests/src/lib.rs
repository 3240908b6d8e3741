//! Synthetic YXDB files for the integration suites and benchmarks.
//!
//! [`FixtureBuilder`] lays out a complete file in memory: header, UTF-16
//! metadata, record blocks and the trailing block index. Blocks are
//! compressed with the greedy encoder in [`compress`] and fall back to
//! stored form when compression does not pay off, the same choice a
//! real writer makes.

pub mod compress;
pub mod fixture;
pub mod schemas;

pub use fixture::{BlockEncoding, FieldDef, FixtureBuilder, record_info_xml, variable_record};
