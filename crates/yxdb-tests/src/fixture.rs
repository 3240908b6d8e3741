use std::fmt::Write as _;
use std::io;
use std::path::Path;

use yxdb_wire::block_frame::write_block;
use yxdb_wire::{BLOCK_SIZE, BlockPrefix, HEADER_SIZE, YxdbHeader};

use crate::compress::compress;

/// File id written into fixture headers.
pub const FIXTURE_FILE_ID: u32 = 0x0044_0049;
/// Compression version written into fixture headers.
pub const FIXTURE_COMPRESSION_VERSION: u32 = 1;

/// How record blocks are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockEncoding {
    /// LZF-compress every block, storing it raw when compression would
    /// not shrink it.
    #[default]
    Compressed,
    /// Store every block raw.
    Stored,
}

/// One `<Field>` element for [`record_info_xml`].
#[derive(Clone, Debug)]
pub struct FieldDef {
    pub name: String,
    pub field_type: String,
    pub size: Option<u32>,
    pub source: Option<String>,
}

impl FieldDef {
    pub fn new(name: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            size: None,
            source: None,
        }
    }

    #[must_use]
    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

/// Render `<MetaInfo><RecordInfo>..</RecordInfo></MetaInfo>` for `fields`.
#[must_use]
pub fn record_info_xml(fields: &[FieldDef]) -> String {
    let mut xml = String::from("<MetaInfo><RecordInfo>\n");
    for field in fields {
        let _ = write!(xml, "\t<Field name=\"{}\"", escape(&field.name));
        if let Some(size) = field.size {
            let _ = write!(xml, " size=\"{size}\"");
        }
        if let Some(source) = &field.source {
            let _ = write!(xml, " source=\"{}\"", escape(source));
        }
        let _ = writeln!(xml, " type=\"{}\"/>", escape(&field.field_type));
    }
    xml.push_str("</RecordInfo>\n</MetaInfo>");
    xml
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Build a record from its fixed prefix and, for layouts with variable
/// fields, the variable payload.
///
/// The payload is preceded by its u32 length. Pass `None` for fixed-only
/// layouts.
///
/// # Panics
///
/// Panics if the payload is longer than `u32::MAX` bytes.
#[must_use]
pub fn variable_record(fixed: &[u8], payload: Option<&[u8]>) -> Vec<u8> {
    let mut record = fixed.to_vec();
    if let Some(payload) = payload {
        let len = u32::try_from(payload.len()).expect("payload length fits in u32");
        record.extend_from_slice(&len.to_le_bytes());
        record.extend_from_slice(payload);
    }
    record
}

/// In-memory writer for complete `.yxdb` files.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────┐
/// │ Method       │ Effect                                           │
/// ├──────────────┼──────────────────────────────────────────────────┤
/// │ record       │ Append one encoded record                        │
/// │ encoding     │ Compressed (default) or stored blocks            │
/// │ block_size   │ Uncompressed bytes per block (≤ BLOCK_SIZE)      │
/// │ declared     │ Override the header's record count               │
/// │ raw_block    │ Append a hand-made block after the record blocks │
/// └──────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// Records are concatenated into one byte stream and cut into blocks at
/// `block_size` boundaries regardless of where records start, so records
/// routinely straddle blocks.
#[derive(Clone, Debug)]
pub struct FixtureBuilder {
    description: String,
    metadata: String,
    records: Vec<u8>,
    record_count: u64,
    declared_count: Option<u64>,
    encoding: BlockEncoding,
    block_size: usize,
    raw_blocks: Vec<(BlockPrefix, Vec<u8>)>,
}

impl FixtureBuilder {
    /// Start a file whose metadata text is `metadata`, verbatim.
    pub fn new(metadata: impl Into<String>) -> Self {
        Self {
            description: "yxdb test fixture".to_string(),
            metadata: metadata.into(),
            records: Vec::new(),
            record_count: 0,
            declared_count: None,
            encoding: BlockEncoding::default(),
            block_size: BLOCK_SIZE,
            raw_blocks: Vec::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: BlockEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Bytes of record data per block, clamped to `1..=BLOCK_SIZE`.
    #[must_use]
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.clamp(1, BLOCK_SIZE);
        self
    }

    /// Write `count` into the header instead of the number of records
    /// actually added.
    #[must_use]
    pub fn declared(mut self, count: u64) -> Self {
        self.declared_count = Some(count);
        self
    }

    #[must_use]
    pub fn record(mut self, bytes: &[u8]) -> Self {
        self.push_record(bytes);
        self
    }

    #[must_use]
    pub fn records<I, B>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        for record in records {
            self.push_record(record.as_ref());
        }
        self
    }

    /// Append a block exactly as given, after the blocks built from
    /// records.
    #[must_use]
    pub fn raw_block(mut self, prefix: BlockPrefix, payload: &[u8]) -> Self {
        self.raw_blocks.push((prefix, payload.to_vec()));
        self
    }

    fn push_record(&mut self, bytes: &[u8]) {
        self.records.extend_from_slice(bytes);
        self.record_count += 1;
    }

    /// Number of records added so far.
    #[must_use]
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Lay out the complete file.
    ///
    /// # Panics
    ///
    /// Panics if the metadata is longer than `u32::MAX` UTF-16 units.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        // NUL-terminated, and the terminator is counted in the header.
        let metadata: Vec<u8> = self
            .metadata
            .encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(u16::to_le_bytes)
            .collect();
        let metadata_len =
            u32::try_from(metadata.len() / 2).expect("metadata length fits in u32");

        let data_offset = (HEADER_SIZE + metadata.len()) as u64;
        let mut data = Vec::new();
        let mut block_offsets = Vec::new();
        for chunk in self.records.chunks(self.block_size) {
            block_offsets.push(data_offset + data.len() as u64);
            let (prefix, payload) = self.encode_block(chunk);
            push_block(&mut data, prefix, &payload);
        }
        for (prefix, payload) in &self.raw_blocks {
            block_offsets.push(data_offset + data.len() as u64);
            push_block(&mut data, *prefix, payload);
        }

        let header = YxdbHeader {
            description: self.description.clone(),
            file_id: FIXTURE_FILE_ID,
            created_at: 1_700_000_000,
            metadata_len,
            record_block_index_offset: data_offset + data.len() as u64,
            record_count: self.declared_count.unwrap_or(self.record_count),
            compression_version: FIXTURE_COMPRESSION_VERSION,
        };

        let mut file = vec![0u8; HEADER_SIZE];
        header
            .write_to(&mut file)
            .expect("buffer holds a full header");
        file.extend_from_slice(&metadata);
        file.extend_from_slice(&data);

        let block_count = u32::try_from(block_offsets.len()).expect("block count fits in u32");
        file.extend_from_slice(&block_count.to_le_bytes());
        for offset in block_offsets {
            file.extend_from_slice(&offset.to_le_bytes());
        }
        file
    }

    /// Build the file and write it to `path`.
    ///
    /// # Errors
    ///
    /// Propagates the write error.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.build())
    }

    fn encode_block(&self, chunk: &[u8]) -> (BlockPrefix, Vec<u8>) {
        let len = u32::try_from(chunk.len()).expect("block length fits in u32");
        if self.encoding == BlockEncoding::Compressed {
            let packed = compress(chunk);
            if packed.len() < chunk.len() {
                let packed_len = u32::try_from(packed.len()).expect("block length fits in u32");
                return (BlockPrefix::compressed(packed_len), packed);
            }
        }
        (BlockPrefix::stored(len), chunk.to_vec())
    }
}

fn push_block(data: &mut Vec<u8>, prefix: BlockPrefix, payload: &[u8]) {
    write_block(data, prefix, payload).expect("writing to a Vec cannot fail");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_of_an_empty_file() {
        let bytes = FixtureBuilder::new("<MetaInfo/>").build();
        let header = YxdbHeader::read_from(&bytes).unwrap();
        assert_eq!(header.metadata_len, 12);
        assert_eq!(header.record_count, 0);
        assert_eq!(header.record_block_index_offset, header.data_offset());
        // index: zero blocks
        assert_eq!(bytes.len() as u64, header.data_offset() + 4);
    }

    #[test]
    fn incompressible_blocks_are_stored() {
        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        let noise: Vec<u8> = (0..4096)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 56) as u8
            })
            .collect();
        assert!(compress(&noise).len() >= noise.len());
        let bytes = FixtureBuilder::new("<MetaInfo/>").record(&noise).build();
        let header = YxdbHeader::read_from(&bytes).unwrap();
        let at = usize::try_from(header.data_offset()).unwrap();
        let prefix = u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
        assert!(!BlockPrefix::from_raw(prefix).is_compressed());
    }

    #[test]
    fn xml_escapes_attribute_values() {
        let xml = record_info_xml(&[FieldDef::new("a&b", "String").size(4).source("x \"y\"")]);
        assert_eq!(
            xml,
            "<MetaInfo><RecordInfo>\n\t<Field name=\"a&amp;b\" size=\"4\" source=\"x &quot;y&quot;\" type=\"String\"/>\n</RecordInfo>\n</MetaInfo>"
        );
    }
}
