use std::io::Read;

use tracing::{debug, warn};
use yxdb_types::{RecordLayout, Schema, parse_metadata};
use yxdb_wire::block_frame::read_up_to;
use yxdb_wire::{HEADER_SIZE, YxdbHeader};

use crate::error::ReadError;

/// Everything known about a file before its first record block.
#[derive(Clone, Debug)]
pub struct FileMetadata {
    pub header: YxdbHeader,
    pub schema: Schema,
    /// Metadata text exactly as it parsed (possibly re-wrapped).
    pub schema_text: String,
    pub layout: RecordLayout,
}

/// Read the header and metadata blob from the start of `reader`.
///
/// On return the reader is positioned at the first record block.
///
/// Steps:
///   1. Read 512 header bytes.
///   2. Read `metadata_len * 2` bytes and decode them as UTF-16LE.
///   3. Parse the text into a [`Schema`], retrying with a `MetaInfo`
///      wrapper when needed.
///   4. Derive the [`RecordLayout`].
///
/// # Errors
///
/// - [`ReadError::TruncatedHeader`] / [`ReadError::TruncatedMetadata`] if
///   the input ends early.
/// - [`ReadError::MalformedSchema`] if the text is not a usable schema.
/// - [`ReadError::Io`] for read failures.
pub fn read_metadata<R: Read>(reader: &mut R) -> Result<FileMetadata, ReadError> {
    let mut header_buf = [0u8; HEADER_SIZE];
    let found = read_up_to(reader, &mut header_buf)?;
    if found < HEADER_SIZE {
        return Err(ReadError::TruncatedHeader {
            expected: HEADER_SIZE,
            found,
        });
    }
    let header = YxdbHeader::read_from(&header_buf)?;

    let expected = header.metadata_byte_len();
    let mut blob = Vec::new();
    reader.by_ref().take(expected).read_to_end(&mut blob)?;
    let found = blob.len() as u64;
    if found < expected {
        return Err(ReadError::TruncatedMetadata { expected, found });
    }

    let parsed = parse_metadata(decode_utf16_le(&blob))?;
    let layout = RecordLayout::from_schema(&parsed.schema);

    for field in parsed.schema.iter().filter(|f| f.field_type.is_unknown()) {
        warn!(
            field = %field.name,
            field_type = %field.field_type,
            "unknown field type counted as zero bytes; later field offsets may be wrong"
        );
    }

    debug!(
        records = header.record_count,
        fields = parsed.schema.len(),
        fixed_size = layout.fixed_size,
        variable = layout.has_variable_field,
        wrapped = parsed.wrapped,
        compression_version = header.compression_version,
        "loaded yxdb metadata"
    );

    Ok(FileMetadata {
        header,
        schema: parsed.schema,
        schema_text: parsed.text,
        layout,
    })
}

/// Decode little-endian UTF-16 up to the first NUL code unit.
///
/// Unpaired surrogates become U+FFFD. A trailing odd byte is ignored.
#[must_use]
pub fn decode_utf16_le(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0);
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    fn file_start(metadata: &str, declared_units: u32) -> Vec<u8> {
        let header = YxdbHeader {
            description: "test".to_string(),
            file_id: 1,
            created_at: 0,
            metadata_len: declared_units,
            record_block_index_offset: 0,
            record_count: 0,
            compression_version: 1,
        };
        let mut bytes = vec![0u8; HEADER_SIZE];
        header.write_to(&mut bytes).unwrap();
        bytes.extend(utf16(metadata));
        bytes
    }

    #[test]
    fn decodes_until_nul() {
        let mut bytes = utf16("<a/>");
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend(utf16("garbage"));
        assert_eq!(decode_utf16_le(&bytes), "<a/>");
    }

    #[test]
    fn decodes_surrogate_pairs() {
        assert_eq!(decode_utf16_le(&utf16("Zürich 🦀")), "Zürich 🦀");
    }

    #[test]
    fn lone_surrogate_is_replaced() {
        let bytes = [0x00, 0xD8, b'a', 0x00];
        assert_eq!(decode_utf16_le(&bytes), "\u{FFFD}a");
    }

    #[test]
    fn reads_header_and_schema() {
        let xml = r#"<RecordInfo><Field name="id" type="Int32"/></RecordInfo>"#;
        let units = u32::try_from(xml.encode_utf16().count() + 1).unwrap();
        let mut bytes = file_start(xml, units);
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(b"first block");

        let mut reader = Cursor::new(bytes);
        let meta = read_metadata(&mut reader).unwrap();
        assert_eq!(meta.header.description, "test");
        assert_eq!(meta.schema.len(), 1);
        assert_eq!(meta.schema_text, format!("<MetaInfo>{xml}</MetaInfo>"));
        assert_eq!(meta.layout.fixed_size, 5);
        assert_eq!(reader.position(), meta.header.data_offset());
    }

    #[test]
    fn short_header() {
        let mut reader = Cursor::new(vec![0u8; 100]);
        assert!(matches!(
            read_metadata(&mut reader),
            Err(ReadError::TruncatedHeader { expected: 512, found: 100 })
        ));
    }

    #[test]
    fn short_metadata() {
        let bytes = file_start("<MetaInfo/>", 50);
        assert!(matches!(
            read_metadata(&mut Cursor::new(bytes)),
            Err(ReadError::TruncatedMetadata { expected: 100, found: 22 })
        ));
    }

    #[test]
    fn unparseable_metadata() {
        let xml = "not xml at all <";
        let units = u32::try_from(xml.len()).unwrap();
        let bytes = file_start(xml, units);
        assert!(matches!(
            read_metadata(&mut Cursor::new(bytes)),
            Err(ReadError::MalformedSchema(_))
        ));
    }
}
