use crate::error::WireError;

/// Total header size in bytes (fixed).
pub const HEADER_SIZE: usize = 512;

/// Length of the free-text description at the start of the header.
pub const DESCRIPTION_LEN: usize = 64;

const FILE_ID_OFFSET: usize = 64;
const CREATED_AT_OFFSET: usize = 68;
const METADATA_LEN_OFFSET: usize = 80;
const BLOCK_INDEX_OFFSET: usize = 96;
const RECORD_COUNT_OFFSET: usize = 104;
const COMPRESSION_VERSION_OFFSET: usize = 112;

/// YXDB file header: the first 512 bytes of every file.
///
/// Only the fields below are interpreted; every other byte in the
/// preamble is ignored on read and written as zero.
///
/// ```text
/// ┌─────────┬─────────┬──────────────────────────────────────────┐
/// │ Offset  │ Size    │ Description                              │
/// ├─────────┼─────────┼──────────────────────────────────────────┤
/// │ 0x00    │ 64      │ Description text (NUL padded)            │
/// │ 0x40    │ 4 (u32) │ File id                                  │
/// │ 0x44    │ 4 (u32) │ Creation time, epoch seconds             │
/// │ 0x50    │ 4 (u32) │ Metadata length in UTF-16 code units     │
/// │ 0x60    │ 8 (u64) │ File offset of the record-block index    │
/// │ 0x68    │ 8 (u64) │ Total record count                       │
/// │ 0x70    │ 4 (u32) │ Compression format version               │
/// └─────────┴─────────┴──────────────────────────────────────────┘
/// ```
///
/// All integers are little-endian.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YxdbHeader {
    /// Description text up to the first NUL, decoded lossily.
    pub description: String,
    pub file_id: u32,
    pub created_at: u32,
    /// Length of the metadata blob in UTF-16 code units (bytes / 2).
    pub metadata_len: u32,
    pub record_block_index_offset: u64,
    pub record_count: u64,
    pub compression_version: u32,
}

impl YxdbHeader {
    /// Parse a header from the first 512 bytes of the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if `buf` is shorter than
    /// [`HEADER_SIZE`].
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        let raw_description = &buf[..DESCRIPTION_LEN];
        let text_len = raw_description
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(DESCRIPTION_LEN);
        let description = String::from_utf8_lossy(&raw_description[..text_len]).into_owned();

        Ok(Self {
            description,
            file_id: read_u32(buf, FILE_ID_OFFSET),
            created_at: read_u32(buf, CREATED_AT_OFFSET),
            metadata_len: read_u32(buf, METADATA_LEN_OFFSET),
            record_block_index_offset: read_u64(buf, BLOCK_INDEX_OFFSET),
            record_count: read_u64(buf, RECORD_COUNT_OFFSET),
            compression_version: read_u32(buf, COMPRESSION_VERSION_OFFSET),
        })
    }

    /// Write the 512-byte header into the provided buffer.
    ///
    /// The description is truncated to 64 bytes. Bytes the format does not
    /// define are zeroed.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if `buf` is shorter than
    /// [`HEADER_SIZE`].
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        buf[..HEADER_SIZE].fill(0);
        let description = self.description.as_bytes();
        let n = description.len().min(DESCRIPTION_LEN);
        buf[..n].copy_from_slice(&description[..n]);

        buf[FILE_ID_OFFSET..FILE_ID_OFFSET + 4].copy_from_slice(&self.file_id.to_le_bytes());
        buf[CREATED_AT_OFFSET..CREATED_AT_OFFSET + 4]
            .copy_from_slice(&self.created_at.to_le_bytes());
        buf[METADATA_LEN_OFFSET..METADATA_LEN_OFFSET + 4]
            .copy_from_slice(&self.metadata_len.to_le_bytes());
        buf[BLOCK_INDEX_OFFSET..BLOCK_INDEX_OFFSET + 8]
            .copy_from_slice(&self.record_block_index_offset.to_le_bytes());
        buf[RECORD_COUNT_OFFSET..RECORD_COUNT_OFFSET + 8]
            .copy_from_slice(&self.record_count.to_le_bytes());
        buf[COMPRESSION_VERSION_OFFSET..COMPRESSION_VERSION_OFFSET + 4]
            .copy_from_slice(&self.compression_version.to_le_bytes());

        Ok(())
    }

    /// Byte length of the UTF-16 metadata blob that follows the header.
    #[must_use]
    pub fn metadata_byte_len(&self) -> u64 {
        u64::from(self.metadata_len) * 2
    }

    /// File offset of the first record block.
    #[must_use]
    pub fn data_offset(&self) -> u64 {
        HEADER_SIZE as u64 + self.metadata_byte_len()
    }
}

// Callers have already checked `buf.len() >= HEADER_SIZE`, and every
// offset constant plus its width is below that, so the slices are in range.
fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> YxdbHeader {
        YxdbHeader {
            description: "Alteryx Database File".to_string(),
            file_id: 0x0044_0049,
            created_at: 1_577_836_800,
            metadata_len: 321,
            record_block_index_offset: 0x0001_2345,
            record_count: 8716,
            compression_version: 1,
        }
    }

    #[test]
    fn fields_land_at_documented_offsets() {
        let mut buf = [0u8; HEADER_SIZE];
        sample().write_to(&mut buf).unwrap();

        assert_eq!(&buf[..21], b"Alteryx Database File");
        assert_eq!(buf[21], 0);
        assert_eq!(&buf[64..68], &0x0044_0049u32.to_le_bytes());
        assert_eq!(&buf[80..84], &321u32.to_le_bytes());
        assert_eq!(&buf[104..112], &8716u64.to_le_bytes());
        assert_eq!(&buf[112..116], &1u32.to_le_bytes());
    }

    #[test]
    fn read_back_written_header() {
        let mut buf = [0u8; HEADER_SIZE];
        sample().write_to(&mut buf).unwrap();
        assert_eq!(YxdbHeader::read_from(&buf).unwrap(), sample());
    }

    #[test]
    fn description_without_nul_uses_all_64_bytes() {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..DESCRIPTION_LEN].fill(b'x');
        let header = YxdbHeader::read_from(&buf).unwrap();
        assert_eq!(header.description.len(), DESCRIPTION_LEN);
    }

    #[test]
    fn undefined_bytes_are_ignored() {
        let mut buf = [0xAAu8; HEADER_SIZE];
        buf[..DESCRIPTION_LEN].fill(0);
        buf[104..112].copy_from_slice(&3u64.to_le_bytes());
        let header = YxdbHeader::read_from(&buf).unwrap();
        assert_eq!(header.record_count, 3);
        assert_eq!(header.description, "");
    }

    #[test]
    fn data_offset_follows_metadata() {
        let header = sample();
        assert_eq!(header.metadata_byte_len(), 642);
        assert_eq!(header.data_offset(), 512 + 642);
    }

    #[test]
    fn reject_buffer_too_short() {
        let buf = [0u8; 100];
        let result = YxdbHeader::read_from(&buf);
        assert!(matches!(result, Err(WireError::UnexpectedEof { offset: 100 })));
    }
}
