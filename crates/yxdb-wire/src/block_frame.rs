use std::io::{ErrorKind, Read, Write};

use crate::error::WireError;

/// Nominal decompressed size of one record block (256 KiB).
///
/// Records longer than this are "long records" and are reassembled
/// across several blocks by the reader.
pub const BLOCK_SIZE: usize = 0x40000;

/// Capacity of the reader's output window: two nominal blocks.
///
/// A refill keeps the unconsumed tail of the previous block (always less
/// than one block) and appends one decompressed block after it.
pub const OUTPUT_CAPACITY: usize = BLOCK_SIZE * 2;

/// Size of the little-endian length prefix in front of every block.
pub const PREFIX_SIZE: usize = 4;

/// The 4-byte length-and-flag word that precedes every block payload.
///
/// Bit layout:
///   bit 31     = payload is stored uncompressed
///   bits 0-30  = payload length when stored
///   bits 0-31  = compressed payload length when bit 31 is clear
///
/// ```text
/// ┌──────────────────────────────┬────────────────────────┐
/// │ prefix (u32 LE)              │ payload                │
/// ├──────────────────────────────┼────────────────────────┤
/// │ 0x8000_0010                  │ 16 raw bytes           │
/// │ 0x0000_0010                  │ 16 LZF-compressed bytes│
/// └──────────────────────────────┴────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockPrefix(u32);

impl BlockPrefix {
    /// Bit marking a payload that is stored without compression.
    pub const STORED: u32 = 0x8000_0000;

    /// Create a prefix from the raw little-endian word.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Prefix for an LZF-compressed payload of `len` bytes.
    pub fn compressed(len: u32) -> Self {
        Self(len & !Self::STORED)
    }

    /// Prefix for an uncompressed payload of `len` bytes.
    pub fn stored(len: u32) -> Self {
        Self(len | Self::STORED)
    }

    /// Get the underlying word.
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_compressed(self) -> bool {
        self.0 & Self::STORED == 0
    }

    /// Number of payload bytes following the prefix.
    pub fn payload_len(self) -> usize {
        (self.0 & !Self::STORED) as usize
    }

    /// Largest payload this prefix kind may declare.
    ///
    /// A compressed payload never exceeds one nominal block. A stored
    /// payload is copied straight into the output window.
    pub fn payload_limit(self) -> usize {
        if self.is_compressed() {
            BLOCK_SIZE
        } else {
            OUTPUT_CAPACITY
        }
    }
}

/// Read the next block from `reader` into `payload`.
///
/// `payload` is cleared and resized to the payload length, so one buffer
/// can be reused for every block in a file.
///
/// # Returns
///
/// `Some(prefix)` when a block was read, `None` when the reader was
/// already at end of input.
///
/// # Errors
///
/// - [`WireError::UnexpectedEof`] if the input ends inside the prefix.
/// - [`WireError::BlockTooLarge`] if the declared length exceeds
///   [`BlockPrefix::payload_limit`].
/// - [`WireError::Io`] for read failures, including a payload cut short.
pub fn read_block(
    reader: &mut impl Read,
    payload: &mut Vec<u8>,
) -> Result<Option<BlockPrefix>, WireError> {
    let mut word = [0u8; PREFIX_SIZE];
    let filled = read_up_to(reader, &mut word)?;
    if filled == 0 {
        return Ok(None);
    }
    if filled < PREFIX_SIZE {
        return Err(WireError::UnexpectedEof { offset: filled });
    }

    let prefix = BlockPrefix::from_raw(u32::from_le_bytes(word));
    let len = prefix.payload_len();
    if len > prefix.payload_limit() {
        return Err(WireError::BlockTooLarge {
            len,
            limit: prefix.payload_limit(),
        });
    }

    payload.clear();
    payload.resize(len, 0);
    reader.read_exact(payload)?;
    Ok(Some(prefix))
}

/// Write one block (prefix + payload) to `writer`.
///
/// # Returns
///
/// Total number of bytes written.
pub fn write_block(
    writer: &mut impl Write,
    prefix: BlockPrefix,
    payload: &[u8],
) -> Result<usize, WireError> {
    writer.write_all(&prefix.raw().to_le_bytes())?;
    writer.write_all(payload)?;
    Ok(PREFIX_SIZE + payload.len())
}

/// Fill `buf` from `reader` until it is full or the reader hits EOF.
///
/// Unlike `read_exact`, a short read is not an error; the caller gets the
/// number of bytes actually read.
///
/// # Errors
///
/// Propagates any I/O error other than `Interrupted`.
pub fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
