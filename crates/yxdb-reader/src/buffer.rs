use yxdb_wire::{OUTPUT_CAPACITY, WireError, lzf};

use crate::source::RawBlock;

/// Decompressed bytes waiting to be walked by the record cursor.
///
/// The buffer has a fixed capacity of two blocks. Bytes in
/// `pos..filled` are unconsumed. A refill moves them to the front and
/// appends the next block directly after them, so a record split across
/// two blocks ends up contiguous.
///
/// ```text
///  before refill:  [ consumed ......... | tail ]
///                                        pos    filled
///  after refill:   [ tail | next block ........... ]
///                  0      delta                   filled
/// ```
pub struct OutputBuffer {
  buf: Vec<u8>,
  pos: usize,
  filled: usize,
}

impl OutputBuffer {
  #[must_use]
  pub fn new() -> Self {
    Self::with_capacity(OUTPUT_CAPACITY)
  }

  #[must_use]
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      buf: vec![0; capacity],
      pos: 0,
      filled: 0,
    }
  }

  #[must_use]
  pub fn capacity(&self) -> usize {
    self.buf.len()
  }

  /// Number of unconsumed bytes.
  #[must_use]
  pub fn available(&self) -> usize {
    self.filled - self.pos
  }

  /// The unconsumed bytes.
  #[must_use]
  pub fn window(&self) -> &[u8] {
    &self.buf[self.pos..self.filled]
  }

  /// Mark `n` bytes as consumed. Clamped to what is available.
  pub fn consume(&mut self, n: usize) {
    self.pos += n.min(self.available());
  }

  /// Shift the unconsumed tail to the front and append `block`.
  ///
  /// Compressed blocks are decompressed straight into the free space
  /// behind the tail; stored blocks are copied.
  ///
  /// # Returns
  ///
  /// Number of bytes the block contributed.
  ///
  /// # Errors
  ///
  /// - [`WireError::OutputTooSmall`] if the block does not fit behind the
  ///   tail.
  /// - Any LZF error from [`lzf::decompress`].
  pub fn refill(&mut self, block: &RawBlock) -> Result<usize, WireError> {
    let delta = self.available();
    self.buf.copy_within(self.pos..self.filled, 0);
    self.pos = 0;
    self.filled = delta;

    let free = &mut self.buf[delta..];
    let written = if block.compressed {
      lzf::decompress(&block.bytes, free)?
    } else {
      let len = block.bytes.len();
      if len > free.len() {
        return Err(WireError::OutputTooSmall {
          needed: delta + len,
          capacity: self.buf.len(),
        });
      }
      free[..len].copy_from_slice(&block.bytes);
      len
    };

    self.filled = delta + written;
    Ok(written)
  }
}

impl Default for OutputBuffer {
  fn default() -> Self {
    Self::new()
  }
}

/// Assembly area for records longer than one block.
///
/// Grows to fit the longest record seen and is never shrunk, so a file
/// with many long records allocates once.
#[derive(Default)]
pub struct LongRecordBuffer {
  buf: Vec<u8>,
}

impl LongRecordBuffer {
  /// Forget the previous record and make room for `expected` bytes.
  ///
  /// At most one output window is reserved up front, whatever the length
  /// word claims. Beyond that the buffer grows with the bytes appended.
  pub fn start(&mut self, expected: usize) {
    self.buf.clear();
    self.buf.reserve(expected.min(OUTPUT_CAPACITY));
  }

  pub fn extend_from_slice(&mut self, bytes: &[u8]) {
    self.buf.extend_from_slice(bytes);
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.buf.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.buf.is_empty()
  }

  #[must_use]
  pub fn as_slice(&self) -> &[u8] {
    &self.buf
  }

  #[must_use]
  pub fn capacity(&self) -> usize {
    self.buf.capacity()
  }
}
