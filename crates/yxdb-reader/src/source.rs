use std::io::Read;

use yxdb_wire::block_frame::read_block;

use crate::error::ReadError;

/// Number of raw block buffers kept in rotation.
pub const RAW_BUFFERS: usize = 2;

/// One block as it appears on disk, without its length prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawBlock {
  pub bytes: Vec<u8>,
  /// True if `bytes` is LZF-compressed, false if stored.
  pub compressed: bool,
}

/// Supplier of raw blocks in file order.
///
/// The record cursor asks for a block whenever its output buffer runs
/// short, and hands the spent block back through [`recycle`] once the
/// bytes have been decompressed.
///
/// [`recycle`]: BlockSource::recycle
pub trait BlockSource: Send {
  /// Return the next block, or `None` once the data region is exhausted.
  ///
  /// # Errors
  ///
  /// Returns a [`ReadError`] if the block could not be read or framed.
  fn next_block(&mut self) -> Result<Option<RawBlock>, ReadError>;

  /// Give a consumed block's buffer back for reuse.
  fn recycle(&mut self, block: RawBlock) {
    drop(block);
  }

  /// Stop producing blocks and release any background resources.
  ///
  /// # Errors
  ///
  /// Returns [`ReadError::WorkerPanicked`] if a worker thread panicked.
  fn close(&mut self) -> Result<(), ReadError> {
    Ok(())
  }
}

/// Reads blocks synchronously from `R` on the caller's thread.
pub struct InlineBlocks<R> {
  reader: R,
  spare: Vec<Vec<u8>>,
  done: bool,
}

impl<R: Read> InlineBlocks<R> {
  pub fn new(reader: R) -> Self {
    Self {
      reader,
      spare: Vec::with_capacity(RAW_BUFFERS),
      done: false,
    }
  }
}

impl<R: Read + Send> BlockSource for InlineBlocks<R> {
  fn next_block(&mut self) -> Result<Option<RawBlock>, ReadError> {
    if self.done {
      return Ok(None);
    }
    let mut bytes = self.spare.pop().unwrap_or_default();
    match read_block(&mut self.reader, &mut bytes) {
      Ok(Some(prefix)) => Ok(Some(RawBlock {
        bytes,
        compressed: prefix.is_compressed(),
      })),
      Ok(None) => {
        self.done = true;
        Ok(None)
      }
      Err(e) => {
        self.done = true;
        Err(e.into())
      }
    }
  }

  fn recycle(&mut self, block: RawBlock) {
    if self.spare.len() < RAW_BUFFERS {
      self.spare.push(block.bytes);
    }
  }
}
