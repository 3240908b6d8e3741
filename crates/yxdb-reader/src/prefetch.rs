use std::io::Read;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::{debug, error, trace};
use yxdb_wire::WireError;
use yxdb_wire::block_frame::read_block;

use crate::error::ReadError;
use crate::source::{BlockSource, RAW_BUFFERS, RawBlock};

const WORKER_NAME: &str = "yxdb-prefetch";

/// Background block reader.
///
/// A single worker thread reads raw blocks from the file while the caller
/// decompresses and walks the previous one. The two sides are connected by
/// a pair of bounded channels:
///
/// ```text
///            blocks: bounded(1)
///   worker ─────────────────────────▶ consumer
///          ◀─────────────────────────
///            recycle: bounded(2)
/// ```
///
/// Only [`RAW_BUFFERS`] payload buffers exist. The worker must get one
/// back through `recycle` before it can read another block, so it never
/// runs more than one block ahead of the consumer.
///
/// Dropping the prefetcher (or calling [`BlockSource::close`]) disconnects
/// both channels, which unblocks the worker wherever it waits, and then
/// joins the thread.
pub struct Prefetcher {
  blocks: Option<Receiver<Result<RawBlock, WireError>>>,
  recycle: Option<Sender<Vec<u8>>>,
  worker: Option<JoinHandle<()>>,
}

impl Prefetcher {
  /// Start the worker thread reading blocks from `reader`.
  ///
  /// # Errors
  ///
  /// Returns [`ReadError::Io`] if the thread could not be spawned.
  pub fn spawn<R>(reader: R) -> Result<Self, ReadError>
  where
    R: Read + Send + 'static,
  {
    let (block_tx, block_rx) = bounded(1);
    let (recycle_tx, recycle_rx) = bounded(RAW_BUFFERS);

    let worker = thread::Builder::new()
      .name(WORKER_NAME.to_string())
      .spawn(move || worker_loop(reader, &block_tx, &recycle_rx))?;

    Ok(Self {
      blocks: Some(block_rx),
      recycle: Some(recycle_tx),
      worker: Some(worker),
    })
  }

  fn shutdown(&mut self) -> Result<(), ReadError> {
    self.blocks.take();
    self.recycle.take();
    match self.worker.take() {
      Some(handle) => handle.join().map_err(|_| ReadError::WorkerPanicked),
      None => Ok(()),
    }
  }
}

impl BlockSource for Prefetcher {
  fn next_block(&mut self) -> Result<Option<RawBlock>, ReadError> {
    let Some(blocks) = &self.blocks else {
      return Ok(None);
    };
    match blocks.recv() {
      Ok(Ok(block)) => Ok(Some(block)),
      Ok(Err(e)) => Err(e.into()),
      // Worker finished and closed its end.
      Err(_) => match self.shutdown() {
        Ok(()) => Ok(None),
        Err(e) => Err(e),
      },
    }
  }

  fn recycle(&mut self, block: RawBlock) {
    if let Some(recycle) = &self.recycle {
      // Fails only once the worker has stopped.
      let _ = recycle.try_send(block.bytes);
    }
  }

  fn close(&mut self) -> Result<(), ReadError> {
    self.shutdown()
  }
}

impl Drop for Prefetcher {
  fn drop(&mut self) {
    if let Err(e) = self.shutdown() {
      error!(error = %e, "prefetch worker did not shut down cleanly");
    }
  }
}

fn worker_loop<R: Read>(
  mut reader: R,
  blocks: &Sender<Result<RawBlock, WireError>>,
  recycle: &Receiver<Vec<u8>>,
) {
  debug!("prefetch worker started");
  let mut pool: Vec<Vec<u8>> = (0..RAW_BUFFERS).map(|_| Vec::new()).collect();
  let mut sent: u64 = 0;

  loop {
    let mut bytes = match pool.pop() {
      Some(bytes) => bytes,
      None => match recycle.recv() {
        Ok(bytes) => bytes,
        Err(_) => break,
      },
    };

    match read_block(&mut reader, &mut bytes) {
      Ok(Some(prefix)) => {
        trace!(block = sent, len = bytes.len(), compressed = prefix.is_compressed(), "prefetched block");
        let block = RawBlock {
          bytes,
          compressed: prefix.is_compressed(),
        };
        if blocks.send(Ok(block)).is_err() {
          break;
        }
        sent += 1;
      }
      Ok(None) => break,
      Err(e) => {
        error!(block = sent, error = %e, "prefetch read failed");
        let _ = blocks.send(Err(e));
        break;
      }
    }
  }

  debug!(blocks = sent, "prefetch worker stopped");
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::{self, Cursor};
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use yxdb_wire::BlockPrefix;
  use yxdb_wire::block_frame::write_block;

  fn stored_blocks(payloads: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for payload in payloads {
      let len = u32::try_from(payload.len()).unwrap();
      write_block(&mut out, BlockPrefix::stored(len), payload).unwrap();
    }
    out
  }

  /// Counts every block prefix the worker reads.
  struct CountingReader {
    inner: Cursor<Vec<u8>>,
    reads: Arc<AtomicUsize>,
  }

  impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
      if buf.len() == 4 {
        self.reads.fetch_add(1, Ordering::SeqCst);
      }
      self.inner.read(buf)
    }
  }

  #[test]
  fn delivers_blocks_then_end() {
    let data = stored_blocks(&[b"one", b"two", b"three"]);
    let mut prefetch = Prefetcher::spawn(Cursor::new(data)).unwrap();
    let mut seen = Vec::new();
    while let Some(block) = prefetch.next_block().unwrap() {
      seen.push(block.bytes.clone());
      prefetch.recycle(block);
    }
    assert_eq!(seen, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    assert!(prefetch.next_block().unwrap().is_none());
    prefetch.close().unwrap();
  }

  #[test]
  fn forwards_read_errors() {
    let mut data = stored_blocks(&[b"ok"]);
    data.push(9);
    let mut prefetch = Prefetcher::spawn(Cursor::new(data)).unwrap();
    let first = prefetch.next_block().unwrap().unwrap();
    prefetch.recycle(first);
    assert!(matches!(
      prefetch.next_block(),
      Err(ReadError::Wire(WireError::UnexpectedEof { offset: 1 }))
    ));
  }

  #[test]
  fn stays_at_most_one_block_ahead() {
    let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 16]).collect();
    let refs: Vec<&[u8]> = payloads.iter().map(Vec::as_slice).collect();
    let reads = Arc::new(AtomicUsize::new(0));
    let reader = CountingReader {
      inner: Cursor::new(stored_blocks(&refs)),
      reads: Arc::clone(&reads),
    };

    let mut prefetch = Prefetcher::spawn(reader).unwrap();
    let held = prefetch.next_block().unwrap().unwrap();
    // Without recycling, the worker can fill the channel slot and then
    // has no buffer left.
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert!(reads.load(Ordering::SeqCst) <= 2);
    prefetch.recycle(held);
    drop(prefetch);
  }

  #[test]
  fn drop_unblocks_waiting_worker() {
    let payloads: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; 8]).collect();
    let refs: Vec<&[u8]> = payloads.iter().map(Vec::as_slice).collect();
    let mut prefetch = Prefetcher::spawn(Cursor::new(stored_blocks(&refs))).unwrap();
    let _first = prefetch.next_block().unwrap().unwrap();
    // Worker is parked on a full channel or an empty pool.
    drop(prefetch);
  }
}
