use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, trace, warn};
use yxdb_types::{RecordLayout, Schema};
use yxdb_wire::{BLOCK_SIZE, YxdbHeader};

use crate::buffer::{LongRecordBuffer, OutputBuffer};
use crate::config::{PrefetchMode, ReaderConfig};
use crate::error::ReadError;
use crate::metadata::{FileMetadata, read_metadata};
use crate::prefetch::Prefetcher;
use crate::source::{BlockSource, InlineBlocks};

/// Where the cursor stands.
///
/// ```text
///   BeforeFirst ──advance──▶ Positioned(1) ──advance──▶ Positioned(2) ...
///        │                      │
///        └──────────┬───────────┘
///                   ▼
///        Exhausted  (record_count reached, or data ended early)
///        Faulted    (block could not be read or decompressed)
/// ```
///
/// `Exhausted` and `Faulted` are terminal.
#[derive(Debug)]
pub enum CursorState {
    BeforeFirst,
    /// On a record; carries the number of records produced so far,
    /// the same value [`YxdbReader::position`] reports.
    Positioned(u64),
    Exhausted,
    Faulted(ReadError),
}

/// Location of the current record's bytes.
#[derive(Clone, Copy, Debug)]
enum Current {
    None,
    /// At the front of the output window.
    Output { len: usize },
    /// In the long-record buffer.
    Long,
}

/// Streaming, forward-only reader over the records of a YXDB file.
///
/// Opening a file reads the header and schema eagerly. Records are then
/// produced one at a time by [`advance`](Self::advance); each record is a
/// borrowed slice that stays valid until the next call to `advance`.
///
/// ```no_run
/// use yxdb_reader::YxdbReader;
///
/// let mut reader = YxdbReader::open("data.yxdb")?;
/// while let Some(record) = reader.next_record() {
///     println!("{} bytes", record.len());
/// }
/// if let Some(e) = reader.last_error() {
///     eprintln!("stopped early: {e}");
/// }
/// reader.close()?;
/// # Ok::<(), yxdb_reader::ReadError>(())
/// ```
///
/// Records no longer than one block are returned straight out of the
/// output buffer. Longer ones are copied together into a separate buffer
/// that grows as needed; [`is_long_record`](Self::is_long_record) reports
/// which path the current record took.
pub struct YxdbReader {
    header: YxdbHeader,
    schema: Schema,
    schema_text: String,
    layout: RecordLayout,
    source: Box<dyn BlockSource>,
    output: OutputBuffer,
    long_record: LongRecordBuffer,
    state: CursorState,
    current: Current,
    position: u64,
}

impl YxdbReader {
    /// Open the file at `path` with the default configuration.
    ///
    /// # Errors
    ///
    /// - [`ReadError::Io`] if the file cannot be opened.
    /// - Any error from reading the header or metadata.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Open the file at `path`.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: ReaderConfig,
    ) -> Result<Self, ReadError> {
        let path = path.as_ref();
        debug!(path = %path.display(), prefetch = ?config.prefetch, "opening yxdb file");
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), config)
    }

    /// Build a reader over any byte source positioned at the file header.
    ///
    /// Block reads are limited to the data region: bytes from the end of
    /// the metadata up to the record block index (when the header places
    /// the index after the data).
    ///
    /// # Errors
    ///
    /// - [`ReadError::TruncatedHeader`] / [`ReadError::TruncatedMetadata`]
    /// - [`ReadError::MalformedSchema`]
    /// - [`ReadError::Io`], including failure to start the prefetch thread.
    pub fn from_reader<R>(mut reader: R, config: ReaderConfig) -> Result<Self, ReadError>
    where
        R: Read + Send + 'static,
    {
        let FileMetadata {
            header,
            schema,
            schema_text,
            layout,
        } = read_metadata(&mut reader)?;

        let data = reader.take(data_region_len(&header));
        let source: Box<dyn BlockSource> = match config.prefetch {
            PrefetchMode::Background => Box::new(Prefetcher::spawn(data)?),
            PrefetchMode::Inline => Box::new(InlineBlocks::new(data)),
        };

        Ok(Self {
            header,
            schema,
            schema_text,
            layout,
            source,
            output: OutputBuffer::new(),
            long_record: LongRecordBuffer::default(),
            state: CursorState::BeforeFirst,
            current: Current::None,
            position: 0,
        })
    }

    // ── Metadata ────────────────────────────────────────────────────────

    #[must_use]
    pub fn header(&self) -> &YxdbHeader {
        &self.header
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The metadata XML as it was parsed, including a `MetaInfo` wrapper
    /// if one had to be added.
    #[must_use]
    pub fn schema_text(&self) -> &str {
        &self.schema_text
    }

    #[must_use]
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Record count declared by the header.
    #[must_use]
    pub fn record_count(&self) -> u64 {
        self.header.record_count
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    /// Move to the next record.
    ///
    /// Returns `false` once the declared record count has been produced,
    /// when the block data ends early, or on an error. Errors are kept and
    /// can be read with [`last_error`](Self::last_error); after any `false`
    /// every later call also returns `false`.
    pub fn advance(&mut self) -> bool {
        match self.state {
            CursorState::BeforeFirst | CursorState::Positioned(_) => {}
            CursorState::Exhausted | CursorState::Faulted(_) => return false,
        }

        if let Current::Output { len } = self.current {
            self.output.consume(len);
        }
        self.current = Current::None;

        if self.position >= self.header.record_count {
            self.state = CursorState::Exhausted;
            return false;
        }

        match self.load_record() {
            Ok(true) => {
                self.position += 1;
                self.state = CursorState::Positioned(self.position);
                true
            }
            Ok(false) => {
                warn!(
                    read = self.position,
                    declared = self.header.record_count,
                    "block data ended before the declared record count"
                );
                self.state = CursorState::Exhausted;
                false
            }
            Err(e) => {
                warn!(record = self.position, error = %e, "record stream failed");
                self.state = CursorState::Faulted(e);
                false
            }
        }
    }

    /// Bytes of the current record.
    ///
    /// Empty before the first [`advance`](Self::advance) and once the
    /// cursor has stopped.
    #[must_use]
    pub fn record(&self) -> &[u8] {
        match self.current {
            Current::Output { len } => &self.output.window()[..len],
            Current::Long => self.long_record.as_slice(),
            Current::None => &[],
        }
    }

    /// [`advance`](Self::advance) and return the new record.
    pub fn next_record(&mut self) -> Option<&[u8]> {
        if self.advance() {
            Some(self.record())
        } else {
            None
        }
    }

    /// Number of records produced so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// True if the current record was assembled in the long-record buffer.
    #[must_use]
    pub fn is_long_record(&self) -> bool {
        matches!(self.current, Current::Long)
    }

    #[must_use]
    pub fn state(&self) -> &CursorState {
        &self.state
    }

    /// The error that stopped the cursor, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&ReadError> {
        match &self.state {
            CursorState::Faulted(e) => Some(e),
            _ => None,
        }
    }

    /// Stop the prefetch worker and release the file.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::WorkerPanicked`] if the worker thread panicked.
    pub fn close(mut self) -> Result<(), ReadError> {
        self.source.close()
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Load the next record. `Ok(false)` means the blocks ran out first.
    fn load_record(&mut self) -> Result<bool, ReadError> {
        let header_len = self.layout.header_len();
        if header_len > BLOCK_SIZE {
            return self.load_long_record(None);
        }

        if !self.fill_to(header_len)? {
            return Ok(false);
        }
        let var_len = read_var_len(self.layout, self.output.window());
        let record_len = self.layout.record_len(var_len);
        if record_len > BLOCK_SIZE {
            return self.load_long_record(Some(record_len));
        }

        if !self.fill_to(record_len)? {
            return Ok(false);
        }
        self.current = Current::Output { len: record_len };
        Ok(true)
    }

    /// Copy a record into the long-record buffer across as many blocks as
    /// it spans. `record_len` is `None` when the fixed prefix itself does
    /// not fit in one block and the length is not yet known.
    fn load_long_record(&mut self, record_len: Option<usize>) -> Result<bool, ReadError> {
        let header_len = self.layout.header_len();
        self.long_record.start(record_len.unwrap_or(header_len));

        let record_len = match record_len {
            Some(len) => len,
            None => {
                if !self.copy_into_long_record(header_len)? {
                    return Ok(false);
                }
                let var_len = read_var_len(self.layout, self.long_record.as_slice());
                self.layout.record_len(var_len)
            }
        };

        if !self.copy_into_long_record(record_len)? {
            return Ok(false);
        }
        trace!(record = self.position, len = record_len, "assembled long record");
        self.current = Current::Long;
        Ok(true)
    }

    /// Move bytes from the output window into the long-record buffer until
    /// it holds `target` bytes.
    fn copy_into_long_record(&mut self, target: usize) -> Result<bool, ReadError> {
        loop {
            let wanted = target - self.long_record.len();
            let take = wanted.min(self.output.available());
            self.long_record
                .extend_from_slice(&self.output.window()[..take]);
            self.output.consume(take);
            if self.long_record.len() == target {
                return Ok(true);
            }
            if !self.refill()? {
                return Ok(false);
            }
        }
    }

    /// Refill until at least `needed` bytes are available.
    fn fill_to(&mut self, needed: usize) -> Result<bool, ReadError> {
        while self.output.available() < needed {
            if !self.refill()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Append one block to the output buffer. `Ok(false)` at end of data.
    fn refill(&mut self) -> Result<bool, ReadError> {
        let Some(block) = self.source.next_block()? else {
            return Ok(false);
        };
        let result = self.output.refill(&block);
        let compressed = block.compressed;
        let raw_len = block.bytes.len();
        self.source.recycle(block);
        let written = result?;
        trace!(
            raw_len,
            compressed,
            written,
            available = self.output.available(),
            "refilled output buffer"
        );
        Ok(true)
    }
}

/// Variable-data length stored after the fixed prefix, or 0 when the
/// layout has no variable fields.
fn read_var_len(layout: RecordLayout, record: &[u8]) -> u32 {
    if !layout.has_variable_field {
        return 0;
    }
    let at = layout.fixed_size as usize;
    record
        .get(at..at + 4)
        .and_then(|word| word.try_into().ok())
        .map_or(0, u32::from_le_bytes)
}

/// Bytes between the end of the metadata and the record block index.
fn data_region_len(header: &YxdbHeader) -> u64 {
    let data_offset = header.data_offset();
    if header.record_block_index_offset > data_offset {
        header.record_block_index_offset - data_offset
    } else {
        u64::MAX
    }
}
