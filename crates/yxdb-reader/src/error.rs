use yxdb_types::SchemaError;
use yxdb_wire::WireError;

/// Errors that can occur while opening or streaming a YXDB file.
///
/// Open-time failures are returned directly from
/// [`YxdbReader::open`](crate::YxdbReader::open). Failures while streaming
/// end iteration and are kept by the reader, available through
/// [`YxdbReader::last_error`](crate::YxdbReader::last_error).
///
/// Error hierarchy:
///
/// ```text
///   ReadError
///   ├── TruncatedHeader          ← file shorter than the 512-byte header
///   ├── TruncatedMetadata        ← metadata blob cut short
///   ├── MalformedSchema(..)      ← metadata text is not a usable schema
///   ├── WorkerPanicked           ← the prefetch thread panicked
///   ├── Wire(WireError)          ← block framing or LZF decompression
///   └── Io(std::io::Error)       ← open/read failures, at open or mid-stream
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
  /// Fewer than 512 bytes were available for the header.
  #[error("header truncated: expected {expected} bytes, found {found}")]
  TruncatedHeader { expected: usize, found: usize },

  /// The metadata blob is shorter than the header declares.
  ///
  /// Both counts are bytes (twice the header's UTF-16 unit count).
  #[error("metadata truncated: expected {expected} bytes, found {found}")]
  TruncatedMetadata { expected: u64, found: u64 },

  /// The metadata text failed to parse, with and without the `MetaInfo`
  /// wrapper. Carries the failure of the unwrapped attempt.
  #[error("malformed schema: {0}")]
  MalformedSchema(#[from] SchemaError),

  /// The background prefetch thread panicked.
  #[error("prefetch worker panicked")]
  WorkerPanicked,

  /// A block could not be framed or decompressed.
  ///
  /// Covers `OutputTooSmall`, `InvalidBackReference`, `TruncatedBlock`,
  /// `BlockTooLarge` and `UnexpectedEof`. I/O failures hit while reading a
  /// block are reported as [`ReadError::Io`] instead.
  #[error(transparent)]
  Wire(WireError),

  /// An I/O error opening or reading the file.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl From<WireError> for ReadError {
  fn from(e: WireError) -> Self {
    match e {
      WireError::Io(e) => Self::Io(e),
      other => Self::Wire(other),
    }
  }
}
