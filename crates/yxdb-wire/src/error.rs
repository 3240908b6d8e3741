/// Errors raised while reading the raw YXDB byte layout.
///
/// These cover the fixed header, the block length prefix, and the LZF
/// token stream inside a compressed block. Higher layers wrap this type
/// (see `ReadError::Wire` in `yxdb-reader`).
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete header or block prefix could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// Decompressing the next token would write past the destination.
    ///
    /// Raised before any byte of the offending token is written, so the
    /// destination never holds a partially applied token.
    #[error("decompressed output needs {needed} bytes but capacity is {capacity}")]
    OutputTooSmall { needed: usize, capacity: usize },

    /// A back-reference points before the start of the decompressed output.
    #[error("back-reference at output position {position} reaches {distance} bytes back")]
    InvalidBackReference { position: usize, distance: usize },

    /// A token needs more input bytes than the block carries.
    #[error("compressed block truncated at input offset {offset}")]
    TruncatedBlock { offset: usize },

    /// A block length prefix declares more bytes than a block may hold.
    #[error("block payload of {len} bytes exceeds limit {limit}")]
    BlockTooLarge { len: usize, limit: usize },

    /// I/O error during read or write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

