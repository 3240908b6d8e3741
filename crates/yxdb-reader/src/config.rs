/// Configuration for a [`YxdbReader`](crate::YxdbReader).
///
/// ```text
/// ┌──────────┬───────────────────────────────────────────────────┐
/// │ Field    │ Purpose                                           │
/// ├──────────┼───────────────────────────────────────────────────┤
/// │ prefetch │ Read blocks on a background thread or inline      │
/// └──────────┴───────────────────────────────────────────────────┘
/// ```
///
/// Both prefetch modes yield the same records in the same order; the
/// choice only changes whether disk reads overlap decompression.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReaderConfig {
    pub prefetch: PrefetchMode,
}

impl ReaderConfig {
    /// Configuration that reads every block on the calling thread.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            prefetch: PrefetchMode::Inline,
        }
    }
}

/// Where raw blocks are read from the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrefetchMode {
    /// One worker thread reads the next block while the caller works on
    /// the current one. The default.
    #[default]
    Background,
    /// Blocks are read synchronously when the cursor needs more bytes.
    Inline,
}
