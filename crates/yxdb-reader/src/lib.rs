#![warn(clippy::pedantic)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod metadata;
pub mod prefetch;
pub mod reader;
pub mod source;

pub use config::{PrefetchMode, ReaderConfig};
pub use error::ReadError;
pub use metadata::FileMetadata;
pub use reader::{CursorState, YxdbReader};
pub use source::{BlockSource, InlineBlocks, RawBlock};

pub use yxdb_types::{FieldDescriptor, FieldType, RecordLayout, Schema};
pub use yxdb_wire::{BLOCK_SIZE, YxdbHeader};
