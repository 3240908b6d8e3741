#![warn(clippy::pedantic)]

pub mod block_frame;
pub mod error;
pub mod header;
pub mod lzf;

pub use block_frame::{BLOCK_SIZE, BlockPrefix, OUTPUT_CAPACITY};
pub use error::WireError;
pub use header::{HEADER_SIZE, YxdbHeader};
