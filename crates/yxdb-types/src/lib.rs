#![warn(clippy::pedantic)]

pub mod error;
pub mod field;
pub mod field_type;
pub mod layout;
pub mod schema;

pub use error::SchemaError;
pub use field::FieldDescriptor;
pub use field_type::FieldType;
pub use layout::RecordLayout;
pub use schema::{ParsedMetadata, Schema, parse_metadata, parse_strict, wrap_metadata};
