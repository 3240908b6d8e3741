/// Errors that can occur when turning metadata text into a [`Schema`].
///
/// The metadata blob is a small XML document. Syntax problems come from
/// `quick-xml`; the remaining variants are structural checks on top of a
/// syntactically valid document.
///
/// # Error hierarchy
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ SchemaError (this crate)                            │
/// │   ├── Xml for syntax errors reported by quick-xml   │
/// │   ├── EmptyDocument when no element is present      │
/// │   ├── UnexpectedRoot when the root is not MetaInfo  │
/// │   ├── UnclosedElement for input ending mid-element  │
/// │   ├── MissingRecordInfo when no field list exists   │
/// │   └── InvalidAttribute for non-numeric size/scale   │
/// └─────────────────────────────────────────────────────┘
/// ```
///
/// [`Schema`]: crate::schema::Schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
  /// The text is not well-formed XML.
  #[error("metadata is not well-formed XML: {0}")]
  Xml(#[from] quick_xml::Error),

  /// The text contains no element at all.
  #[error("metadata contains no XML element")]
  EmptyDocument,

  /// The root element is something other than `MetaInfo`.
  ///
  /// Older files put `RecordInfo` at the root. This is the failure that
  /// triggers the wrapper retry in [`parse_metadata`](crate::schema::parse_metadata).
  #[error("expected root element <MetaInfo>, found <{found}>")]
  UnexpectedRoot { found: String },

  /// The input ended while an element was still open.
  #[error("element <{name}> is never closed")]
  UnclosedElement { name: String },

  /// `MetaInfo` has no `RecordInfo` child.
  #[error("metadata has no <RecordInfo> element")]
  MissingRecordInfo,

  /// A numeric attribute on a `Field` element could not be parsed.
  #[error("field {field:?} has invalid {attribute} attribute {value:?}")]
  InvalidAttribute {
    field: String,
    attribute: &'static str,
    value: String,
  },
}
