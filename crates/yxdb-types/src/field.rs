use crate::field_type::FieldType;

/// One `<Field>` element from the metadata's `RecordInfo` list.
///
/// Attributes that are absent in the XML default to an empty string or
/// zero. `source` records how the upstream tool produced the column and
/// is informational only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
  pub name: String,
  pub source: String,
  pub field_type: FieldType,
  pub size: u32,
  pub scale: u32,
}

impl FieldDescriptor {
  /// Descriptor with an empty source and zero scale.
  pub fn new(name: impl Into<String>, field_type: FieldType, size: u32) -> Self {
    Self {
      name: name.into(),
      source: String::new(),
      field_type,
      size,
      scale: 0,
    }
  }

  /// Bytes this field occupies in the fixed part of a record.
  #[must_use]
  pub fn fixed_footprint(&self) -> u32 {
    self.field_type.fixed_footprint(self.size)
  }
}
