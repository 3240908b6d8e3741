use crate::schema::Schema;

/// Size of the per-record variable-data length word.
pub const VAR_LEN_PREFIX_SIZE: u32 = 4;

/// Byte layout shared by every record of a file.
///
/// ```text
/// ┌────────────────────────┬──────────────────┬─────────────────────┐
/// │ fixed prefix           │ var length (u32) │ variable payload    │
/// │ fixed_size bytes       │ only if variable │ var length bytes    │
/// └────────────────────────┴──────────────────┴─────────────────────┘
/// ```
///
/// Derived once from the [`Schema`] when a file is opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordLayout {
  /// Sum of every field's fixed footprint, in schema order.
  pub fixed_size: u32,
  /// True if any field is variable-width.
  pub has_variable_field: bool,
}

impl RecordLayout {
  /// Compute the layout for a schema.
  ///
  /// Unknown field types add nothing to `fixed_size`.
  #[must_use]
  pub fn from_schema(schema: &Schema) -> Self {
    let mut fixed_size: u32 = 0;
    let mut has_variable_field = false;
    for field in schema {
      fixed_size = fixed_size.saturating_add(field.fixed_footprint());
      has_variable_field |= field.field_type.is_variable();
    }
    Self {
      fixed_size,
      has_variable_field,
    }
  }

  /// Bytes of the variable-length word: 4 when a variable field exists.
  #[must_use]
  pub fn var_len_prefix(self) -> u32 {
    if self.has_variable_field {
      VAR_LEN_PREFIX_SIZE
    } else {
      0
    }
  }

  /// Bytes every record has before its variable payload.
  #[must_use]
  pub fn header_len(self) -> usize {
    self.fixed_size as usize + self.var_len_prefix() as usize
  }

  /// Total length of a record whose variable payload is `var_len` bytes.
  #[must_use]
  pub fn record_len(self, var_len: u32) -> usize {
    self.header_len() + var_len as usize
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::field::FieldDescriptor;
  use crate::field_type::FieldType;

  fn schema(fields: &[(FieldType, u32)]) -> Schema {
    Schema::new(
      fields
        .iter()
        .enumerate()
        .map(|(i, (ty, size))| FieldDescriptor::new(format!("f{i}"), ty.clone(), *size))
        .collect(),
    )
  }

  #[test]
  fn tutorial_data_layout() {
    // UserID, First, Last, Prefix, Gender, Birth Date, Registration, Email, Country
    let layout = RecordLayout::from_schema(&schema(&[
      (FieldType::Int32, 0),
      (FieldType::VWString, 12),
      (FieldType::VWString, 19),
      (FieldType::VString, 12),
      (FieldType::String, 16),
      (FieldType::DateTime, 0),
      (FieldType::DateTime, 0),
      (FieldType::VWString, 35),
      (FieldType::String, 2),
    ]));
    assert_eq!(layout.fixed_size, 5 + 4 + 4 + 4 + 17 + 20 + 20 + 4 + 3);
    assert!(layout.has_variable_field);
    assert_eq!(layout.var_len_prefix(), 4);
    assert_eq!(layout.header_len(), 85);
  }

  #[test]
  fn fixed_only_layout_has_no_prefix() {
    let layout = RecordLayout::from_schema(&schema(&[(FieldType::Int32, 0), (FieldType::Bool, 0)]));
    assert_eq!(layout.fixed_size, 6);
    assert!(!layout.has_variable_field);
    assert_eq!(layout.record_len(0), 6);
  }

  #[test]
  fn unknown_types_contribute_zero() {
    let with_unknown = RecordLayout::from_schema(&schema(&[
      (FieldType::Int64, 0),
      (FieldType::Unknown("Time".into()), 8),
    ]));
    let without = RecordLayout::from_schema(&schema(&[(FieldType::Int64, 0)]));
    assert_eq!(with_unknown, without);
  }

  #[test]
  fn empty_schema() {
    let layout = RecordLayout::from_schema(&Schema::default());
    assert_eq!(layout, RecordLayout::default());
    assert_eq!(layout.header_len(), 0);
  }

  #[test]
  fn record_len_adds_variable_payload() {
    let layout = RecordLayout::from_schema(&schema(&[(FieldType::Byte, 0), (FieldType::Blob, 0)]));
    assert_eq!(layout.header_len(), 10);
    assert_eq!(layout.record_len(300_000), 300_010);
  }
}
